//! Attribute Value Types
//!
//! The closed set of attribute variants. Each variant has a stable type tag;
//! the tag is written by the container, never by the value itself, so a
//! decoder can build an empty instance from the tag and then fill it.

use crate::attributes::binary::{BinaryReader, BinaryWriter};
use crate::attributes::{ItemStackAttribute, TreeAttribute};
use crate::error::{unknown_type_tag, AttributeResult};
use serde_json::Value as JsonValue;
use std::fmt;

/// Wire type tags
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Int = 1,
    Long = 2,
    Double = 3,
    Float = 4,
    String = 5,
    Tree = 6,
    ItemStack = 7,
    Bytes = 8,
    Bool = 9,
    StringArray = 10,
    IntArray = 11,
    FloatArray = 12,
    DoubleArray = 13,
    LongArray = 14,
    BoolArray = 15,
}

impl AttributeType {
    pub const ALL: [AttributeType; 15] = [
        AttributeType::Int,
        AttributeType::Long,
        AttributeType::Double,
        AttributeType::Float,
        AttributeType::String,
        AttributeType::Tree,
        AttributeType::ItemStack,
        AttributeType::Bytes,
        AttributeType::Bool,
        AttributeType::StringArray,
        AttributeType::IntArray,
        AttributeType::FloatArray,
        AttributeType::DoubleArray,
        AttributeType::LongArray,
        AttributeType::BoolArray,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(AttributeType::Int),
            2 => Some(AttributeType::Long),
            3 => Some(AttributeType::Double),
            4 => Some(AttributeType::Float),
            5 => Some(AttributeType::String),
            6 => Some(AttributeType::Tree),
            7 => Some(AttributeType::ItemStack),
            8 => Some(AttributeType::Bytes),
            9 => Some(AttributeType::Bool),
            10 => Some(AttributeType::StringArray),
            11 => Some(AttributeType::IntArray),
            12 => Some(AttributeType::FloatArray),
            13 => Some(AttributeType::DoubleArray),
            14 => Some(AttributeType::LongArray),
            15 => Some(AttributeType::BoolArray),
            _ => None,
        }
    }

    /// Construct an empty attribute of this type, ready for `read_value`
    pub fn instantiate(self) -> Attribute {
        match self {
            AttributeType::Int => Attribute::Int(0),
            AttributeType::Long => Attribute::Long(0),
            AttributeType::Double => Attribute::Double(0.0),
            AttributeType::Float => Attribute::Float(0.0),
            AttributeType::String => Attribute::String(String::new()),
            AttributeType::Tree => Attribute::Tree(TreeAttribute::new()),
            AttributeType::ItemStack => Attribute::ItemStack(ItemStackAttribute::default()),
            AttributeType::Bytes => Attribute::Bytes(Vec::new()),
            AttributeType::Bool => Attribute::Bool(false),
            AttributeType::StringArray => Attribute::StringArray(Vec::new()),
            AttributeType::IntArray => Attribute::IntArray(Vec::new()),
            AttributeType::FloatArray => Attribute::FloatArray(Vec::new()),
            AttributeType::DoubleArray => Attribute::DoubleArray(Vec::new()),
            AttributeType::LongArray => Attribute::LongArray(Vec::new()),
            AttributeType::BoolArray => Attribute::BoolArray(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Int => "int",
            AttributeType::Long => "long",
            AttributeType::Double => "double",
            AttributeType::Float => "float",
            AttributeType::String => "string",
            AttributeType::Tree => "tree",
            AttributeType::ItemStack => "itemstack",
            AttributeType::Bytes => "bytes",
            AttributeType::Bool => "bool",
            AttributeType::StringArray => "stringarray",
            AttributeType::IntArray => "intarray",
            AttributeType::FloatArray => "floatarray",
            AttributeType::DoubleArray => "doublearray",
            AttributeType::LongArray => "longarray",
            AttributeType::BoolArray => "boolarray",
        }
    }

    /// Inverse of `name`, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// Attribute value variants
#[derive(Debug, Clone)]
pub enum Attribute {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    BoolArray(Vec<bool>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    Tree(TreeAttribute),
    ItemStack(ItemStackAttribute),
}

/// Numeric view used for cross-type equality
#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(v) => v as f64,
            Number::Real(v) => v,
        }
    }

    fn equals(self, other: Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => {
                let (a, b) = (self.as_f64(), other.as_f64());
                // Any NaN equals any NaN
                a == b || (a.is_nan() && b.is_nan())
            }
        }
    }
}

impl Attribute {
    /// Get the value type
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Attribute::Bool(_) => AttributeType::Bool,
            Attribute::Int(_) => AttributeType::Int,
            Attribute::Long(_) => AttributeType::Long,
            Attribute::Float(_) => AttributeType::Float,
            Attribute::Double(_) => AttributeType::Double,
            Attribute::String(_) => AttributeType::String,
            Attribute::Bytes(_) => AttributeType::Bytes,
            Attribute::BoolArray(_) => AttributeType::BoolArray,
            Attribute::IntArray(_) => AttributeType::IntArray,
            Attribute::LongArray(_) => AttributeType::LongArray,
            Attribute::FloatArray(_) => AttributeType::FloatArray,
            Attribute::DoubleArray(_) => AttributeType::DoubleArray,
            Attribute::StringArray(_) => AttributeType::StringArray,
            Attribute::Tree(_) => AttributeType::Tree,
            Attribute::ItemStack(_) => AttributeType::ItemStack,
        }
    }

    pub fn type_tag(&self) -> u8 {
        self.attribute_type().tag()
    }

    /// Write the variant bytes (without the type tag)
    pub fn write_value(&self, writer: &mut BinaryWriter) {
        match self {
            Attribute::Bool(v) => writer.write_bool(*v),
            Attribute::Int(v) => writer.write_i32(*v),
            Attribute::Long(v) => writer.write_i64(*v),
            Attribute::Float(v) => writer.write_f32(*v),
            Attribute::Double(v) => writer.write_f64(*v),
            Attribute::String(v) => writer.write_string(v),
            Attribute::Bytes(v) => writer.write_bytes(v),
            Attribute::BoolArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_bool(*v));
            }
            Attribute::IntArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_i32(*v));
            }
            Attribute::LongArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_i64(*v));
            }
            Attribute::FloatArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_f32(*v));
            }
            Attribute::DoubleArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_f64(*v));
            }
            Attribute::StringArray(values) => {
                writer.write_len(values.len());
                values.iter().for_each(|v| writer.write_string(v));
            }
            Attribute::Tree(tree) => tree.write_to(writer),
            Attribute::ItemStack(stack) => stack.write_to(writer),
        }
    }

    /// Overwrite this instance with variant bytes of the same type
    pub fn read_value(&mut self, reader: &mut BinaryReader<'_>) -> AttributeResult<()> {
        match self {
            Attribute::Bool(v) => *v = reader.read_bool()?,
            Attribute::Int(v) => *v = reader.read_i32()?,
            Attribute::Long(v) => *v = reader.read_i64()?,
            Attribute::Float(v) => *v = reader.read_f32()?,
            Attribute::Double(v) => *v = reader.read_f64()?,
            Attribute::String(v) => *v = reader.read_string()?,
            Attribute::Bytes(v) => *v = reader.read_bytes()?,
            Attribute::BoolArray(v) => *v = read_array(reader, BinaryReader::read_bool)?,
            Attribute::IntArray(v) => *v = read_array(reader, BinaryReader::read_i32)?,
            Attribute::LongArray(v) => *v = read_array(reader, BinaryReader::read_i64)?,
            Attribute::FloatArray(v) => *v = read_array(reader, BinaryReader::read_f32)?,
            Attribute::DoubleArray(v) => *v = read_array(reader, BinaryReader::read_f64)?,
            Attribute::StringArray(v) => *v = read_array(reader, BinaryReader::read_string)?,
            Attribute::Tree(tree) => tree.read_from(reader)?,
            Attribute::ItemStack(stack) => stack.read_from(reader)?,
        }
        Ok(())
    }

    /// Replace this value with `incoming` of the same type. An item
    /// reference keeps its resolved handle when it still names the same
    /// content.
    pub fn overwrite_with(&mut self, incoming: Attribute) {
        match (self, incoming) {
            (Attribute::ItemStack(current), Attribute::ItemStack(next)) => current.overwrite_with(next),
            (slot, incoming) => *slot = incoming,
        }
    }

    /// Write type tag followed by variant bytes
    pub fn write_tagged(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.type_tag());
        self.write_value(writer);
    }

    /// Read a type tag, instantiate the matching variant and populate it.
    /// An unknown tag aborts the read; the stream position is unusable after it.
    pub fn read_tagged(reader: &mut BinaryReader<'_>) -> AttributeResult<Attribute> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let attribute_type =
            AttributeType::from_tag(tag).ok_or_else(|| unknown_type_tag(tag, offset))?;

        let mut attribute = attribute_type.instantiate();
        attribute.read_value(reader)?;
        Ok(attribute)
    }

    /// Encode as tag plus variant bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.write_tagged(&mut writer);
        writer.into_bytes()
    }

    /// Decode tag plus variant bytes, rejecting trailing data
    pub fn from_bytes(data: &[u8]) -> AttributeResult<Attribute> {
        let mut reader = BinaryReader::new(data);
        let attribute = Self::read_tagged(&mut reader)?;
        reader.finish()?;
        Ok(attribute)
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Attribute::Int(v) => Some(Number::Integer(*v as i64)),
            Attribute::Long(v) => Some(Number::Integer(*v)),
            Attribute::Float(v) => Some(Number::Real(*v as f64)),
            Attribute::Double(v) => Some(Number::Real(*v)),
            _ => None,
        }
    }

    fn numeric_array_len(&self) -> Option<usize> {
        match self {
            Attribute::IntArray(v) => Some(v.len()),
            Attribute::LongArray(v) => Some(v.len()),
            Attribute::FloatArray(v) => Some(v.len()),
            Attribute::DoubleArray(v) => Some(v.len()),
            _ => None,
        }
    }

    fn array_number(&self, index: usize) -> Option<Number> {
        match self {
            Attribute::IntArray(v) => v.get(index).map(|x| Number::Integer(*x as i64)),
            Attribute::LongArray(v) => v.get(index).map(|x| Number::Integer(*x)),
            Attribute::FloatArray(v) => v.get(index).map(|x| Number::Real(*x as f64)),
            Attribute::DoubleArray(v) => v.get(index).map(|x| Number::Real(*x)),
            _ => None,
        }
    }

    /// Convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attribute::Bool(v) => Some(*v),
            Attribute::Int(v) => Some(*v != 0),
            Attribute::Long(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Convert to 32-bit integer; floats truncate, out-of-range longs fail
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Attribute::Int(v) => Some(*v),
            Attribute::Long(v) => i32::try_from(*v).ok(),
            Attribute::Float(v) => Some(*v as i32),
            Attribute::Double(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Convert to 64-bit integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Attribute::Int(v) => Some(*v as i64),
            Attribute::Long(v) => Some(*v),
            Attribute::Float(v) => Some(*v as i64),
            Attribute::Double(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Convert to single precision float
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|v| v as f32)
    }

    /// Convert to double precision float
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Attribute::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Attribute::BoolArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Attribute::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Attribute::LongArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Attribute::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double_array(&self) -> Option<&[f64]> {
        match self {
            Attribute::DoubleArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Attribute::StringArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&TreeAttribute> {
        match self {
            Attribute::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut TreeAttribute> {
        match self {
            Attribute::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_item_stack(&self) -> Option<&ItemStackAttribute> {
        match self {
            Attribute::ItemStack(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn as_item_stack_mut(&mut self) -> Option<&mut ItemStackAttribute> {
        match self {
            Attribute::ItemStack(stack) => Some(stack),
            _ => None,
        }
    }

    /// Render as a JSON value
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Attribute::Bool(v) => JsonValue::Bool(*v),
            Attribute::Int(v) => JsonValue::from(*v),
            Attribute::Long(v) => JsonValue::from(*v),
            Attribute::Float(v) => float_to_json(*v),
            Attribute::Double(v) => double_to_json(*v),
            Attribute::String(v) => JsonValue::String(v.clone()),
            Attribute::Bytes(v) => JsonValue::Array(v.iter().map(|b| JsonValue::from(*b)).collect()),
            Attribute::BoolArray(v) => JsonValue::Array(v.iter().map(|b| JsonValue::Bool(*b)).collect()),
            Attribute::IntArray(v) => JsonValue::Array(v.iter().map(|x| JsonValue::from(*x)).collect()),
            Attribute::LongArray(v) => JsonValue::Array(v.iter().map(|x| JsonValue::from(*x)).collect()),
            Attribute::FloatArray(v) => JsonValue::Array(v.iter().map(|x| float_to_json(*x)).collect()),
            Attribute::DoubleArray(v) => JsonValue::Array(v.iter().map(|x| double_to_json(*x)).collect()),
            Attribute::StringArray(v) => {
                JsonValue::Array(v.iter().map(|s| JsonValue::String(s.clone())).collect())
            }
            Attribute::Tree(tree) => tree.to_json_value(),
            Attribute::ItemStack(stack) => stack.to_json_value(),
        }
    }
}

fn read_array<'a, T>(
    reader: &mut BinaryReader<'a>,
    mut read_element: impl FnMut(&mut BinaryReader<'a>) -> AttributeResult<T>,
) -> AttributeResult<Vec<T>> {
    let len = reader.read_len()?;
    // Capacity is bounded by what the remaining bytes could hold
    let mut values = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        values.push(read_element(reader)?);
    }
    Ok(values)
}

fn double_to_json(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Widen through the shortest decimal form so 0.1f32 becomes 0.1f64
pub(crate) fn widen_f32(value: f32) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(value as f64)
}

fn float_to_json(value: f32) -> JsonValue {
    double_to_json(widen_f32(value))
}

impl PartialEq for Attribute {
    /// Numeric scalars compare by value across Int/Long/Float/Double, and so
    /// do the elements of numeric arrays. Everything else needs matching types.
    fn eq(&self, other: &Attribute) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.equals(b);
        }

        if let (Some(len_a), Some(len_b)) = (self.numeric_array_len(), other.numeric_array_len()) {
            return len_a == len_b
                && (0..len_a).all(|i| match (self.array_number(i), other.array_number(i)) {
                    (Some(a), Some(b)) => a.equals(b),
                    _ => false,
                });
        }

        match (self, other) {
            (Attribute::Bool(a), Attribute::Bool(b)) => a == b,
            (Attribute::String(a), Attribute::String(b)) => a == b,
            (Attribute::Bytes(a), Attribute::Bytes(b)) => a == b,
            (Attribute::BoolArray(a), Attribute::BoolArray(b)) => a == b,
            (Attribute::StringArray(a), Attribute::StringArray(b)) => a == b,
            (Attribute::Tree(a), Attribute::Tree(b)) => a == b,
            (Attribute::ItemStack(a), Attribute::ItemStack(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_value())
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<i32> for Attribute {
    fn from(value: i32) -> Self {
        Attribute::Int(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Long(value)
    }
}

impl From<f32> for Attribute {
    fn from(value: f32) -> Self {
        Attribute::Float(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::Double(value)
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::String(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<Vec<u8>> for Attribute {
    fn from(value: Vec<u8>) -> Self {
        Attribute::Bytes(value)
    }
}

impl From<Vec<bool>> for Attribute {
    fn from(value: Vec<bool>) -> Self {
        Attribute::BoolArray(value)
    }
}

impl From<Vec<i32>> for Attribute {
    fn from(value: Vec<i32>) -> Self {
        Attribute::IntArray(value)
    }
}

impl From<Vec<i64>> for Attribute {
    fn from(value: Vec<i64>) -> Self {
        Attribute::LongArray(value)
    }
}

impl From<Vec<f32>> for Attribute {
    fn from(value: Vec<f32>) -> Self {
        Attribute::FloatArray(value)
    }
}

impl From<Vec<f64>> for Attribute {
    fn from(value: Vec<f64>) -> Self {
        Attribute::DoubleArray(value)
    }
}

impl From<Vec<String>> for Attribute {
    fn from(value: Vec<String>) -> Self {
        Attribute::StringArray(value)
    }
}

impl From<TreeAttribute> for Attribute {
    fn from(value: TreeAttribute) -> Self {
        Attribute::Tree(value)
    }
}

impl From<ItemStackAttribute> for Attribute {
    fn from(value: ItemStackAttribute) -> Self {
        Attribute::ItemStack(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttributeError;
    use crate::item::ContentCategory;

    #[test]
    fn test_tags_are_unique_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for attribute_type in AttributeType::ALL {
            assert!(seen.insert(attribute_type.tag()));
            assert_eq!(AttributeType::from_tag(attribute_type.tag()), Some(attribute_type));
            assert_eq!(attribute_type.instantiate().attribute_type(), attribute_type);
            assert_eq!(AttributeType::from_name(attribute_type.name()), Some(attribute_type));
        }
        assert_eq!(AttributeType::from_tag(0), None);
        assert_eq!(AttributeType::from_tag(200), None);
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Attribute::Int(5), Attribute::Double(5.0));
        assert_eq!(Attribute::Long(7), Attribute::Int(7));
        assert_eq!(Attribute::Float(1.5), Attribute::Double(1.5));
        assert_ne!(Attribute::Int(5), Attribute::Double(5.5));
        assert_ne!(Attribute::Int(1), Attribute::Bool(true));
        assert_ne!(Attribute::Int(5), Attribute::String("5".into()));
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Attribute::Double(f64::NAN), Attribute::Double(f64::NAN));
        assert_eq!(Attribute::Float(f32::NAN), Attribute::Double(f64::NAN));
        assert_eq!(Attribute::DoubleArray(vec![f64::NAN, 1.0]), Attribute::DoubleArray(vec![f64::NAN, 1.0]));
        assert_ne!(Attribute::Double(f64::NAN), Attribute::Double(0.0));

        let decoded = Attribute::from_bytes(&Attribute::Double(f64::NAN).to_bytes()).unwrap();
        assert_eq!(decoded, Attribute::Double(f64::NAN));
    }

    #[test]
    fn test_array_equality() {
        let ints = Attribute::IntArray(vec![1, 2, 3]);
        assert_eq!(ints, Attribute::DoubleArray(vec![1.0, 2.0, 3.0]));
        assert_eq!(ints, Attribute::LongArray(vec![1, 2, 3]));
        assert_ne!(ints, Attribute::IntArray(vec![1, 2]));
        assert_ne!(ints, Attribute::IntArray(vec![1, 2, 4]));

        let strings = Attribute::StringArray(vec!["a".into()]);
        assert_ne!(strings, Attribute::StringArray(vec!["a".into(), "b".into()]));
        assert_ne!(Attribute::IntArray(vec![]), Attribute::StringArray(vec![]));
    }

    #[test]
    fn test_scalar_wire_widths() {
        assert_eq!(Attribute::Bool(true).to_bytes().len(), 1 + 1);
        assert_eq!(Attribute::Int(1).to_bytes().len(), 1 + 4);
        assert_eq!(Attribute::Long(1).to_bytes().len(), 1 + 8);
        assert_eq!(Attribute::Float(1.0).to_bytes().len(), 1 + 4);
        assert_eq!(Attribute::Double(1.0).to_bytes().len(), 1 + 8);
        assert_eq!(Attribute::from("abc").to_bytes().len(), 1 + 4 + 3);
        assert_eq!(Attribute::IntArray(vec![1, 2]).to_bytes().len(), 1 + 4 + 8);
    }

    #[test]
    fn test_round_trip_every_variant() {
        let mut nested = TreeAttribute::new();
        nested.set_int("depth", 2);

        let values = vec![
            Attribute::Bool(true),
            Attribute::Int(-12),
            Attribute::Long(i64::MAX),
            Attribute::Float(0.25),
            Attribute::Double(-3.5),
            Attribute::from("héllo"),
            Attribute::Bytes(vec![0, 255, 7]),
            Attribute::BoolArray(vec![true, false]),
            Attribute::IntArray(vec![1, -1]),
            Attribute::LongArray(vec![1 << 40]),
            Attribute::FloatArray(vec![0.5]),
            Attribute::DoubleArray(vec![2.25, 4.5]),
            Attribute::StringArray(vec!["a".into(), "".into()]),
            Attribute::Tree(nested.clone()),
            Attribute::ItemStack(
                ItemStackAttribute::new(ContentCategory::Block, "stone", 3).with_attributes(nested),
            ),
        ];

        for value in values {
            let decoded = Attribute::from_bytes(&value.to_bytes()).unwrap();
            assert_eq!(decoded.attribute_type(), value.attribute_type());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let result = Attribute::from_bytes(&[99, 0, 0, 0, 0]);
        match result {
            Err(err @ AttributeError::UnknownTypeTag { tag: 99, offset: 0 }) => {
                assert!(err.is_protocol_error());
            }
            other => panic!("expected unknown tag, got {:?}", other),
        }
    }

    #[test]
    fn test_read_value_in_place() {
        let mut target = Attribute::Int(1);
        let source = Attribute::Int(42);

        let mut writer = BinaryWriter::new();
        source.write_value(&mut writer);
        let bytes = writer.into_bytes();

        target.read_value(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(target, Attribute::Int(42));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Attribute::Double(2.9).as_i32(), Some(2));
        assert_eq!(Attribute::Long(i64::MAX).as_i32(), None);
        assert_eq!(Attribute::Int(3).as_f64(), Some(3.0));
        assert_eq!(Attribute::Int(0).as_bool(), Some(false));
        assert_eq!(Attribute::from("x").as_i32(), None);
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(Attribute::Float(0.1).to_string(), "0.1");
        assert_eq!(Attribute::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Attribute::IntArray(vec![1, 2]).to_string(), "[1,2]");
        assert_eq!(Attribute::Double(f64::NAN).to_json_value(), JsonValue::Null);
    }
}
