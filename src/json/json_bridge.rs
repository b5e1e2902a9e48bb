//! JSON to attribute conversion
//!
//! Node rules, first match wins:
//!
//! - `null` has no value
//! - strings, bools and numbers become the matching scalar variant
//! - homogeneous arrays become the matching array variant
//! - `{"type": "...", "value": ..., "values": [...]}` where `type` names an
//!   attribute type is an explicitly typed leaf, parsed according to `type`
//! - `{"class", "code", "quantity", "attributes"?}` is an item reference
//! - any other object is a tree
//!
//! Conversion never fails loudly. A node that does not fit its shape yields
//! `None`, and tree children without a value are skipped.

use crate::attributes::{Attribute, AttributeType, ItemStackAttribute, TreeAttribute};
use crate::error::AttributeResult;
use crate::item::{ContentCategory, ContentResolver};
use serde_json::{Map, Value as JsonValue};

const ANNOTATION_KEYS: [&str; 3] = ["type", "value", "values"];
const ITEM_STACK_KEYS: [&str; 4] = ["class", "code", "quantity", "attributes"];
const REQUIRED_ITEM_STACK_KEYS: [&str; 3] = ["class", "code", "quantity"];

/// Converts parsed JSON into attributes
pub struct JsonAttributeConverter<'a> {
    resolver: &'a dyn ContentResolver,
}

impl<'a> JsonAttributeConverter<'a> {
    pub fn new(resolver: &'a dyn ContentResolver) -> Self {
        Self { resolver }
    }

    /// Parse `source` and convert its root node
    pub fn from_json_str(&self, source: &str) -> AttributeResult<Option<Attribute>> {
        let node: JsonValue = serde_json::from_str(source)?;
        Ok(self.to_attribute(&node))
    }

    /// Parse `source` and convert its root node, which must produce a tree
    pub fn tree_from_json_str(&self, source: &str) -> AttributeResult<Option<TreeAttribute>> {
        let node: JsonValue = serde_json::from_str(source)?;
        Ok(self.to_tree(&node))
    }

    /// Convert a node that should produce a tree
    pub fn to_tree(&self, node: &JsonValue) -> Option<TreeAttribute> {
        match self.to_attribute(node)? {
            Attribute::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Convert one node
    pub fn to_attribute(&self, node: &JsonValue) -> Option<Attribute> {
        match node {
            JsonValue::Null => None,
            JsonValue::Bool(v) => Some(Attribute::Bool(*v)),
            JsonValue::Number(_) => number_to_attribute(node),
            JsonValue::String(v) => Some(Attribute::String(v.clone())),
            JsonValue::Array(values) => array_to_attribute(values),
            JsonValue::Object(map) => self.object_to_attribute(map),
        }
    }

    fn object_to_attribute(&self, map: &Map<String, JsonValue>) -> Option<Attribute> {
        if let Some(attribute_type) = annotated_type(map) {
            return self.annotated_to_attribute(attribute_type, map);
        }

        if is_item_stack_shaped(map) {
            return self.item_stack_from_map(map).map(Attribute::ItemStack);
        }

        let mut tree = TreeAttribute::new();
        for (key, child) in map {
            match self.to_attribute(child) {
                Some(value) => {
                    tree.set_attribute(key.as_str(), value);
                }
                None => log::warn!("Skipping attribute '{}': no value could be built from {}", key, child),
            }
        }
        Some(Attribute::Tree(tree))
    }

    fn annotated_to_attribute(&self, attribute_type: AttributeType, map: &Map<String, JsonValue>) -> Option<Attribute> {
        let value = map.get("value");
        let values = map.get("values").and_then(JsonValue::as_array);

        match attribute_type {
            AttributeType::Bool => value.and_then(parse_bool).map(Attribute::Bool),
            AttributeType::Int => value.and_then(parse_i32).map(Attribute::Int),
            AttributeType::Long => value.and_then(parse_i64).map(Attribute::Long),
            AttributeType::Float => value.and_then(parse_f64).map(|v| Attribute::Float(v as f32)),
            AttributeType::Double => value.and_then(parse_f64).map(Attribute::Double),
            AttributeType::String => value.and_then(parse_string).map(Attribute::String),
            AttributeType::Tree => value
                .filter(|v| v.is_object())
                .and_then(|v| self.to_tree(v))
                .map(Attribute::Tree),
            AttributeType::ItemStack => match value? {
                JsonValue::Object(fields) => self.item_stack_from_map(fields).map(Attribute::ItemStack),
                _ => None,
            },
            AttributeType::Bytes => parse_all(values?, parse_u8).map(Attribute::Bytes),
            AttributeType::BoolArray => parse_all(values?, parse_bool).map(Attribute::BoolArray),
            AttributeType::IntArray => parse_all(values?, parse_i32).map(Attribute::IntArray),
            AttributeType::LongArray => parse_all(values?, parse_i64).map(Attribute::LongArray),
            AttributeType::FloatArray => {
                parse_all(values?, |v| parse_f64(v).map(|f| f as f32)).map(Attribute::FloatArray)
            }
            AttributeType::DoubleArray => parse_all(values?, parse_f64).map(Attribute::DoubleArray),
            AttributeType::StringArray => parse_all(values?, parse_string).map(Attribute::StringArray),
        }
    }

    /// Build an item reference from `{class, code, quantity, attributes?}`.
    /// Unknown class, unresolvable code, bad quantity or a non-tree
    /// `attributes` all yield None.
    fn item_stack_from_map(&self, map: &Map<String, JsonValue>) -> Option<ItemStackAttribute> {
        let category: ContentCategory = map.get("class")?.as_str()?.parse().ok()?;
        let code = map.get("code")?.as_str()?;
        let quantity = map.get("quantity").and_then(parse_u32)?;

        let Some(handle) = self.resolver.resolve(category, code) else {
            log::warn!("Cannot resolve {} '{}'", category, code);
            return None;
        };

        let mut stack = ItemStackAttribute::from_handle(handle, quantity);
        if let Some(extra) = map.get("attributes") {
            stack.attributes = Some(self.to_tree(extra)?);
        }
        Some(stack)
    }
}

/// Declared type of an annotated leaf. `map` is one only when `type` names
/// an attribute type and no other keys are present.
fn annotated_type(map: &Map<String, JsonValue>) -> Option<AttributeType> {
    let attribute_type = AttributeType::from_name(map.get("type")?.as_str()?)?;
    map.keys()
        .all(|k| ANNOTATION_KEYS.contains(&k.as_str()))
        .then_some(attribute_type)
}

fn is_item_stack_shaped(map: &Map<String, JsonValue>) -> bool {
    REQUIRED_ITEM_STACK_KEYS.iter().all(|k| map.contains_key(*k))
        && map.keys().all(|k| ITEM_STACK_KEYS.contains(&k.as_str()))
}

fn number_to_attribute(node: &JsonValue) -> Option<Attribute> {
    if let Some(v) = node.as_i64() {
        return Some(match i32::try_from(v) {
            Ok(small) => Attribute::Int(small),
            Err(_) => Attribute::Long(v),
        });
    }
    node.as_f64().map(Attribute::Double)
}

fn array_to_attribute(values: &[JsonValue]) -> Option<Attribute> {
    if values.iter().all(JsonValue::is_string) {
        return parse_all(values, parse_string).map(Attribute::StringArray);
    }
    if values.iter().all(JsonValue::is_boolean) {
        return parse_all(values, parse_bool).map(Attribute::BoolArray);
    }
    if values.iter().all(|v| v.as_i64().is_some()) {
        if let Some(ints) = parse_all(values, |v| v.as_i64().and_then(|x| i32::try_from(x).ok())) {
            return Some(Attribute::IntArray(ints));
        }
        return parse_all(values, JsonValue::as_i64).map(Attribute::LongArray);
    }
    if values.iter().all(JsonValue::is_number) {
        return parse_all(values, JsonValue::as_f64).map(Attribute::DoubleArray);
    }
    None
}

fn parse_all<T>(values: &[JsonValue], parse: impl Fn(&JsonValue) -> Option<T>) -> Option<Vec<T>> {
    values.iter().map(parse).collect()
}

fn parse_bool(node: &JsonValue) -> Option<bool> {
    match node {
        JsonValue::Bool(v) => Some(*v),
        JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_i64(node: &JsonValue) -> Option<i64> {
    match node {
        JsonValue::Number(_) => node.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_i32(node: &JsonValue) -> Option<i32> {
    parse_i64(node).and_then(|v| i32::try_from(v).ok())
}

fn parse_u32(node: &JsonValue) -> Option<u32> {
    parse_i64(node).and_then(|v| u32::try_from(v).ok())
}

fn parse_u8(node: &JsonValue) -> Option<u8> {
    parse_i64(node).and_then(|v| u8::try_from(v).ok())
}

fn parse_f64(node: &JsonValue) -> Option<f64> {
    match node {
        JsonValue::Number(_) => node.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_string(node: &JsonValue) -> Option<String> {
    node.as_str().map(str::to_string)
}
