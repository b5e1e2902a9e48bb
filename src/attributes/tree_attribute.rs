//! Attribute Tree
//!
//! Ordered string-keyed mapping of attributes. Insertion order is kept so
//! serialized output is reproducible. Paths address nested trees with
//! `PATH_SEPARATOR` between keys.

use crate::attributes::binary::{BinaryReader, BinaryWriter};
use crate::attributes::attribute_value::widen_f32;
use crate::attributes::{Attribute, ItemStackAttribute, PATH_SEPARATOR};
use crate::config::DecodeLimits;
use crate::error::{path_conflict, AttributeResult};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct TreeAttribute {
    attributes: IndexMap<String, Attribute>,
}

/// Split "a/b/c" into (Some("a/b"), "c")
fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    }
}

impl TreeAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    /// Get attribute at a single key
    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(key)
    }

    /// Store `value` at `key`, returning the value it replaced
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Attribute>) -> Option<Attribute> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Remove the attribute at `key`, keeping the order of the rest
    pub fn remove_attribute(&mut self, key: &str) -> Option<Attribute> {
        self.attributes.shift_remove(key)
    }

    // Typed getters. Absent keys and non-coercible variants return the default.

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Attribute::as_bool).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get(key).and_then(Attribute::as_i32).unwrap_or(default)
    }

    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Attribute::as_i64).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(Attribute::as_f32).unwrap_or(default)
    }

    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Attribute::as_f64).unwrap_or(default)
    }

    pub fn get_string<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Attribute::as_str).unwrap_or(default)
    }

    pub fn get_bytes<'a>(&'a self, key: &str, default: &'a [u8]) -> &'a [u8] {
        self.get(key).and_then(Attribute::as_bytes).unwrap_or(default)
    }

    pub fn get_bool_array<'a>(&'a self, key: &str, default: &'a [bool]) -> &'a [bool] {
        self.get(key).and_then(Attribute::as_bool_array).unwrap_or(default)
    }

    pub fn get_int_array<'a>(&'a self, key: &str, default: &'a [i32]) -> &'a [i32] {
        self.get(key).and_then(Attribute::as_int_array).unwrap_or(default)
    }

    pub fn get_long_array<'a>(&'a self, key: &str, default: &'a [i64]) -> &'a [i64] {
        self.get(key).and_then(Attribute::as_long_array).unwrap_or(default)
    }

    pub fn get_float_array<'a>(&'a self, key: &str, default: &'a [f32]) -> &'a [f32] {
        self.get(key).and_then(Attribute::as_float_array).unwrap_or(default)
    }

    pub fn get_double_array<'a>(&'a self, key: &str, default: &'a [f64]) -> &'a [f64] {
        self.get(key).and_then(Attribute::as_double_array).unwrap_or(default)
    }

    pub fn get_string_array<'a>(&'a self, key: &str, default: &'a [String]) -> &'a [String] {
        self.get(key).and_then(Attribute::as_string_array).unwrap_or(default)
    }

    /// Nested tree at `key`, if present and tree-valued
    pub fn get_tree(&self, key: &str) -> Option<&TreeAttribute> {
        self.get(key).and_then(Attribute::as_tree)
    }

    pub fn get_tree_mut(&mut self, key: &str) -> Option<&mut TreeAttribute> {
        self.get_mut(key).and_then(Attribute::as_tree_mut)
    }

    /// Nested tree at `key`, inserting an empty one if absent.
    /// Returns None when the key holds a non-tree value.
    pub fn get_or_add_tree(&mut self, key: &str) -> Option<&mut TreeAttribute> {
        self.attributes
            .entry(key.to_string())
            .or_insert_with(|| Attribute::Tree(TreeAttribute::new()))
            .as_tree_mut()
    }

    pub fn get_item_stack(&self, key: &str) -> Option<&ItemStackAttribute> {
        self.get(key).and_then(Attribute::as_item_stack)
    }

    // Typed setters

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_attribute(key, value);
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set_attribute(key, value);
    }

    pub fn set_long(&mut self, key: &str, value: i64) {
        self.set_attribute(key, value);
    }

    /// Stored as a double. Pass an `f32` to `set_attribute` to keep single
    /// precision.
    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set_attribute(key, widen_f32(value));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.set_attribute(key, value);
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.set_attribute(key, Attribute::String(value.into()));
    }

    pub fn set_bytes(&mut self, key: &str, value: Vec<u8>) {
        self.set_attribute(key, value);
    }

    pub fn set_bool_array(&mut self, key: &str, value: Vec<bool>) {
        self.set_attribute(key, value);
    }

    pub fn set_int_array(&mut self, key: &str, value: Vec<i32>) {
        self.set_attribute(key, value);
    }

    pub fn set_long_array(&mut self, key: &str, value: Vec<i64>) {
        self.set_attribute(key, value);
    }

    pub fn set_float_array(&mut self, key: &str, value: Vec<f32>) {
        self.set_attribute(key, value);
    }

    pub fn set_double_array(&mut self, key: &str, value: Vec<f64>) {
        self.set_attribute(key, value);
    }

    pub fn set_string_array(&mut self, key: &str, value: Vec<String>) {
        self.set_attribute(key, value);
    }

    pub fn set_tree(&mut self, key: &str, value: TreeAttribute) {
        self.set_attribute(key, value);
    }

    pub fn set_item_stack(&mut self, key: &str, value: ItemStackAttribute) {
        self.set_attribute(key, value);
    }

    /// Tree reached by walking every segment of `path` through nested trees.
    /// An empty path is this tree.
    pub fn tree_at_path(&self, path: &str) -> Option<&TreeAttribute> {
        if path.is_empty() {
            return Some(self);
        }
        path.split(PATH_SEPARATOR)
            .try_fold(self, |tree, segment| tree.get_tree(segment))
    }

    pub fn tree_at_path_mut(&mut self, path: &str) -> Option<&mut TreeAttribute> {
        if path.is_empty() {
            return Some(self);
        }
        path.split(PATH_SEPARATOR)
            .try_fold(self, |tree, segment| tree.get_tree_mut(segment))
    }

    /// Resolve a multi-segment path. Missing or non-tree intermediate
    /// segments yield None.
    pub fn get_attribute_by_path(&self, path: &str) -> Option<&Attribute> {
        match split_parent(path) {
            (Some(parent), leaf) => self.tree_at_path(parent)?.get(leaf),
            (None, key) => self.get(key),
        }
    }

    pub fn get_attribute_by_path_mut(&mut self, path: &str) -> Option<&mut Attribute> {
        match split_parent(path) {
            (Some(parent), leaf) => self.tree_at_path_mut(parent)?.get_mut(leaf),
            (None, key) => self.get_mut(key),
        }
    }

    /// Remove the attribute at `path`, returning it if it existed
    pub fn delete_attribute_by_path(&mut self, path: &str) -> Option<Attribute> {
        match split_parent(path) {
            (Some(parent), leaf) => self.tree_at_path_mut(parent)?.remove_attribute(leaf),
            (None, key) => self.remove_attribute(key),
        }
    }

    /// Tree at `path`, creating every missing segment. Fails if a segment
    /// holds a non-tree value.
    pub fn get_or_add_tree_by_path(&mut self, path: &str) -> AttributeResult<&mut TreeAttribute> {
        self.walk_or_add(path, path)
    }

    fn walk_or_add(&mut self, segments: &str, path: &str) -> AttributeResult<&mut TreeAttribute> {
        segments.split(PATH_SEPARATOR).try_fold(self, |tree, segment| {
            tree.get_or_add_tree(segment)
                .ok_or_else(|| path_conflict(path, segment))
        })
    }

    /// Tree at `path`, creating missing segments and replacing any non-tree
    /// value found on the way
    pub(crate) fn force_tree_by_path(&mut self, path: &str) -> Option<&mut TreeAttribute> {
        path.split(PATH_SEPARATOR).try_fold(self, |tree, segment| {
            if tree.get_tree(segment).is_none() {
                tree.set_tree(segment, TreeAttribute::new());
            }
            tree.get_tree_mut(segment)
        })
    }

    /// Store `value` at `path`, creating missing intermediate trees.
    /// Fails if an intermediate segment holds a non-tree value.
    pub fn set_attribute_by_path(&mut self, path: &str, value: impl Into<Attribute>) -> AttributeResult<Option<Attribute>> {
        match split_parent(path) {
            (Some(parent), leaf) => Ok(self.walk_or_add(parent, path)?.set_attribute(leaf, value)),
            (None, key) => Ok(self.set_attribute(key, value)),
        }
    }

    /// Merge `other` into this tree. Nested trees merge recursively, every
    /// other value overwrites.
    pub fn merge_tree(&mut self, other: &TreeAttribute) {
        for (key, value) in other.iter() {
            if let Attribute::Tree(incoming) = value {
                if let Some(existing) = self.get_tree_mut(key) {
                    existing.merge_tree(incoming);
                    continue;
                }
            }
            self.set_attribute(key, value.clone());
        }
    }

    /// Write entry count then (key, tag, value) for each entry in order
    pub fn write_to(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.attributes.len());
        for (key, value) in &self.attributes {
            writer.write_string(key);
            value.write_tagged(writer);
        }
    }

    /// Replace the contents of this tree with entries read from `reader`
    pub fn read_from(&mut self, reader: &mut BinaryReader<'_>) -> AttributeResult<()> {
        reader.enter_nested()?;
        let count = reader.read_len()?;

        let mut attributes = IndexMap::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let key = reader.read_string()?;
            let value = Attribute::read_tagged(reader)?;
            attributes.insert(key, value);
        }

        reader.exit_nested();
        self.attributes = attributes;
        Ok(())
    }

    /// Serialize the whole tree
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Deserialize a whole tree with default limits
    pub fn from_bytes(data: &[u8]) -> AttributeResult<TreeAttribute> {
        Self::from_bytes_with_limits(data, &DecodeLimits::default())
    }

    pub fn from_bytes_with_limits(data: &[u8], limits: &DecodeLimits) -> AttributeResult<TreeAttribute> {
        let mut reader = BinaryReader::with_limits(data, *limits);
        let mut tree = TreeAttribute::new();
        tree.read_from(&mut reader)?;
        reader.finish()?;
        Ok(tree)
    }

    /// Render as a JSON object in key order
    pub fn to_json_value(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json_value()))
            .collect();
        JsonValue::Object(map)
    }
}

impl PartialEq for TreeAttribute {
    /// Same key set and equal values per key; order is ignored
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .attributes
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl fmt::Display for TreeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_value())
    }
}
