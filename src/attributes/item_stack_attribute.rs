//! Item reference attribute
//!
//! Identifies a content entry by category and symbolic code together with a
//! quantity and an optional tree of extra attributes. The resolved content
//! handle is local state: it is neither written to the wire nor compared.

use crate::attributes::binary::{BinaryReader, BinaryWriter};
use crate::attributes::TreeAttribute;
use crate::error::AttributeResult;
use crate::item::{ContentCategory, ContentHandle, ContentResolver};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone)]
pub struct ItemStackAttribute {
    pub category: ContentCategory,
    pub code: String,
    pub quantity: u32,
    pub attributes: Option<TreeAttribute>,
    content: Option<ContentHandle>,
}

impl Default for ItemStackAttribute {
    fn default() -> Self {
        Self {
            category: ContentCategory::Item,
            code: String::new(),
            quantity: 0,
            attributes: None,
            content: None,
        }
    }
}

impl ItemStackAttribute {
    pub fn new(category: ContentCategory, code: impl Into<String>, quantity: u32) -> Self {
        Self {
            category,
            code: code.into(),
            quantity,
            attributes: None,
            content: None,
        }
    }

    /// Build from an already resolved content handle
    pub fn from_handle(handle: ContentHandle, quantity: u32) -> Self {
        Self {
            category: handle.category,
            code: handle.code.clone(),
            quantity,
            attributes: None,
            content: Some(handle),
        }
    }

    pub fn with_attributes(mut self, attributes: TreeAttribute) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Resolved content entry, if `resolve` succeeded or the stack was built
    /// from a handle
    pub fn content(&self) -> Option<&ContentHandle> {
        self.content.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.content.is_some()
    }

    /// Look up the code through `resolver`. Returns false and clears any
    /// previous handle when the code is unknown.
    pub fn resolve(&mut self, resolver: &dyn ContentResolver) -> bool {
        self.content = resolver.resolve(self.category, &self.code);
        self.content.is_some()
    }

    pub(crate) fn write_to(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.category as u8);
        writer.write_string(&self.code);
        writer.write_u32(self.quantity);
        writer.write_bool(self.attributes.is_some());
        if let Some(tree) = &self.attributes {
            tree.write_to(writer);
        }
    }

    pub(crate) fn read_from(&mut self, reader: &mut BinaryReader<'_>) -> AttributeResult<()> {
        let category = ContentCategory::from_u8(reader.read_u8()?)?;
        let code = reader.read_string()?;
        let quantity = reader.read_u32()?;

        let attributes = if reader.read_bool()? {
            let mut tree = TreeAttribute::new();
            tree.read_from(reader)?;
            Some(tree)
        } else {
            None
        };

        // Keep a resolved handle only if it still names the same content
        if self.category != category || self.code != code {
            self.content = None;
        }

        self.category = category;
        self.code = code;
        self.quantity = quantity;
        self.attributes = attributes;
        Ok(())
    }

    pub(crate) fn overwrite_with(&mut self, next: ItemStackAttribute) {
        let kept = if self.category == next.category && self.code == next.code {
            self.content.take()
        } else {
            None
        };

        *self = ItemStackAttribute {
            content: next.content.or(kept),
            ..next
        };
    }

    /// Render in the same shape the JSON bridge accepts
    pub fn to_json_value(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert("class".to_string(), JsonValue::String(self.category.as_str().to_string()));
        map.insert("code".to_string(), JsonValue::String(self.code.clone()));
        map.insert("quantity".to_string(), JsonValue::from(self.quantity));
        if let Some(tree) = &self.attributes {
            map.insert("attributes".to_string(), tree.to_json_value());
        }
        JsonValue::Object(map)
    }

    fn extra_attributes(&self) -> Option<&TreeAttribute> {
        self.attributes.as_ref().filter(|tree| !tree.is_empty())
    }
}

impl PartialEq for ItemStackAttribute {
    /// An absent extra tree equals an empty one
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
            && self.code == other.code
            && self.quantity == other.quantity
            && self.extra_attributes() == other.extra_attributes()
    }
}
