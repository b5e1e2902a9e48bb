use crate::error::{AttributeError, AttributeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two categories of content an item reference can point at
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// A placeable block
    Block = 0,
    /// A non-block item
    Item = 1,
}

impl ContentCategory {
    /// Decode the wire byte
    pub fn from_u8(value: u8) -> AttributeResult<Self> {
        match value {
            0 => Ok(ContentCategory::Block),
            1 => Ok(ContentCategory::Item),
            other => Err(AttributeError::UnknownCategory(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Block => "block",
            ContentCategory::Item => "item",
        }
    }
}

impl FromStr for ContentCategory {
    type Err = ();

    /// Case-insensitive: "Block", "block" and "BLOCK" all parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("block") {
            Ok(ContentCategory::Block)
        } else if s.eq_ignore_ascii_case("item") {
            Ok(ContentCategory::Item)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved content entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHandle {
    pub category: ContentCategory,
    pub id: u32,
    pub code: String,
}
