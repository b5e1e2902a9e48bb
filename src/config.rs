//! Attribute system configuration
//!
//! Loaded from TOML. Every field has a default so an empty document is a
//! valid configuration.

use crate::error::AttributeResult;
use serde::{Deserialize, Serialize};

/// Distinct dirty paths tolerated before a synced tree resends everything
pub const DEFAULT_DIRTY_PATH_THRESHOLD: usize = 10;

/// Maximum tree nesting accepted when decoding
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum element/entry count accepted for one decoded collection
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// Maximum byte length accepted for one decoded string or byte sequence
pub const DEFAULT_MAX_STRING_LEN: usize = 1 << 20;

/// Bounds applied while decoding untrusted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    pub max_depth: usize,
    pub max_collection_len: usize,
    pub max_string_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

/// Configuration for synced attribute trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    /// Dirty paths tracked before collapsing to all-dirty
    pub dirty_path_threshold: usize,

    /// Limits for decoding full and partial updates
    pub limits: DecodeLimits,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            dirty_path_threshold: DEFAULT_DIRTY_PATH_THRESHOLD,
            limits: DecodeLimits::default(),
        }
    }
}

impl AttributeConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(source: &str) -> AttributeResult<Self> {
        let config = toml::from_str(source)?;
        Ok(config)
    }

    pub fn with_dirty_path_threshold(mut self, threshold: usize) -> Self {
        self.dirty_path_threshold = threshold;
        self
    }
}
