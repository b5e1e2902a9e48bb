//! Attribute error handling
//!
//! A single error type covers decoding, path conflicts and the ambient
//! configuration/JSON layers. Lookup misses are never errors; typed getters
//! fall back to the caller's default instead.

/// Result type for attribute operations
pub type AttributeResult<T> = Result<T, AttributeError>;

/// Errors that can occur while encoding, decoding or applying attribute data
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("Unknown attribute type tag {tag} at offset {offset}")]
    UnknownTypeTag { tag: u8, offset: usize },

    #[error("Unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        needed: usize,
        remaining: usize,
        offset: usize,
    },

    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("Unknown content category {0}")]
    UnknownCategory(u8),

    #[error("Length {length} exceeds decode limit {limit}")]
    LengthLimitExceeded { length: usize, limit: usize },

    #[error("Tree nesting exceeds maximum depth {max_depth}")]
    DepthLimitExceeded { max_depth: usize },

    #[error("Path '{path}' crosses non-tree attribute at '{segment}'")]
    PathConflict { path: String, segment: String },

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AttributeError {
    /// True when the error means the byte stream is corrupt or was written by
    /// a mismatched protocol version. No partial result is usable.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            AttributeError::UnknownTypeTag { .. }
                | AttributeError::UnexpectedEof { .. }
                | AttributeError::InvalidUtf8 { .. }
                | AttributeError::UnknownCategory(_)
                | AttributeError::LengthLimitExceeded { .. }
                | AttributeError::DepthLimitExceeded { .. }
                | AttributeError::TrailingBytes(_)
        )
    }
}

/// Create an unknown type tag error
pub fn unknown_type_tag(tag: u8, offset: usize) -> AttributeError {
    AttributeError::UnknownTypeTag { tag, offset }
}

/// Create a path conflict error
pub fn path_conflict(path: &str, segment: &str) -> AttributeError {
    AttributeError::PathConflict {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}
