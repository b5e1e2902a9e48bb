//! Hierarchical attribute trees with binary serialization and dirty-path
//! network synchronization.

pub mod attributes;
pub mod config;
pub mod error;
pub mod item;
pub mod json;

pub use attributes::{
    Attribute, AttributeType, ItemStackAttribute, ModifiedListener, PathUpdate, SharedSyncedTree,
    SyncPacket, SyncedTreeAttribute, TreeAttribute, PATH_SEPARATOR,
};
pub use config::{AttributeConfig, DecodeLimits};
pub use error::{AttributeError, AttributeResult};
pub use item::{ContentCategory, ContentHandle, ContentRegistry, ContentResolver};
pub use json::JsonAttributeConverter;
