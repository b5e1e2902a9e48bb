//! Dynamic Attribute System
//!
//! Polymorphic key/value trees for entity data, inventory contents and
//! world metadata. Trees nest, serialize to a compact binary form and can
//! be kept in sync across a network boundary by resending only the paths
//! that changed.

pub mod attribute_value;
pub mod binary;
pub mod change_events;
pub mod item_stack_attribute;
pub mod synced_tree_attribute;
pub mod tree_attribute;

pub use attribute_value::{Attribute, AttributeType};
pub use binary::{BinaryReader, BinaryWriter};
pub use change_events::{path_matches_prefix, ListenerId, ListenerRegistry, ModifiedListener};
pub use item_stack_attribute::ItemStackAttribute;
pub use synced_tree_attribute::{DirtyState, PathUpdate, SharedSyncedTree, SyncPacket, SyncedTreeAttribute};
pub use tree_attribute::TreeAttribute;

/// Separates keys in an attribute path
pub const PATH_SEPARATOR: char = '/';

