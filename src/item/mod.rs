//! Content lookup for item references
//!
//! Item-reference attributes name content by category and symbolic code.
//! Resolving a code to a concrete entry goes through a `ContentResolver`.

pub mod item_type;
pub mod item_registry;

pub use item_type::{ContentCategory, ContentHandle};
pub use item_registry::{ContentRegistry, ContentResolver};
