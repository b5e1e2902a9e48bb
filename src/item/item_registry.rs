use crate::item::{ContentCategory, ContentHandle};
use std::collections::HashMap;

/// Resolves a symbolic content code to a concrete entry
pub trait ContentResolver {
    fn resolve(&self, category: ContentCategory, code: &str) -> Option<ContentHandle>;
}

impl<F> ContentResolver for F
where
    F: Fn(ContentCategory, &str) -> Option<ContentHandle>,
{
    fn resolve(&self, category: ContentCategory, code: &str) -> Option<ContentHandle> {
        self(category, code)
    }
}

/// In-memory registry of blocks and items
#[derive(Debug, Default)]
pub struct ContentRegistry {
    entries: HashMap<(ContentCategory, String), ContentHandle>,
    next_id: u32,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content code, returning its handle.
    /// Registering the same code twice returns the existing handle.
    pub fn register(&mut self, category: ContentCategory, code: impl Into<String>) -> ContentHandle {
        let code = code.into();
        if let Some(existing) = self.entries.get(&(category, code.clone())) {
            return existing.clone();
        }

        let handle = ContentHandle {
            category,
            id: self.next_id,
            code: code.clone(),
        };
        self.next_id += 1;

        self.entries.insert((category, code), handle.clone());
        handle
    }

    /// Register a block code
    pub fn register_block(&mut self, code: impl Into<String>) -> ContentHandle {
        self.register(ContentCategory::Block, code)
    }

    /// Register an item code
    pub fn register_item(&mut self, code: impl Into<String>) -> ContentHandle {
        self.register(ContentCategory::Item, code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentResolver for ContentRegistry {
    fn resolve(&self, category: ContentCategory, code: &str) -> Option<ContentHandle> {
        self.entries.get(&(category, code.to_string())).cloned()
    }
}
