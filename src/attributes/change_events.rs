//! Attribute Change Listeners
//!
//! Registry of modification listeners keyed by path prefix. Dispatch works
//! on a snapshot of the matching listeners so the registry can change while
//! callbacks run.

use crate::attributes::{TreeAttribute, PATH_SEPARATOR};
use std::sync::Arc;

/// Modification callback. Receives the current tree, not the change itself.
pub type ModifiedListener = Arc<dyn Fn(&TreeAttribute) + Send + Sync>;

/// Handle for one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    prefix: Option<String>,
    listener: ModifiedListener,
}

/// True when `path` equals `prefix` or lies below it. Matching is per path
/// segment: "health" matches "health/current" but not "healthregen".
pub fn path_matches_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(PATH_SEPARATOR),
        None => false,
    }
}

/// Listener registry
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for changes at or below `prefix`; `None` matches
    /// every path. The same callback may be registered under many prefixes.
    pub fn register(&mut self, prefix: Option<&str>, listener: ModifiedListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.entries.push(ListenerEntry {
            id,
            prefix: prefix.map(str::to_string),
            listener,
        });
        id
    }

    /// Remove every registration of `listener`. Returns how many were removed;
    /// unknown listeners are a no-op.
    pub fn unregister(&mut self, listener: &ModifiedListener) -> usize {
        let len_before = self.entries.len();
        self.entries.retain(|e| !Arc::ptr_eq(&e.listener, listener));
        len_before - self.entries.len()
    }

    /// Remove a single registration
    pub fn unregister_id(&mut self, id: ListenerId) -> bool {
        let len_before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != len_before
    }

    /// Snapshot of listeners whose prefix matches `path`, in registration order
    pub fn matching(&self, path: &str) -> Vec<ModifiedListener> {
        self.entries
            .iter()
            .filter(|e| match &e.prefix {
                None => true,
                Some(prefix) => path_matches_prefix(prefix, path),
            })
            .map(|e| Arc::clone(&e.listener))
            .collect()
    }

    /// Snapshot of every registration
    pub fn all(&self) -> Vec<ModifiedListener> {
        self.entries.iter().map(|e| Arc::clone(&e.listener)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .finish()
    }
}
