//! Synced Attribute Tree
//!
//! Wraps a `TreeAttribute` with change tracking so only modified subtrees
//! are resent. State cycles Clean -> PartiallyDirty -> AllDirty -> Clean:
//!
//! - tracked setters mark their key path dirty
//! - removals mark the whole tree dirty, since a receiver cannot be patched
//!   with a structural change it may not have seen
//! - once more than `dirty_path_threshold` distinct paths are dirty the
//!   path set is dropped in favour of a full resend
//! - `flush` emits either the full tree or a partial update and returns to
//!   Clean
//!
//! The receiving side applies full or partial updates to its own mirror.
//! Remote updates notify listeners exactly like local mutations but do not
//! mark the mirror dirty.

use crate::attributes::binary::{BinaryReader, BinaryWriter};
use crate::attributes::change_events::{ListenerId, ListenerRegistry, ModifiedListener};
use crate::attributes::attribute_value::widen_f32;
use crate::attributes::{Attribute, ItemStackAttribute, TreeAttribute, PATH_SEPARATOR};
use crate::config::{AttributeConfig, DecodeLimits};
use crate::error::AttributeResult;
use indexmap::IndexSet;
use parking_lot::{Mutex, MutexGuard};
use std::ops::Deref;
use std::sync::Arc;

/// Tracking state of a synced tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyState {
    Clean,
    PartiallyDirty,
    AllDirty,
}

/// Output of `SyncedTreeAttribute::flush`
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPacket {
    /// Whole tree bytes
    Full(Vec<u8>),
    /// Partial update message
    Partial(Vec<u8>),
}

/// One decoded entry of a partial update. `None` means the path was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathUpdate {
    pub path: String,
    pub value: Option<Attribute>,
}

impl PathUpdate {
    pub fn set(path: impl Into<String>, value: impl Into<Attribute>) -> Self {
        Self {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn removal(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: None,
        }
    }

    /// Write `path`, `hasData`, then tag and value bytes when present
    pub fn write_to(&self, writer: &mut BinaryWriter) {
        writer.write_string(&self.path);
        writer.write_bool(self.value.is_some());
        if let Some(value) = &self.value {
            value.write_tagged(writer);
        }
    }

    pub fn read_from(reader: &mut BinaryReader<'_>) -> AttributeResult<PathUpdate> {
        let path = reader.read_string()?;
        let value = if reader.read_bool()? {
            Some(Attribute::read_tagged(reader)?)
        } else {
            None
        };
        Ok(PathUpdate { path, value })
    }

    /// Encode a partial update message: entry count then each entry
    pub fn encode_all(updates: &[PathUpdate]) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_len(updates.len());
        for update in updates {
            update.write_to(&mut writer);
        }
        writer.into_bytes()
    }

    /// Decode a whole partial update message
    pub fn decode_all(data: &[u8]) -> AttributeResult<Vec<PathUpdate>> {
        Self::decode_all_with_limits(data, &DecodeLimits::default())
    }

    pub fn decode_all_with_limits(data: &[u8], limits: &DecodeLimits) -> AttributeResult<Vec<PathUpdate>> {
        let mut reader = BinaryReader::with_limits(data, *limits);
        let count = reader.read_len()?;
        let mut updates = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            updates.push(PathUpdate::read_from(&mut reader)?);
        }
        reader.finish()?;
        Ok(updates)
    }
}

/// Attribute tree with dirty-path tracking and modification listeners
#[derive(Debug, Default)]
pub struct SyncedTreeAttribute {
    tree: TreeAttribute,
    all_dirty: bool,
    dirty_paths: IndexSet<String>,
    listeners: ListenerRegistry,
    config: AttributeConfig,
}

impl SyncedTreeAttribute {
    /// Empty, clean tree with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AttributeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Wrap existing contents. The tree starts all-dirty so the first flush
    /// sends everything.
    pub fn from_tree(tree: TreeAttribute) -> Self {
        Self::from_tree_with_config(tree, AttributeConfig::default())
    }

    pub fn from_tree_with_config(tree: TreeAttribute, config: AttributeConfig) -> Self {
        Self {
            tree,
            all_dirty: true,
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AttributeConfig {
        &self.config
    }

    pub fn tree(&self) -> &TreeAttribute {
        &self.tree
    }

    pub fn into_tree(self) -> TreeAttribute {
        self.tree
    }

    /// Direct mutable access that bypasses tracking. Callers must follow up
    /// with `mark_path_dirty` or `mark_all_dirty`.
    pub fn untracked_mut(&mut self) -> &mut TreeAttribute {
        &mut self.tree
    }

    pub fn is_all_dirty(&self) -> bool {
        self.all_dirty
    }

    /// Paths dirty since the last flush. Meaningless while all-dirty.
    pub fn dirty_paths(&self) -> impl Iterator<Item = &str> {
        self.dirty_paths.iter().map(String::as_str)
    }

    pub fn dirty_path_count(&self) -> usize {
        self.dirty_paths.len()
    }

    pub fn dirty_state(&self) -> DirtyState {
        if self.all_dirty {
            DirtyState::AllDirty
        } else if self.dirty_paths.is_empty() {
            DirtyState::Clean
        } else {
            DirtyState::PartiallyDirty
        }
    }

    /// Record `path` as modified, then notify listeners matching it
    pub fn mark_path_dirty(&mut self, path: &str) {
        if !self.all_dirty {
            self.dirty_paths.insert(path.to_string());

            if self.dirty_paths.len() > self.config.dirty_path_threshold {
                log::debug!(
                    "Dirty path count {} exceeds {}, resending whole tree",
                    self.dirty_paths.len(),
                    self.config.dirty_path_threshold
                );
                self.all_dirty = true;
                self.dirty_paths.clear();
            }
        }

        self.notify(path);
    }

    /// Force a full resend on the next flush
    pub fn mark_all_dirty(&mut self) {
        self.all_dirty = true;
        self.dirty_paths.clear();
    }

    /// Return to Clean without producing an update
    pub fn mark_clean(&mut self) {
        self.all_dirty = false;
        self.dirty_paths.clear();
    }

    /// Store `value` at `key`. A key containing `PATH_SEPARATOR` addresses a
    /// nested attribute, the same location its dirty path names on flush.
    /// Writing an identical value of the same type changes nothing and is not
    /// tracked; a key that crosses a non-tree value is not stored.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<Attribute>) {
        let value = value.into();
        if let Some(existing) = self.tree.get_attribute_by_path(key) {
            if existing.attribute_type() == value.attribute_type() && *existing == value {
                return;
            }
        }

        if let Err(err) = self.tree.set_attribute_by_path(key, value) {
            log::warn!("Not setting '{}': {}", key, err);
            return;
        }
        self.mark_path_dirty(key);
    }

    /// Store `value` at a multi-segment path, creating intermediate trees
    pub fn set_attribute_by_path(&mut self, path: &str, value: impl Into<Attribute>) -> AttributeResult<()> {
        self.tree.set_attribute_by_path(path, value)?;
        self.mark_path_dirty(path);
        Ok(())
    }

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

    /// Edit the nested tree at `key` (created if absent) and mark `key` dirty.
    /// `key` may be a path. Returns None without tracking if it reaches a
    /// non-tree value.
    pub fn modify_tree<R>(&mut self, key: &str, edit: impl FnOnce(&mut TreeAttribute) -> R) -> Option<R> {
        let result = edit(self.tree.get_or_add_tree_by_path(key).ok()?);
        self.mark_path_dirty(key);
        Some(result)
    }

    /// Remove the attribute at `key`. Listeners run first, then the whole
    /// tree is marked dirty.
    pub fn remove_attribute(&mut self, key: &str) -> Option<Attribute> {
        self.delete_attribute_by_path(key)
    }

    /// Remove the attribute at `path`; same dirty rules as `remove_attribute`
    pub fn delete_attribute_by_path(&mut self, path: &str) -> Option<Attribute> {
        let removed = self.tree.delete_attribute_by_path(path)?;
        self.notify(path);
        self.mark_all_dirty();
        Some(removed)
    }

    /// Register a listener for changes at or below `prefix` (`None` = all)
    pub fn register_modified_listener(&mut self, prefix: Option<&str>, listener: ModifiedListener) -> ListenerId {
        self.listeners.register(prefix, listener)
    }

    /// Remove every registration of `listener`; unknown listeners are a no-op
    pub fn unregister_listener(&mut self, listener: &ModifiedListener) -> usize {
        self.listeners.unregister(listener)
    }

    pub fn unregister_listener_id(&mut self, id: ListenerId) -> bool {
        self.listeners.unregister_id(id)
    }

    fn notify(&self, path: &str) {
        for listener in self.listeners.matching(path) {
            listener(&self.tree);
        }
    }

    fn notify_all(&self) {
        let mut called: Vec<ModifiedListener> = Vec::new();
        for listener in self.listeners.all() {
            if called.iter().any(|c| Arc::ptr_eq(c, &listener)) {
                continue;
            }
            listener(&self.tree);
            called.push(listener);
        }
    }

    /// Whole tree bytes
    pub fn encode_full_update(&self) -> Vec<u8> {
        self.tree.to_bytes()
    }

    /// Partial update message for the current dirty paths. Paths that no
    /// longer resolve are skipped. Tracking state is left untouched.
    pub fn encode_partial_update(&self) -> Vec<u8> {
        let entries: Vec<(&str, &Attribute)> = self
            .dirty_paths
            .iter()
            .filter_map(|path| {
                self.tree
                    .get_attribute_by_path(path)
                    .map(|value| (path.as_str(), value))
            })
            .collect();

        let mut writer = BinaryWriter::new();
        writer.write_len(entries.len());
        for (path, value) in entries {
            writer.write_string(path);
            writer.write_bool(true);
            value.write_tagged(&mut writer);
        }
        writer.into_bytes()
    }

    /// Produce the update for everything changed since the last flush and
    /// return to Clean. `None` when nothing changed.
    pub fn flush(&mut self) -> Option<SyncPacket> {
        let packet = match self.dirty_state() {
            DirtyState::Clean => return None,
            DirtyState::AllDirty => {
                let bytes = self.encode_full_update();
                log::debug!("Flushing full tree ({} bytes)", bytes.len());
                SyncPacket::Full(bytes)
            }
            DirtyState::PartiallyDirty => {
                let bytes = self.encode_partial_update();
                log::debug!(
                    "Flushing {} dirty paths ({} bytes)",
                    self.dirty_paths.len(),
                    bytes.len()
                );
                SyncPacket::Partial(bytes)
            }
        };

        self.mark_clean();
        Some(packet)
    }

    /// Replace the mirror with a whole-tree update and notify every listener
    /// once
    pub fn apply_full_update(&mut self, data: &[u8]) -> AttributeResult<()> {
        self.tree = TreeAttribute::from_bytes_with_limits(data, &self.config.limits)?;
        log::trace!("Applied full update with {} keys", self.tree.len());
        self.notify_all();
        Ok(())
    }

    /// Apply a partial update message. The whole message is decoded before
    /// the mirror changes, so a corrupt message leaves it untouched. Existing
    /// attributes of the same type are overwritten in place; listeners for
    /// each path run afterwards.
    pub fn apply_partial_update(&mut self, data: &[u8]) -> AttributeResult<()> {
        let updates = PathUpdate::decode_all_with_limits(data, &self.config.limits)?;

        let mut paths = Vec::with_capacity(updates.len());
        for PathUpdate { path, value } in updates {
            match value {
                Some(value) => apply_path_value(&mut self.tree, &path, value),
                None => {
                    self.tree.delete_attribute_by_path(&path);
                }
            }
            paths.push(path);
        }

        log::trace!("Applied partial update for {} paths", paths.len());
        for path in &paths {
            self.notify(path);
        }
        Ok(())
    }

    pub fn apply_packet(&mut self, packet: &SyncPacket) -> AttributeResult<()> {
        match packet {
            SyncPacket::Full(data) => self.apply_full_update(data),
            SyncPacket::Partial(data) => self.apply_partial_update(data),
        }
    }
}

/// Store a remote value at `path`. Intermediate segments the sender holds as
/// trees replace any stale leaf the mirror has there.
fn apply_path_value(tree: &mut TreeAttribute, path: &str, value: Attribute) {
    if let Some(existing) = tree.get_attribute_by_path_mut(path) {
        if existing.attribute_type() == value.attribute_type() {
            existing.overwrite_with(value);
            return;
        }
    }

    let (parent, leaf) = match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, leaf)) => (tree.force_tree_by_path(parent), leaf),
        None => (Some(tree), path),
    };
    match parent {
        Some(parent) => {
            parent.set_attribute(leaf, value);
        }
        None => log::warn!("Dropping remote value for '{}'", path),
    }
}

impl Deref for SyncedTreeAttribute {
    type Target = TreeAttribute;

    fn deref(&self) -> &TreeAttribute {
        &self.tree
    }
}

impl PartialEq for SyncedTreeAttribute {
    /// Compares contents only
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl Clone for SyncedTreeAttribute {
    /// Deep copy of contents and tracking state. Listeners are not copied.
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            all_dirty: self.all_dirty,
            dirty_paths: self.dirty_paths.clone(),
            listeners: ListenerRegistry::new(),
            config: self.config.clone(),
        }
    }
}

/// A synced tree behind one coarse lock, for owners that mutate and flush
/// from more than one thread
#[derive(Debug, Clone, Default)]
pub struct SharedSyncedTree {
    inner: Arc<Mutex<SyncedTreeAttribute>>,
}

impl SharedSyncedTree {
    pub fn new(tree: SyncedTreeAttribute) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tree)),
        }
    }

    /// Run `f` with the lock held
    pub fn with<R>(&self, f: impl FnOnce(&mut SyncedTreeAttribute) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn lock(&self) -> MutexGuard<'_, SyncedTreeAttribute> {
        self.inner.lock()
    }

    pub fn flush(&self) -> Option<SyncPacket> {
        self.inner.lock().flush()
    }
}
