//! Pending-edit store: staged, unsaved text edits with linear undo/redo.
//!
//! Pure in-memory state machine. Nothing here performs I/O; the
//! [`session`](crate::session) module submits the staged set to the ledger.
//!
//! Only transitions *between* pending values are undoable. The very first
//! stage of a key records no history entry, so undo never reaches back past
//! the saved baseline.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::text_field::SaveEntry;
use crate::types::Timestamp;

/// Maximum number of entries retained in each of the undo and redo logs.
pub const MAX_UNDO_ENTRIES: usize = 50;

/// One recorded transition of a field's pending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub key: String,
    pub previous_value: String,
    pub new_value: String,
    pub timestamp: Timestamp,
}

/// Read-only signals the admin toolbar renders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditorSignals {
    pub has_pending_changes: bool,
    pub pending_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Staged edits keyed by field key, plus bounded undo/redo logs.
#[derive(Debug, Clone)]
pub struct PendingEditStore {
    changes: BTreeMap<String, String>,
    undo_log: VecDeque<HistoryEntry>,
    redo_log: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for PendingEditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingEditStore {
    /// Create an empty store bounded to [`MAX_UNDO_ENTRIES`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_UNDO_ENTRIES)
    }

    /// Create an empty store whose logs keep at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            changes: BTreeMap::new(),
            undo_log: VecDeque::new(),
            redo_log: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stage `value` as the pending content for `key`.
    ///
    /// Overwriting an existing, different pending value records an undo
    /// entry. Any change to the pending set clears the redo log; staging
    /// the value that is already pending does nothing.
    pub fn stage(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if self.changes.get(&key) == Some(&value) {
            return;
        }

        let previous = self.changes.insert(key.clone(), value.clone());
        if let Some(previous_value) = previous {
            push_bounded(
                &mut self.undo_log,
                HistoryEntry {
                    key,
                    previous_value,
                    new_value: value,
                    timestamp: chrono::Utc::now(),
                },
                self.capacity,
            );
        }
        self.redo_log.clear();
    }

    /// Remove the pending value for `key`.
    ///
    /// Undo and redo entries for `key` are dropped as well so a discarded
    /// field cannot be brought back by [`undo`](Self::undo). Returns `true`
    /// if a pending value was removed.
    pub fn discard(&mut self, key: &str) -> bool {
        let removed = self.changes.remove(key).is_some();
        self.undo_log.retain(|e| e.key != key);
        self.redo_log.retain(|e| e.key != key);
        removed
    }

    /// Drop every pending change and both logs.
    pub fn discard_all(&mut self) {
        self.changes.clear();
        self.undo_log.clear();
        self.redo_log.clear();
    }

    /// Revert the most recent transition. Returns the entry that was undone.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_log.pop_back()?;
        self.changes
            .insert(entry.key.clone(), entry.previous_value.clone());
        push_bounded(&mut self.redo_log, entry.clone(), self.capacity);
        Some(entry)
    }

    /// Re-apply the most recently undone transition.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_log.pop_back()?;
        self.changes.insert(entry.key.clone(), entry.new_value.clone());
        push_bounded(&mut self.undo_log, entry.clone(), self.capacity);
        Some(entry)
    }

    /// Pending value for `key`, if staged.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.changes.get(key).map(String::as_str)
    }

    /// Pending `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The staged set as a batch-save payload, in key order.
    pub fn to_save_entries(&self) -> Vec<SaveEntry> {
        self.iter().map(|(k, v)| SaveEntry::new(k, v)).collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.changes.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_log.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_log.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_log.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_log.iter()
    }

    pub fn signals(&self) -> EditorSignals {
        EditorSignals {
            has_pending_changes: self.has_pending_changes(),
            pending_count: self.pending_count(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }
}

fn push_bounded(log: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, capacity: usize) {
    log.push_back(entry);
    while log.len() > capacity {
        log.pop_front();
    }
}
