//! Edit session: the command surface the admin toolbar and inline editors
//! call into.
//!
//! Composes a [`PendingEditStore`], a [`TextCache`] and a [`LedgerGateway`].
//! Undo and redo only touch pending state; the ledger is contacted on reads,
//! restores and [`save_all`](EditSession::save_all).

use crate::cache::TextCache;
use crate::error::CoreError;
use crate::ledger::LedgerGateway;
use crate::pending::{EditorSignals, HistoryEntry, PendingEditStore};
use crate::text_field::{SaveOutcome, VersionRecord};
use crate::types::VersionNumber;

pub struct EditSession {
    pending: PendingEditStore,
    cache: TextCache,
    gateway: Box<dyn LedgerGateway>,
}

impl EditSession {
    pub fn new(gateway: impl LedgerGateway + 'static) -> Self {
        Self::with_store(Box::new(gateway), PendingEditStore::new())
    }

    /// Build a session around an existing pending store (e.g. a custom
    /// undo capacity).
    pub fn with_store(gateway: Box<dyn LedgerGateway>, pending: PendingEditStore) -> Self {
        Self {
            pending,
            cache: TextCache::new(),
            gateway,
        }
    }

    // -----------------------------------------------------------------------
    // Pending edits
    // -----------------------------------------------------------------------

    pub fn stage(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pending.stage(key, value);
    }

    pub fn discard(&mut self, key: &str) -> bool {
        self.pending.discard(key)
    }

    pub fn discard_all(&mut self) {
        self.pending.discard_all();
    }

    pub fn undo(&mut self) -> Option<HistoryEntry> {
        self.pending.undo()
    }

    pub fn redo(&mut self) -> Option<HistoryEntry> {
        self.pending.redo()
    }

    /// Input port for whatever binding the UI maps to "undo".
    pub fn on_undo_requested(&mut self) -> Option<HistoryEntry> {
        self.undo()
    }

    /// Input port for whatever binding the UI maps to "redo".
    pub fn on_redo_requested(&mut self) -> Option<HistoryEntry> {
        self.redo()
    }

    pub fn signals(&self) -> EditorSignals {
        self.pending.signals()
    }

    pub fn pending(&self) -> &PendingEditStore {
        &self.pending
    }

    pub fn cache(&self) -> &TextCache {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Saved content for `key`, or `fallback` if the key was never saved.
    ///
    /// Read-through: the first lookup of a key hits the ledger, later ones
    /// are served from the cache until the next successful save.
    pub async fn get_current(&mut self, key: &str, fallback: &str) -> Result<String, CoreError> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.clone().unwrap_or_else(|| fallback.to_string()));
        }

        let content = self.gateway.get_current(key).await?.map(|f| f.content);
        self.cache.set(key, content.clone());
        Ok(content.unwrap_or_else(|| fallback.to_string()))
    }

    /// What an inline editor should show: the pending value if one is
    /// staged, otherwise the saved content.
    pub async fn display_value(&mut self, key: &str, fallback: &str) -> Result<String, CoreError> {
        if let Some(value) = self.pending.get(key) {
            return Ok(value.to_string());
        }
        self.get_current(key, fallback).await
    }

    pub async fn list_history(
        &self,
        key: &str,
        limit: i64,
    ) -> Result<Vec<VersionRecord>, CoreError> {
        self.gateway.list_history(key, limit).await
    }

    // -----------------------------------------------------------------------
    // Restore / save
    // -----------------------------------------------------------------------

    /// Stage the content of a historical version as a new pending edit.
    ///
    /// History is not rewritten; the next save snapshots whatever is current
    /// at that point like any other change.
    pub async fn restore(
        &mut self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<VersionRecord, CoreError> {
        let record = self
            .gateway
            .get_version(key, version_number)
            .await?
            .ok_or_else(|| CoreError::version_not_found(key, version_number))?;

        self.pending.stage(key, record.content.clone());
        tracing::debug!(key, version_number, "Staged historical version");
        Ok(record)
    }

    /// Submit every pending change as one batch.
    ///
    /// On success pending changes, both logs and the cache are cleared. On
    /// failure nothing is cleared so the caller can retry.
    pub async fn save_all(&mut self) -> Result<Vec<SaveOutcome>, CoreError> {
        if !self.pending.has_pending_changes() {
            return Ok(Vec::new());
        }

        let entries = self.pending.to_save_entries();
        let outcomes = match self.gateway.batch_save(&entries).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::warn!(error = %e, count = entries.len(), "Save all failed; edits kept");
                return Err(e);
            }
        };

        self.pending.discard_all();
        self.cache.clear();
        tracing::info!(count = outcomes.len(), "Saved pending text edits");
        Ok(outcomes)
    }
}
