//! In-process [`LedgerStore`] backed by a `tokio::sync::RwLock`.
//!
//! A batch is applied to a cloned working copy that replaces the live state
//! only after every entry succeeded, which gives the same all-or-nothing
//! behaviour as a database transaction.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{next_version_number, outcome, plan_save, LedgerStore};
use crate::error::CoreError;
use crate::text_field::{
    validate_batch, validate_keep, PruneResult, SaveAction, SaveEntry, SaveOutcome, TextField,
    TextFieldFilter, VersionRecord,
};
use crate::types::VersionNumber;

#[derive(Debug, Clone, Default)]
struct LedgerState {
    fields: BTreeMap<String, TextField>,
    /// Version records per key in ascending version order.
    history: HashMap<String, Vec<VersionRecord>>,
}

/// Volatile ledger used by tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    unavailable: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a storage outage: while set, every operation fails with
    /// [`CoreError::Storage`] and nothing is written.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("ledger storage is unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError> {
        self.check_available()?;
        Ok(self.state.read().await.fields.get(key).cloned())
    }

    async fn list_current(&self, filter: &TextFieldFilter) -> Result<Vec<TextField>, CoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .fields
            .values()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect())
    }

    async fn batch_save(
        &self,
        entries: &[SaveEntry],
        actor: &str,
    ) -> Result<Vec<SaveOutcome>, CoreError> {
        validate_batch(entries)?;
        self.check_available()?;

        let mut state = self.state.write().await;
        let mut working = state.clone();
        let now = chrono::Utc::now();
        let mut outcomes = Vec::with_capacity(entries.len());

        for entry in entries {
            let action = plan_save(working.fields.get(&entry.key), entry);
            match action {
                SaveAction::Created => {
                    working.fields.insert(
                        entry.key.clone(),
                        TextField {
                            key: entry.key.clone(),
                            content: entry.content.clone(),
                            page: entry.page.clone(),
                            section: entry.section.clone(),
                            updated_at: now,
                            updated_by: actor.to_string(),
                        },
                    );
                    outcomes.push(outcome(&entry.key, action, None));
                }
                SaveAction::Versioned => {
                    let Some(field) = working.fields.get_mut(&entry.key) else {
                        return Err(CoreError::Internal(format!(
                            "field '{}' vanished during batch save",
                            entry.key
                        )));
                    };
                    let versions = working.history.entry(entry.key.clone()).or_default();
                    let version_number =
                        next_version_number(versions.last().map(|v| v.version_number));
                    versions.push(VersionRecord {
                        key: entry.key.clone(),
                        version_number,
                        content: std::mem::take(&mut field.content),
                        created_at: now,
                        created_by: field.updated_by.clone(),
                    });

                    field.content = entry.content.clone();
                    field.updated_at = now;
                    field.updated_by = actor.to_string();
                    if entry.page.is_some() {
                        field.page = entry.page.clone();
                    }
                    if entry.section.is_some() {
                        field.section = entry.section.clone();
                    }
                    outcomes.push(outcome(&entry.key, action, Some(version_number)));
                }
                SaveAction::Unchanged => {
                    outcomes.push(outcome(&entry.key, action, None));
                }
            }
        }

        *state = working;
        tracing::debug!(actor, count = outcomes.len(), "Memory ledger batch applied");
        Ok(outcomes)
    }

    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state
            .history
            .get(key)
            .map(|versions| versions.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.history.get(key).and_then(|versions| {
            versions
                .iter()
                .find(|v| v.version_number == version_number)
                .cloned()
        }))
    }

    async fn prune_history(&self, key: &str, keep: i64) -> Result<PruneResult, CoreError> {
        validate_keep(keep)?;
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(versions) = state.history.get_mut(key) else {
            return Ok(PruneResult {
                deleted_count: 0,
                kept_count: 0,
            });
        };

        let keep = usize::try_from(keep).unwrap_or(usize::MAX);
        let excess = versions.len().saturating_sub(keep);
        versions.drain(..excess);

        Ok(PruneResult {
            deleted_count: excess as u64,
            kept_count: versions.len() as u64,
        })
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn save(ledger: &MemoryLedger, key: &str, content: &str, actor: &str) -> SaveOutcome {
        ledger
            .batch_save(&[SaveEntry::new(key, content)], actor)
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn first_save_creates_without_history() {
        let ledger = MemoryLedger::new();
        let out = save(&ledger, "hero-title", "Welcome", "ada").await;
        assert_eq!(out.action, SaveAction::Created);
        assert!(out.success);

        let field = ledger.get_current("hero-title").await.unwrap().unwrap();
        assert_eq!(field.content, "Welcome");
        assert_eq!(field.updated_by, "ada");
        assert!(ledger.list_history("hero-title", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_key_is_absent() {
        let ledger = MemoryLedger::new();
        assert!(ledger.get_current("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn changed_save_snapshots_previous_author() {
        let ledger = MemoryLedger::new();
        save(&ledger, "k", "A", "ada").await;
        let out = save(&ledger, "k", "B", "grace").await;
        assert_eq!(out.action, SaveAction::Versioned);
        assert_eq!(out.version_number, Some(1));

        let history = ledger.list_history("k", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "A");
        assert_eq!(history[0].created_by, "ada");

        let field = ledger.get_current("k").await.unwrap().unwrap();
        assert_eq!(field.content, "B");
        assert_eq!(field.updated_by, "grace");
    }

    #[tokio::test]
    async fn identical_save_writes_nothing() {
        let ledger = MemoryLedger::new();
        save(&ledger, "k", "A", "ada").await;
        let before = ledger.get_current("k").await.unwrap().unwrap();

        let out = save(&ledger, "k", "A", "grace").await;
        assert_eq!(out.action, SaveAction::Unchanged);
        assert!(ledger.list_history("k", 10).await.unwrap().is_empty());
        assert_eq!(ledger.get_current("k").await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn history_is_monotonic_and_newest_first() {
        let ledger = MemoryLedger::new();
        for content in ["v0", "v1", "v2", "v3"] {
            save(&ledger, "k", content, "ada").await;
        }
        let history = ledger.list_history("k", 10).await.unwrap();
        let numbers: Vec<_> = history.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(history[0].content, "v2");
        assert_eq!(history[2].content, "v0");

        let limited = ledger.list_history("k", 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].version_number, 3);
    }

    #[tokio::test]
    async fn restore_by_resaving_old_content_appends_history() {
        let ledger = MemoryLedger::new();
        for content in ["A", "B", "C"] {
            save(&ledger, "k", content, "ada").await;
        }
        let v1 = ledger.get_version("k", 1).await.unwrap().unwrap();
        assert_eq!(v1.content, "A");

        let out = save(&ledger, "k", &v1.content, "ada").await;
        assert_eq!(out.version_number, Some(3));
        assert_eq!(ledger.get_current("k").await.unwrap().unwrap().content, "A");

        assert_eq!(ledger.get_version("k", 1).await.unwrap().unwrap().content, "A");
        assert_eq!(ledger.get_version("k", 2).await.unwrap().unwrap().content, "B");
        assert_eq!(ledger.get_version("k", 3).await.unwrap().unwrap().content, "C");
    }

    #[tokio::test]
    async fn prune_keeps_newest() {
        let ledger = MemoryLedger::new();
        for i in 0..6 {
            save(&ledger, "k", &format!("v{i}"), "ada").await;
        }
        assert_eq!(ledger.list_history("k", 100).await.unwrap().len(), 5);

        let result = ledger.prune_history("k", 2).await.unwrap();
        assert_eq!(result.deleted_count, 3);
        assert_eq!(result.kept_count, 2);

        let numbers: Vec<_> = ledger
            .list_history("k", 100)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![5, 4]);
        assert!(ledger.get_current("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn numbering_restarts_after_full_prune() {
        let ledger = MemoryLedger::new();
        for content in ["a", "b", "c"] {
            save(&ledger, "k", content, "ada").await;
        }
        ledger.prune_history("k", 0).await.unwrap();
        let out = save(&ledger, "k", "d", "ada").await;
        // No records survive, so max + 1 starts over.
        assert_eq!(out.version_number, Some(1));
    }

    #[tokio::test]
    async fn prune_unknown_key_reports_zero() {
        let ledger = MemoryLedger::new();
        let result = ledger.prune_history("missing", 3).await.unwrap();
        assert_eq!(result.deleted_count, 0);
        assert_eq!(result.kept_count, 0);
    }

    #[tokio::test]
    async fn duplicate_keys_reject_whole_batch() {
        let ledger = MemoryLedger::new();
        let entries = vec![
            SaveEntry::new("a", "1"),
            SaveEntry::new("b", "1"),
            SaveEntry::new("a", "2"),
        ];
        let result = ledger.batch_save(&entries, "ada").await;
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(ledger.get_current("a").await.unwrap().is_none());
        assert!(ledger.get_current("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_storage_fails_without_writing() {
        let ledger = MemoryLedger::new();
        save(&ledger, "k", "A", "ada").await;
        ledger.set_unavailable(true);

        let result = ledger
            .batch_save(&[SaveEntry::new("k", "B"), SaveEntry::new("new", "x")], "ada")
            .await;
        assert_matches!(result, Err(CoreError::Storage(_)));
        assert_matches!(ledger.ping().await, Err(CoreError::Storage(_)));

        ledger.set_unavailable(false);
        assert_eq!(ledger.get_current("k").await.unwrap().unwrap().content, "A");
        assert!(ledger.get_current("new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_current_filters_by_page() {
        let ledger = MemoryLedger::new();
        let mut home = SaveEntry::new("home.title", "Hi");
        home.page = Some("home".into());
        let mut about = SaveEntry::new("about.title", "About");
        about.page = Some("about".into());
        ledger.batch_save(&[home, about], "ada").await.unwrap();

        let all = ledger.list_current(&TextFieldFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = ledger.list_current(&TextFieldFilter::page("home")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].key, "home.title");
    }

    #[tokio::test]
    async fn page_metadata_survives_saves_without_it() {
        let ledger = MemoryLedger::new();
        let mut entry = SaveEntry::new("home.title", "Hi");
        entry.page = Some("home".into());
        ledger.batch_save(&[entry], "ada").await.unwrap();
        save(&ledger, "home.title", "Hello", "ada").await;

        let field = ledger.get_current("home.title").await.unwrap().unwrap();
        assert_eq!(field.page.as_deref(), Some("home"));
    }
}
