//! Version Ledger: durable current content plus append-only history.
//!
//! [`LedgerStore`] is the storage seam. Implementations must apply a batch
//! save as one unit of work: either every entry lands or none does.
//! [`plan_save`] holds the per-entry decision both implementations share.

pub mod gateway;
pub mod memory;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::text_field::{
    PruneResult, SaveAction, SaveEntry, SaveOutcome, TextField, TextFieldFilter, VersionRecord,
};
use crate::types::VersionNumber;

pub use gateway::{LedgerGateway, StoreGateway};
pub use memory::MemoryLedger;

/// Durable storage for text fields and their version records.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current record for `key`, or `None` if it was never saved.
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError>;

    /// All current records passing `filter`, ordered by key.
    async fn list_current(&self, filter: &TextFieldFilter) -> Result<Vec<TextField>, CoreError>;

    /// Atomically save every entry on behalf of `actor`.
    ///
    /// Changed content is snapshotted into history before it is overwritten.
    async fn batch_save(
        &self,
        entries: &[SaveEntry],
        actor: &str,
    ) -> Result<Vec<SaveOutcome>, CoreError>;

    /// Up to `limit` version records for `key`, newest first.
    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError>;

    /// A single version record.
    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError>;

    /// Delete all but the `keep` newest version records for `key`.
    async fn prune_history(&self, key: &str, keep: i64) -> Result<PruneResult, CoreError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Decide what saving `entry` over `existing` does.
pub fn plan_save(existing: Option<&TextField>, entry: &SaveEntry) -> SaveAction {
    match existing {
        None => SaveAction::Created,
        Some(field) if field.content == entry.content => SaveAction::Unchanged,
        Some(_) => SaveAction::Versioned,
    }
}

/// Version number for the next snapshot given the highest existing one.
pub fn next_version_number(latest: Option<VersionNumber>) -> VersionNumber {
    latest.unwrap_or(0) + 1
}

/// Build the per-entry outcome reported back to callers.
pub fn outcome(key: &str, action: SaveAction, version_number: Option<VersionNumber>) -> SaveOutcome {
    SaveOutcome {
        key: key.to_string(),
        success: true,
        action,
        version_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(content: &str) -> TextField {
        TextField {
            key: "k".to_string(),
            content: content.to_string(),
            page: None,
            section: None,
            updated_at: chrono::Utc::now(),
            updated_by: "ada".to_string(),
        }
    }

    #[test]
    fn absent_field_is_created() {
        assert_eq!(plan_save(None, &SaveEntry::new("k", "v")), SaveAction::Created);
    }

    #[test]
    fn changed_content_is_versioned() {
        let field = existing("old");
        assert_eq!(
            plan_save(Some(&field), &SaveEntry::new("k", "new")),
            SaveAction::Versioned
        );
    }

    #[test]
    fn identical_content_is_unchanged() {
        let field = existing("same");
        assert_eq!(
            plan_save(Some(&field), &SaveEntry::new("k", "same")),
            SaveAction::Unchanged
        );
    }

    #[test]
    fn version_numbers_start_at_one() {
        assert_eq!(next_version_number(None), 1);
        assert_eq!(next_version_number(Some(0)), 1);
        assert_eq!(next_version_number(Some(7)), 8);
    }
}
