//! [`LedgerStore`] over PostgreSQL.
//!
//! A batch save runs inside a single transaction: every touched key is
//! locked (in key order, so overlapping batches cannot deadlock), superseded
//! content is snapshotted, and the transaction commits only when every entry
//! succeeded. Any error rolls the whole batch back. Concurrent saves of one
//! key serialize and the later one wins.

use async_trait::async_trait;
use livetext_core::error::CoreError;
use livetext_core::ledger::{next_version_number, outcome, plan_save, LedgerStore};
use livetext_core::text_field::{
    validate_batch, validate_keep, PruneResult, SaveAction, SaveEntry, SaveOutcome, TextField,
    TextFieldFilter, VersionRecord,
};
use livetext_core::types::VersionNumber;

use crate::repositories::{TextFieldRepo, TextFieldVersionRepo};
use crate::DbPool;

/// PostgreSQL unique-violation error code.
const UNIQUE_VIOLATION: &str = "23505";

/// Version Ledger persisted in the `text_fields` / `text_field_versions` tables.
#[derive(Clone)]
pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error into the storage-agnostic error type.
///
/// Key locks keep batch saves from hitting the primary key; a unique
/// violation here means a writer bypassed them.
fn storage_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return CoreError::Conflict(format!(
                "Concurrent save detected: {}",
                db_err.constraint().unwrap_or("unknown constraint")
            ));
        }
    }
    tracing::error!(error = %err, "Ledger database error");
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl LedgerStore for PgLedger {
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError> {
        let row = TextFieldRepo::find_by_key(&self.pool, key)
            .await
            .map_err(storage_error)?;
        Ok(row.map(TextField::from))
    }

    async fn list_current(&self, filter: &TextFieldFilter) -> Result<Vec<TextField>, CoreError> {
        let rows = TextFieldRepo::list(
            &self.pool,
            filter.page.as_deref(),
            filter.section.as_deref(),
        )
        .await
        .map_err(storage_error)?;
        Ok(rows.into_iter().map(TextField::from).collect())
    }

    async fn batch_save(
        &self,
        entries: &[SaveEntry],
        actor: &str,
    ) -> Result<Vec<SaveOutcome>, CoreError> {
        validate_batch(entries)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let mut keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        keys.sort_unstable();
        for key in keys {
            TextFieldRepo::lock_key(&mut tx, key)
                .await
                .map_err(storage_error)?;
        }

        let mut outcomes = Vec::with_capacity(entries.len());

        for entry in entries {
            let existing = TextFieldRepo::lock_by_key(&mut tx, &entry.key)
                .await
                .map_err(storage_error)?
                .map(TextField::from);

            let action = plan_save(existing.as_ref(), entry);
            match (action, existing) {
                (SaveAction::Created, _) => {
                    TextFieldRepo::insert(&mut tx, entry, actor)
                        .await
                        .map_err(storage_error)?;
                    outcomes.push(outcome(&entry.key, action, None));
                }
                (SaveAction::Versioned, Some(previous)) => {
                    let latest = TextFieldVersionRepo::latest_version_number(&mut tx, &entry.key)
                        .await
                        .map_err(storage_error)?;
                    let version_number = next_version_number(latest);
                    TextFieldVersionRepo::create(
                        &mut tx,
                        &entry.key,
                        version_number,
                        &previous.content,
                        &previous.updated_by,
                    )
                    .await
                    .map_err(storage_error)?;
                    TextFieldRepo::update_content(&mut tx, entry, actor)
                        .await
                        .map_err(storage_error)?;
                    outcomes.push(outcome(&entry.key, action, Some(version_number)));
                }
                (SaveAction::Versioned, None) => {
                    return Err(CoreError::Internal(format!(
                        "versioned save planned for absent field '{}'",
                        entry.key
                    )));
                }
                (SaveAction::Unchanged, _) => {
                    outcomes.push(outcome(&entry.key, action, None));
                }
            }
        }

        tx.commit().await.map_err(storage_error)?;

        tracing::debug!(actor, count = outcomes.len(), "Ledger batch committed");
        Ok(outcomes)
    }

    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError> {
        let rows = TextFieldVersionRepo::list_for_key(&self.pool, key, limit)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(VersionRecord::from).collect())
    }

    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError> {
        let row = TextFieldVersionRepo::find(&self.pool, key, version_number)
            .await
            .map_err(storage_error)?;
        Ok(row.map(VersionRecord::from))
    }

    async fn prune_history(&self, key: &str, keep: i64) -> Result<PruneResult, CoreError> {
        validate_keep(keep)?;
        let (deleted_count, kept_count) = TextFieldVersionRepo::prune(&self.pool, key, keep)
            .await
            .map_err(storage_error)?;
        Ok(PruneResult {
            deleted_count,
            kept_count,
        })
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(storage_error)
    }
}
