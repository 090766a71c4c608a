//! Client-side view of the ledger used by an edit session.
//!
//! A session never names its actor per call: the gateway already knows who
//! is editing (an in-process actor name, or a bearer token over HTTP).

use std::sync::Arc;

use async_trait::async_trait;

use super::LedgerStore;
use crate::error::CoreError;
use crate::text_field::{SaveEntry, SaveOutcome, TextField, VersionRecord};
use crate::types::VersionNumber;

/// The ledger operations an [`EditSession`](crate::session::EditSession) calls.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError>;

    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError>;

    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError>;

    async fn batch_save(&self, entries: &[SaveEntry]) -> Result<Vec<SaveOutcome>, CoreError>;
}

/// In-process gateway over any [`LedgerStore`], saving as a fixed actor.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn LedgerStore>,
    actor: String,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn LedgerStore>, actor: impl Into<String>) -> Self {
        Self {
            store,
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

#[async_trait]
impl LedgerGateway for StoreGateway {
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError> {
        self.store.get_current(key).await
    }

    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError> {
        self.store.list_history(key, limit).await
    }

    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError> {
        self.store.get_version(key, version_number).await
    }

    async fn batch_save(&self, entries: &[SaveEntry]) -> Result<Vec<SaveOutcome>, CoreError> {
        self.store.batch_save(entries, &self.actor).await
    }
}
