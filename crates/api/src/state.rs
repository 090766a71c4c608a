use std::sync::Arc;

use livetext_core::ledger::LedgerStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Version Ledger storage (PostgreSQL in production, in-memory in tests).
    pub ledger: Arc<dyn LedgerStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
