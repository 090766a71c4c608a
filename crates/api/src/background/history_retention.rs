//! Periodic pruning of text field history.
//!
//! Walks every current field and trims its version records to the newest
//! `keep`. Current content is never touched. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use livetext_core::error::CoreError;
use livetext_core::ledger::LedgerStore;
use livetext_core::text_field::TextFieldFilter;
use tokio_util::sync::CancellationToken;

/// Prune the history of every current field down to `keep` records.
///
/// A failure on one key is logged and does not stop the sweep. Returns the
/// total number of deleted records.
pub async fn prune_all(ledger: &dyn LedgerStore, keep: i64) -> Result<u64, CoreError> {
    let fields = ledger.list_current(&TextFieldFilter::default()).await?;

    let mut deleted = 0;
    for field in &fields {
        match ledger.prune_history(&field.key, keep).await {
            Ok(result) => deleted += result.deleted_count,
            Err(e) => {
                tracing::warn!(key = %field.key, error = %e, "History retention: prune failed");
            }
        }
    }
    Ok(deleted)
}

/// Run the history retention loop until `cancel` is triggered.
pub async fn run(
    ledger: Arc<dyn LedgerStore>,
    keep: i64,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        keep,
        interval_secs = interval.as_secs(),
        "History retention job started"
    );

    let mut interval = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("History retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match prune_all(ledger.as_ref(), keep).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "History retention: pruned old versions");
                    }
                    Ok(_) => {
                        tracing::debug!("History retention: nothing to prune");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "History retention: sweep failed");
                    }
                }
            }
        }
    }
}
