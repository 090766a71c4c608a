//! Handlers for editable page text and its version history.
//!
//! Reads of current content are public so pages can render without a
//! session. Saving, browsing history and pruning require an editor.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use livetext_core::error::CoreError;
use livetext_core::text_field::{clamp_history_limit, validate_key, SaveEntry, TextFieldFilter};
use livetext_core::types::VersionNumber;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ListFieldsParams {
    pub page: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSaveRequest {
    pub entries: Vec<SaveEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PruneRequest {
    pub keep: i64,
}

/* --------------------------------------------------------------------------
Current content
-------------------------------------------------------------------------- */

/// GET /text-fields
///
/// List current fields, optionally scoped by `page` and `section`.
pub async fn list_fields(
    State(state): State<AppState>,
    Query(params): Query<ListFieldsParams>,
) -> AppResult<impl IntoResponse> {
    let filter = TextFieldFilter {
        page: params.page,
        section: params.section,
    };
    let fields = state.ledger.list_current(&filter).await?;
    Ok(Json(DataResponse { data: fields }))
}

/// GET /text-fields/{key}
///
/// Fetch the current content of one field, 404 if it was never saved.
pub async fn get_field(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_key(&key)?;
    let field = state
        .ledger
        .get_current(&key)
        .await?
        .ok_or_else(|| CoreError::field_not_found(&key))?;
    Ok(Json(DataResponse { data: field }))
}

/// POST /text-fields
///
/// Atomically save a batch of `{key, content}` entries as the caller.
pub async fn batch_save(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<BatchSaveRequest>,
) -> AppResult<impl IntoResponse> {
    let outcomes = state.ledger.batch_save(&input.entries, &user.actor).await?;

    tracing::info!(
        actor = %user.actor,
        count = outcomes.len(),
        "Text fields saved"
    );

    Ok(Json(DataResponse { data: outcomes }))
}

/* --------------------------------------------------------------------------
History
-------------------------------------------------------------------------- */

/// GET /text-fields/{key}/history
///
/// Version records for a field, newest first.
pub async fn list_history(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    validate_key(&key)?;
    let limit = clamp_history_limit(params.limit);
    let versions = state.ledger.list_history(&key, limit).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /text-fields/{key}/history/{version}
///
/// A single version record, used by the editor to restore old content.
pub async fn get_version(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path((key, version_number)): Path<(String, VersionNumber)>,
) -> AppResult<impl IntoResponse> {
    validate_key(&key)?;
    if version_number < 1 {
        return Err(AppError::BadRequest(format!(
            "Version number must be 1 or greater (got {version_number})"
        )));
    }

    let record = state
        .ledger
        .get_version(&key, version_number)
        .await?
        .ok_or_else(|| CoreError::version_not_found(&key, version_number))?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /text-fields/{key}/history/prune
///
/// Delete all but the `keep` newest version records of a field.
pub async fn prune_history(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<PruneRequest>,
) -> AppResult<impl IntoResponse> {
    validate_key(&key)?;
    let result = state.ledger.prune_history(&key, input.keep).await?;

    tracing::info!(
        actor = %user.actor,
        key = %key,
        keep = input.keep,
        deleted = result.deleted_count,
        "Text field history pruned"
    );

    Ok(Json(DataResponse { data: result }))
}
