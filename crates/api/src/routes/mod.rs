pub mod health;
pub mod text_fields;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /text-fields                                     list (public), batch save
/// /text-fields/{key}                               current content (public)
/// /text-fields/{key}/history                       version records
/// /text-fields/{key}/history/{version}             one version record
/// /text-fields/{key}/history/prune                 prune old versions (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/text-fields", text_fields::router())
}
