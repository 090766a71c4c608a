//! Route definitions for editable page text.
//!
//! Registered under `/text-fields`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::text_fields;
use crate::state::AppState;

/// Text field routes, registered as `/text-fields`.
///
/// ```text
/// GET    /                               list_fields (public)
/// POST   /                               batch_save
/// GET    /{key}                          get_field (public)
/// GET    /{key}/history                  list_history
/// GET    /{key}/history/{version}        get_version
/// POST   /{key}/history/prune            prune_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(text_fields::list_fields).post(text_fields::batch_save),
        )
        .route("/{key}", get(text_fields::get_field))
        .route("/{key}/history", get(text_fields::list_history))
        .route("/{key}/history/prune", post(text_fields::prune_history))
        .route("/{key}/history/{version}", get(text_fields::get_version))
}
