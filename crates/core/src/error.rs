#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The underlying persistence layer (database, remote ledger) failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing text field.
    pub fn field_not_found(key: &str) -> Self {
        Self::NotFound {
            entity: "TextField",
            key: key.to_string(),
        }
    }

    /// Shorthand for a missing version record, keyed as `key@vN`.
    pub fn version_not_found(key: &str, version_number: i32) -> Self {
        Self::NotFound {
            entity: "VersionRecord",
            key: format!("{key}@v{version_number}"),
        }
    }
}
