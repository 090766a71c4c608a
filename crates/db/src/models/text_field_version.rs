//! Row model for the `text_field_versions` table.

use livetext_core::text_field::VersionRecord;
use livetext_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `text_field_versions` table. Rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TextFieldVersionRow {
    pub key: String,
    pub version_number: i32,
    pub content: String,
    pub created_at: Timestamp,
    pub created_by: String,
}

impl From<TextFieldVersionRow> for VersionRecord {
    fn from(row: TextFieldVersionRow) -> Self {
        VersionRecord {
            key: row.key,
            version_number: row.version_number,
            content: row.content,
            created_at: row.created_at,
            created_by: row.created_by,
        }
    }
}
