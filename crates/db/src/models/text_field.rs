//! Row model for the `text_fields` table.

use livetext_core::text_field::TextField;
use livetext_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `text_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TextFieldRow {
    pub key: String,
    pub content: String,
    pub page: Option<String>,
    pub section: Option<String>,
    pub updated_at: Timestamp,
    pub updated_by: String,
}

impl From<TextFieldRow> for TextField {
    fn from(row: TextFieldRow) -> Self {
        TextField {
            key: row.key,
            content: row.content,
            page: row.page,
            section: row.section,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        }
    }
}
