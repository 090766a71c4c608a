//! Editable text fields, their version records, and batch-save payloads.
//!
//! Provides the shared domain types exchanged between the edit session,
//! the HTTP layer and storage, plus validation and paging helpers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, VersionNumber};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a field key in bytes.
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum length of a field's content in bytes.
pub const MAX_CONTENT_LENGTH: usize = 200_000;

/// Maximum length of the `page` / `section` classification labels.
pub const MAX_LABEL_LENGTH: usize = 100;

/// Punctuation allowed in field keys besides ASCII letters and digits.
pub const KEY_PUNCTUATION: &[char] = &['.', '_', '-', ':'];

/// Default number of version records returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Upper bound on the number of version records returned by one query.
pub const MAX_HISTORY_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The current content of one editable text slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    pub key: String,
    pub content: String,
    pub page: Option<String>,
    pub section: Option<String>,
    pub updated_at: Timestamp,
    pub updated_by: String,
}

/// An immutable snapshot of content that a later save replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub key: String,
    pub version_number: VersionNumber,
    pub content: String,
    pub created_at: Timestamp,
    /// Author of the superseded content, not of the save that replaced it.
    pub created_by: String,
}

/// Optional scoping for bulk reads of current fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFieldFilter {
    pub page: Option<String>,
    pub section: Option<String>,
}

impl TextFieldFilter {
    /// Filter scoped to a single page.
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            section: None,
        }
    }

    /// Returns `true` if `field` passes every set criterion.
    pub fn matches(&self, field: &TextField) -> bool {
        let page_ok = match &self.page {
            Some(p) => field.page.as_deref() == Some(p.as_str()),
            None => true,
        };
        let section_ok = match &self.section {
            Some(s) => field.section.as_deref() == Some(s.as_str()),
            None => true,
        };
        page_ok && section_ok
    }
}

// ---------------------------------------------------------------------------
// Batch save DTOs
// ---------------------------------------------------------------------------

/// One `{key, content}` pair of a batch save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEntry {
    pub key: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl SaveEntry {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            page: None,
            section: None,
        }
    }
}

/// What a batch save did to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// The key had never been saved; the field was created without history.
    Created,
    /// The previous content was snapshotted and then overwritten.
    Versioned,
    /// The content was identical; nothing was written.
    Unchanged,
}

/// Per-entry result of a batch save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub key: String,
    pub success: bool,
    pub action: SaveAction,
    /// Number of the snapshot written for `Versioned` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<VersionNumber>,
}

/// Result of pruning one key's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneResult {
    pub deleted_count: u64,
    pub kept_count: u64,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a field key: non-empty, bounded, restricted character set.
///
/// Keys travel as URL path segments, so a leading `.` is rejected: `.` and
/// `..` would be collapsed as dot-segments by any URL parser.
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() {
        return Err(CoreError::Validation(
            "Field key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Field key exceeds maximum length of {MAX_KEY_LENGTH} characters (got {})",
            key.len()
        )));
    }
    if key.starts_with('.') {
        return Err(CoreError::Validation(format!(
            "Field key '{key}' must not start with '.'"
        )));
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !KEY_PUNCTUATION.contains(c))
    {
        return Err(CoreError::Validation(format!(
            "Field key '{key}' contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

/// Validate field content: length check only (can be empty).
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters (got {})",
            content.len()
        )));
    }
    Ok(())
}

fn validate_label(name: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.len() > MAX_LABEL_LENGTH => Err(CoreError::Validation(format!(
            "{name} exceeds maximum length of {MAX_LABEL_LENGTH} characters (got {})",
            v.len()
        ))),
        _ => Ok(()),
    }
}

/// Validate a whole batch before any write: every entry must be valid and
/// no key may appear twice.
pub fn validate_batch(entries: &[SaveEntry]) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for entry in entries {
        validate_key(&entry.key)?;
        validate_content(&entry.content)?;
        validate_label("Page", entry.page.as_deref())?;
        validate_label("Section", entry.section.as_deref())?;
        if !seen.insert(entry.key.as_str()) {
            return Err(CoreError::Validation(format!(
                "Field key '{}' appears more than once in the batch",
                entry.key
            )));
        }
    }
    Ok(())
}

/// Validate a retention count for pruning.
pub fn validate_keep(keep: i64) -> Result<(), CoreError> {
    if keep < 0 {
        return Err(CoreError::Validation(format!(
            "keep must be zero or greater (got {keep})"
        )));
    }
    Ok(())
}

/// Clamp a user-provided history limit to `[1, MAX_HISTORY_LIMIT]`.
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
