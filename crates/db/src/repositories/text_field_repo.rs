//! Repository for the `text_fields` table.

use livetext_core::text_field::SaveEntry;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::text_field::TextFieldRow;

/// Column list for text_fields queries.
const COLUMNS: &str = "key, content, page, section, updated_at, updated_by";

/// Provides read and write operations for current text field content.
pub struct TextFieldRepo;

impl TextFieldRepo {
    /// Find the current row for a key.
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<TextFieldRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM text_fields WHERE key = $1");
        sqlx::query_as::<_, TextFieldRow>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List current rows, optionally scoped by page and/or section, ordered by key.
    pub async fn list(
        pool: &PgPool,
        page: Option<&str>,
        section: Option<&str>,
    ) -> Result<Vec<TextFieldRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM text_fields
             WHERE ($1::TEXT IS NULL OR page = $1)
               AND ($2::TEXT IS NULL OR section = $2)
             ORDER BY key"
        );
        sqlx::query_as::<_, TextFieldRow>(&query)
            .bind(page)
            .bind(section)
            .fetch_all(pool)
            .await
    }

    /// Take a transaction-scoped advisory lock on a key.
    ///
    /// Unlike `FOR UPDATE` this also blocks on keys that have no row yet, so
    /// two first saves of one key run one after the other instead of racing
    /// on the primary key. Callers must lock keys in sorted order.
    pub async fn lock_key(tx: &mut Transaction<'_, Postgres>, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Read the current row for a key and lock it until the transaction ends.
    pub async fn lock_by_key(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<Option<TextFieldRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM text_fields WHERE key = $1 FOR UPDATE");
        sqlx::query_as::<_, TextFieldRow>(&query)
            .bind(key)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a never-before-saved field.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        entry: &SaveEntry,
        actor: &str,
    ) -> Result<TextFieldRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO text_fields (key, content, page, section, updated_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TextFieldRow>(&query)
            .bind(&entry.key)
            .bind(&entry.content)
            .bind(&entry.page)
            .bind(&entry.section)
            .bind(actor)
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite the content of an existing field. Page and section are only
    /// replaced when the entry supplies them.
    pub async fn update_content(
        tx: &mut Transaction<'_, Postgres>,
        entry: &SaveEntry,
        actor: &str,
    ) -> Result<TextFieldRow, sqlx::Error> {
        let query = format!(
            "UPDATE text_fields SET
                content = $2,
                page = COALESCE($3, page),
                section = COALESCE($4, section),
                updated_at = now(),
                updated_by = $5
             WHERE key = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TextFieldRow>(&query)
            .bind(&entry.key)
            .bind(&entry.content)
            .bind(&entry.page)
            .bind(&entry.section)
            .bind(actor)
            .fetch_one(&mut **tx)
            .await
    }
}
