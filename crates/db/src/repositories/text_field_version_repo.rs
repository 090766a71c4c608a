//! Repository for the `text_field_versions` table.
//!
//! Version rows are immutable snapshots; the only mutation besides insert is
//! pruning the oldest rows of a key.

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::text_field_version::TextFieldVersionRow;

/// Column list for text_field_versions queries.
const COLUMNS: &str = "key, version_number, content, created_at, created_by";

/// Provides create, read and prune operations for text field versions.
pub struct TextFieldVersionRepo;

impl TextFieldVersionRepo {
    /// Highest version number recorded for a key, if any.
    pub async fn latest_version_number(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: (Option<i32>,) =
            sqlx::query_as("SELECT MAX(version_number) FROM text_field_versions WHERE key = $1")
                .bind(key)
                .fetch_one(&mut **tx)
                .await?;
        Ok(row.0)
    }

    /// Insert a snapshot of superseded content.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
        version_number: i32,
        content: &str,
        created_by: &str,
    ) -> Result<TextFieldVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO text_field_versions (key, version_number, content, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TextFieldVersionRow>(&query)
            .bind(key)
            .bind(version_number)
            .bind(content)
            .bind(created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// List up to `limit` versions of a key, newest first.
    pub async fn list_for_key(
        pool: &PgPool,
        key: &str,
        limit: i64,
    ) -> Result<Vec<TextFieldVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM text_field_versions
             WHERE key = $1
             ORDER BY version_number DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, TextFieldVersionRow>(&query)
            .bind(key)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Find a specific version of a key.
    pub async fn find(
        pool: &PgPool,
        key: &str,
        version_number: i32,
    ) -> Result<Option<TextFieldVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM text_field_versions
             WHERE key = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, TextFieldVersionRow>(&query)
            .bind(key)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// Delete all but the `keep` newest versions of a key.
    ///
    /// Returns `(deleted, kept)` row counts.
    pub async fn prune(pool: &PgPool, key: &str, keep: i64) -> Result<(u64, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM text_field_versions
             WHERE key = $1
               AND version_number NOT IN (
                   SELECT version_number FROM text_field_versions
                   WHERE key = $1
                   ORDER BY version_number DESC
                   LIMIT $2
               )",
        )
        .bind(key)
        .bind(keep)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let kept: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM text_field_versions WHERE key = $1")
                .bind(key)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok((deleted, kept.0.max(0) as u64))
    }
}
