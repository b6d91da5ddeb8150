//! Audit trail for scheduled jobs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `sync_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncEventRow {
    pub id: i64,
    pub sync_type: String,
    pub status: String,
    pub message: Option<String>,
    pub supplier_id: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Records one job outcome. `status` is one of `success`, `error` or
/// `skipped`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn log_sync_event(
    pool: &PgPool,
    sync_type: &str,
    status: &str,
    message: Option<&str>,
    supplier_id: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO sync_history (sync_type, status, message, supplier_id) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(sync_type)
    .bind(status)
    .bind(message)
    .bind(supplier_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent successful run of a job type, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn last_successful_sync(
    pool: &PgPool,
    sync_type: &str,
) -> Result<Option<SyncEventRow>, DbError> {
    let row = sqlx::query_as::<_, SyncEventRow>(
        "SELECT id, sync_type, status, message, supplier_id, occurred_at \
         FROM sync_history \
         WHERE sync_type = $1 AND status = 'success' \
         ORDER BY occurred_at DESC \
         LIMIT 1",
    )
    .bind(sync_type)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
