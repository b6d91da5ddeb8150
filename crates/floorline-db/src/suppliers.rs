//! Database operations for the `suppliers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `suppliers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub contact_info: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Inserts a supplier and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including unique
/// violations on name or email).
pub async fn add_supplier(
    pool: &PgPool,
    name: &str,
    email: &str,
    contact_info: Option<&str>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO suppliers (name, email, contact_info) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(name.trim())
    .bind(email.trim())
    .bind(contact_info)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// All suppliers ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_suppliers(pool: &PgPool) -> Result<Vec<SupplierRow>, DbError> {
    let rows = sqlx::query_as::<_, SupplierRow>(
        "SELECT id, name, email, contact_info, is_active, created_at \
         FROM suppliers \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of suppliers currently marked active.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_active_suppliers(pool: &PgPool) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE is_active")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
