//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use floorline_core::catalog::{PriceUpdate, SUPPORTED_WIDTHS};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table, joined with the supplier name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub width: String,
    pub description: Option<String>,
    pub category: String,
    pub cost_price: f64,
    pub standard_price: f64,
    pub min_qty_discount: Option<i32>,
    pub discount_percentage: Option<f64>,
    pub discount_type: Option<String>,
    pub promotion_name: Option<String>,
    /// Free-text date; parsed tolerantly by `floorline_core::promotion`.
    pub promotion_start_date: Option<String>,
    pub promotion_end_date: Option<String>,
    pub volume_discounts: Option<String>,
    pub supplier_id: Option<i64>,
    /// From the LEFT JOIN; `NULL` when no supplier is linked.
    pub supplier_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`add_product`]. Only name, width and the prices are usually
/// set; everything else defaults to the catalog's conventions.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub width: String,
    pub description: Option<String>,
    /// Defaults to `"Hardwood"` when `None`.
    pub category: Option<String>,
    pub cost_price: f64,
    pub standard_price: f64,
    pub min_qty_discount: Option<i32>,
    pub discount_percentage: Option<f64>,
    pub discount_type: Option<String>,
    pub promotion_name: Option<String>,
    pub promotion_start_date: Option<String>,
    pub promotion_end_date: Option<String>,
    pub volume_discounts: Option<String>,
    pub supplier_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// operations
// ---------------------------------------------------------------------------

/// Fetches the full catalog ordered by name then width.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.name, p.width, p.description, p.category, \
                p.cost_price, p.standard_price, p.min_qty_discount, \
                p.discount_percentage, p.discount_type, p.promotion_name, \
                p.promotion_start_date, p.promotion_end_date, p.volume_discounts, \
                p.supplier_id, s.name AS supplier_name, p.updated_at \
         FROM products p \
         LEFT JOIN suppliers s ON p.supplier_id = s.id \
         ORDER BY p.name, p.width",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Applies one verified price update to the row(s) addressed by
/// `(name, width)`; a `width` of `None` addresses every width of the name.
///
/// With a discount attached the update also writes the promotion columns
/// and derives `cost_price` as 70% of the new price; without one only the
/// price columns move, cost tracking price. Returns `false` when no row
/// matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn update_price(pool: &PgPool, update: &PriceUpdate) -> Result<bool, DbError> {
    if !product_exists(pool, &update.name, update.width.as_deref()).await? {
        tracing::warn!(
            product = %update.name,
            width = update.width.as_deref().unwrap_or("any"),
            "price update addressed a product that does not exist"
        );
        return Ok(false);
    }

    let rows_affected = if update.discount_percentage.is_some() {
        let cost_price = update.price * 0.7;
        let query = if update.width.is_some() {
            "UPDATE products SET \
                 standard_price = $1, cost_price = $2, \
                 discount_percentage = $3, min_qty_discount = $4, \
                 promotion_name = $5, volume_discounts = $6, \
                 supplier_id = COALESCE($7, supplier_id), \
                 updated_at = NOW() \
             WHERE name = $8 AND width = $9"
        } else {
            "UPDATE products SET \
                 standard_price = $1, cost_price = $2, \
                 discount_percentage = $3, min_qty_discount = $4, \
                 promotion_name = $5, volume_discounts = $6, \
                 supplier_id = COALESCE($7, supplier_id), \
                 updated_at = NOW() \
             WHERE name = $8"
        };

        let mut q = sqlx::query(query)
            .bind(update.price)
            .bind(cost_price)
            .bind(update.discount_percentage)
            .bind(update.min_qty)
            .bind(&update.promotion_name)
            .bind(&update.volume_discounts)
            .bind(update.supplier_id)
            .bind(&update.name);
        if let Some(width) = &update.width {
            q = q.bind(width);
        }
        q.execute(pool).await?.rows_affected()
    } else {
        let query = if update.width.is_some() {
            "UPDATE products SET \
                 standard_price = $1, cost_price = $2, \
                 supplier_id = COALESCE($3, supplier_id), \
                 updated_at = NOW() \
             WHERE name = $4 AND width = $5"
        } else {
            "UPDATE products SET \
                 standard_price = $1, cost_price = $2, \
                 supplier_id = COALESCE($3, supplier_id), \
                 updated_at = NOW() \
             WHERE name = $4"
        };

        let mut q = sqlx::query(query)
            .bind(update.price)
            .bind(update.price)
            .bind(update.supplier_id)
            .bind(&update.name);
        if let Some(width) = &update.width {
            q = q.bind(width);
        }
        q.execute(pool).await?.rows_affected()
    };

    Ok(rows_affected > 0)
}

async fn product_exists(pool: &PgPool, name: &str, width: Option<&str>) -> Result<bool, DbError> {
    let id: Option<i64> = match width {
        Some(width) => {
            sqlx::query_scalar("SELECT id FROM products WHERE name = $1 AND width = $2 LIMIT 1")
                .bind(name)
                .bind(width)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT id FROM products WHERE name = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(pool)
                .await?
        }
    };
    Ok(id.is_some())
}

/// Inserts a new product row and returns its id.
///
/// The width is canonicalised with a trailing `"`; the standard price
/// falls back to the cost price when unset.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a unique
/// violation on `(name, width)`).
pub async fn add_product(pool: &PgPool, product: &NewProduct) -> Result<i64, DbError> {
    let width = canonical_width(&product.width);
    let standard_price = if product.standard_price > 0.0 {
        product.standard_price
    } else {
        product.cost_price
    };
    let category = product.category.as_deref().unwrap_or("Hardwood");

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products \
             (name, width, description, category, cost_price, standard_price, \
              min_qty_discount, discount_percentage, discount_type, \
              promotion_name, promotion_start_date, promotion_end_date, \
              volume_discounts, supplier_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING id",
    )
    .bind(product.name.trim())
    .bind(&width)
    .bind(&product.description)
    .bind(category)
    .bind(product.cost_price)
    .bind(standard_price)
    .bind(product.min_qty_discount)
    .bind(product.discount_percentage)
    .bind(&product.discount_type)
    .bind(&product.promotion_name)
    .bind(&product.promotion_start_date)
    .bind(&product.promotion_end_date)
    .bind(&product.volume_discounts)
    .bind(product.supplier_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Width-completion backfill: every product name gets a row for every
/// supported width, cloning the attributes of an existing row of that name.
///
/// Returns the number of rows inserted. Runs in one transaction so a
/// partial backfill never lands.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn ensure_all_widths(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    let names: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT name FROM products ORDER BY name")
            .fetch_all(&mut *tx)
            .await?;

    let mut added = 0usize;
    for name in &names {
        for width in SUPPORTED_WIDTHS {
            let inserted = sqlx::query(
                "INSERT INTO products \
                     (name, width, description, category, cost_price, standard_price, \
                      min_qty_discount, discount_percentage, discount_type, \
                      promotion_name, promotion_start_date, promotion_end_date, \
                      volume_discounts, supplier_id) \
                 SELECT t.name, $2, \
                        COALESCE(t.description, t.name || ' flooring - ' || $2 || ' width'), \
                        t.category, t.cost_price, t.standard_price, \
                        t.min_qty_discount, t.discount_percentage, t.discount_type, \
                        t.promotion_name, t.promotion_start_date, t.promotion_end_date, \
                        t.volume_discounts, t.supplier_id \
                 FROM (SELECT * FROM products WHERE name = $1 ORDER BY width LIMIT 1) t \
                 ON CONFLICT (name, width) DO NOTHING",
            )
            .bind(name)
            .bind(width)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            added += usize::try_from(inserted).unwrap_or(0);
        }
    }

    tx.commit().await?;

    if added > 0 {
        tracing::info!(added, "width backfill inserted missing variants");
    }
    Ok(added)
}

fn canonical_width(width: &str) -> String {
    let trimmed = width.trim();
    if trimmed.is_empty() || trimmed.ends_with('"') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_gets_trailing_quote() {
        assert_eq!(canonical_width("5"), "5\"");
        assert_eq!(canonical_width(" 7 "), "7\"");
    }

    #[test]
    fn canonical_width_is_idempotent() {
        assert_eq!(canonical_width("5\""), "5\"");
        assert_eq!(canonical_width(""), "");
    }
}
