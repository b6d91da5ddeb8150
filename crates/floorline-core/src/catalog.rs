//! The product-catalog seam consumed by the reply pipeline.
//!
//! The pipeline only needs two operations — list and conditional price
//! update — so the trait stays that narrow. The Postgres implementation
//! lives in `floorline-db`; tests use in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every plank width a product can be stocked in. The width-completion
/// backfill clones a product across this list.
pub const SUPPORTED_WIDTHS: &[&str] = &[
    "2.5\"", "3.5\"", "4\"", "5\"", "6\"", "7\"", "8\"", "10\"", "11\"", "12\"", "13\"", "14\"",
];

/// A catalog row. Identity is the (name, width) pair; no two rows may share
/// both. Promotion dates stay as raw strings — they originate from
/// free-text extraction and are re-parsed tolerantly at read time by
/// [`crate::promotion`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
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
    pub promotion_start_date: Option<String>,
    pub promotion_end_date: Option<String>,
    /// Free-text tier specification, parsed on demand by
    /// [`crate::pricing::discount_for_quantity`].
    pub volume_discounts: Option<String>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A validated price update addressed at a (name, width) row. `width` of
/// `None` targets any row with the name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceUpdate {
    pub name: String,
    pub width: Option<String>,
    pub price: f64,
    pub discount_percentage: Option<f64>,
    pub min_qty: Option<i32>,
    pub promotion_name: Option<String>,
    pub volume_discounts: Option<String>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog storage error: {0}")]
    Storage(String),
}

/// Product store operations the pipeline depends on.
///
/// `update_price` must be atomic per call (fully applied or not at all) and
/// return `Ok(false)` when no row matches the (name, width) address —
/// a miss is an expected outcome, not an error.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductVariant>, CatalogError>;
    async fn update_price(&self, update: &PriceUpdate) -> Result<bool, CatalogError>;
}
