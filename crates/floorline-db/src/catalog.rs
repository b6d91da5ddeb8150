//! Postgres-backed implementation of the pipeline's `Catalog` seam.

use async_trait::async_trait;
use sqlx::PgPool;

use floorline_core::catalog::{Catalog, CatalogError, PriceUpdate, ProductVariant};

use crate::products::{self, ProductRow};

/// [`Catalog`] over a Postgres pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_products(&self) -> Result<Vec<ProductVariant>, CatalogError> {
        let rows = products::list_products(&self.pool)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(into_variant).collect())
    }

    async fn update_price(&self, update: &PriceUpdate) -> Result<bool, CatalogError> {
        products::update_price(&self.pool, update)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))
    }
}

fn into_variant(row: ProductRow) -> ProductVariant {
    ProductVariant {
        name: row.name,
        width: row.width,
        description: row.description,
        category: row.category,
        cost_price: row.cost_price,
        standard_price: row.standard_price,
        min_qty_discount: row.min_qty_discount,
        discount_percentage: row.discount_percentage,
        discount_type: row.discount_type,
        promotion_name: row.promotion_name,
        promotion_start_date: row.promotion_start_date,
        promotion_end_date: row.promotion_end_date,
        volume_discounts: row.volume_discounts,
        supplier_id: row.supplier_id,
        supplier_name: row.supplier_name,
        updated_at: Some(row.updated_at),
    }
}
