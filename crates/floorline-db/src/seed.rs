//! Sample catalog for demos and local development.

use sqlx::PgPool;

use crate::DbError;

struct SampleProduct {
    name: &'static str,
    width: &'static str,
    description: &'static str,
    category: &'static str,
    cost_price: f64,
    standard_price: f64,
    min_qty_discount: Option<i32>,
    discount_percentage: Option<f64>,
    discount_type: Option<&'static str>,
    promotion_name: Option<&'static str>,
    promotion_start_date: Option<&'static str>,
    promotion_end_date: Option<&'static str>,
    volume_discounts: Option<&'static str>,
}

const fn plain(
    name: &'static str,
    width: &'static str,
    description: &'static str,
    category: &'static str,
    cost_price: f64,
    standard_price: f64,
) -> SampleProduct {
    SampleProduct {
        name,
        width,
        description,
        category,
        cost_price,
        standard_price,
        min_qty_discount: None,
        discount_percentage: None,
        discount_type: None,
        promotion_name: None,
        promotion_start_date: None,
        promotion_end_date: None,
        volume_discounts: None,
    }
}

#[allow(clippy::too_many_arguments)]
const fn promoted(
    name: &'static str,
    width: &'static str,
    description: &'static str,
    category: &'static str,
    cost_price: f64,
    standard_price: f64,
    min_qty_discount: i32,
    discount_percentage: f64,
    promotion_name: &'static str,
    promotion_start_date: &'static str,
    promotion_end_date: &'static str,
    volume_discounts: &'static str,
) -> SampleProduct {
    SampleProduct {
        name,
        width,
        description,
        category,
        cost_price,
        standard_price,
        min_qty_discount: Some(min_qty_discount),
        discount_percentage: Some(discount_percentage),
        discount_type: Some("bulk"),
        promotion_name: Some(promotion_name),
        promotion_start_date: Some(promotion_start_date),
        promotion_end_date: Some(promotion_end_date),
        volume_discounts: Some(volume_discounts),
    }
}

const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    promoted(
        "White Oak", "5\"", "Premium grade white oak flooring - prefinished", "Hardwood",
        4.25, 4.50, 500, 10.0, "Fall Sale 2025", "2025-11-01", "2025-11-30",
        "500-999 sqft: 5% off, 1000-1499 sqft: 8% off, 1500+ sqft: 10% off",
    ),
    promoted(
        "White Oak", "7\"", "Wide plank white oak flooring - luxury grade", "Hardwood",
        4.75, 5.00, 300, 12.0, "Premium Wide Plank Special", "2025-11-15", "2025-12-15",
        "300-799 sqft: 7% off, 800-1199 sqft: 10% off, 1200+ sqft: 12% off",
    ),
    plain(
        "Red Oak", "5\"", "Traditional red oak flooring - natural finish", "Hardwood",
        3.85, 4.10,
    ),
    promoted(
        "Red Oak", "7\"", "Classic red oak planks - hand-scraped texture", "Hardwood",
        4.15, 4.40, 400, 8.0, "Contractor Discount", "2025-11-01", "2026-01-31",
        "400-799 sqft: 5% off, 800-1199 sqft: 6% off, 1200+ sqft: 8% off",
    ),
    plain(
        "Maple", "4\"", "Select grade maple flooring - Canadian sourced", "Hardwood",
        4.50, 4.85,
    ),
    promoted(
        "Maple", "6\"", "Wide plank maple flooring - engineered core", "Hardwood",
        4.95, 5.25, 250, 15.0, "Holiday Bundle Deal", "2025-12-01", "2025-12-31",
        "250-599 sqft: 8% off, 600-999 sqft: 12% off, 1000+ sqft: 15% off",
    ),
    promoted(
        "Walnut", "5\"", "Premium walnut flooring - exotic grade", "Hardwood",
        5.95, 6.50, 200, 18.0, "Luxury Flooring Promotion", "2025-11-20", "2025-12-20",
        "200-399 sqft: 10% off, 400-599 sqft: 14% off, 600+ sqft: 18% off",
    ),
    promoted(
        "Walnut", "7\"", "Luxury wide plank walnut - hand-selected", "Hardwood",
        6.75, 7.25, 150, 20.0, "Exclusive Offer", "2025-11-01", "2025-11-30",
        "150-299 sqft: 12% off, 300-499 sqft: 16% off, 500+ sqft: 20% off",
    ),
    promoted(
        "Bamboo", "5\"", "Sustainable bamboo flooring - LEED eligible", "Eco",
        3.95, 4.25, 600, 7.0, "Eco-Friendly Initiative", "2025-11-01", "2025-12-31",
        "600-999 sqft: 4% off, 1000-1499 sqft: 5% off, 1500+ sqft: 7% off",
    ),
    promoted(
        "Cork", "6\"", "Natural cork planks - renewable resource", "Eco",
        3.85, 4.15, 700, 9.0, "Green Building Special", "2025-10-15", "2026-01-15",
        "700-999 sqft: 5% off, 1000-1499 sqft: 7% off, 1500+ sqft: 9% off",
    ),
    plain(
        "Laminate", "4\"", "Commercial grade laminate - high durability", "Budget",
        1.95, 2.15,
    ),
];

const SAMPLE_SUPPLIERS: &[(&str, &str, &str)] = &[
    (
        "Premium Hardwoods Inc",
        "sales@premiumhardwoods.com",
        "USA's leading hardwood supplier - established 1995",
    ),
    (
        "EcoFloor Solutions",
        "info@ecofloorsolutions.com",
        "Sustainable flooring specialist - ISO certified",
    ),
    (
        "Classic Woods International",
        "orders@classicwoods.com",
        "Traditional wood specialists - global sourcing",
    ),
    (
        "Budget Flooring Direct",
        "contact@budgetflooring.com",
        "Cost-effective flooring solutions - bulk orders",
    ),
    (
        "Luxury Imports Ltd",
        "premium@luxuryimports.com",
        "Exotic wood imports - white-glove service",
    ),
];

/// Replaces the catalog with the sample data set.
///
/// Returns `(products, suppliers)` inserted. Everything runs inside one
/// transaction; a failure rolls the whole reset back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn seed_sample_data(pool: &PgPool) -> Result<(usize, usize), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM sync_history").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM suppliers").execute(&mut *tx).await?;

    for product in SAMPLE_PRODUCTS {
        sqlx::query(
            "INSERT INTO products \
                 (name, width, description, category, cost_price, standard_price, \
                  min_qty_discount, discount_percentage, discount_type, \
                  promotion_name, promotion_start_date, promotion_end_date, \
                  volume_discounts) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(product.name)
        .bind(product.width)
        .bind(product.description)
        .bind(product.category)
        .bind(product.cost_price)
        .bind(product.standard_price)
        .bind(product.min_qty_discount)
        .bind(product.discount_percentage)
        .bind(product.discount_type)
        .bind(product.promotion_name)
        .bind(product.promotion_start_date)
        .bind(product.promotion_end_date)
        .bind(product.volume_discounts)
        .execute(&mut *tx)
        .await?;
    }

    for (name, email, contact_info) in SAMPLE_SUPPLIERS {
        sqlx::query("INSERT INTO suppliers (name, email, contact_info) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(email)
            .bind(contact_info)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        products = SAMPLE_PRODUCTS.len(),
        suppliers = SAMPLE_SUPPLIERS.len(),
        "sample data seeded"
    );
    Ok((SAMPLE_PRODUCTS.len(), SAMPLE_SUPPLIERS.len()))
}
