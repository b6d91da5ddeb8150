//! The structured shape both extraction strategies produce.

use serde::{Deserialize, Serialize};

/// One price mention parsed out of a supplier email, pre-normalization.
///
/// `name` and `price_per_sqft` are the only required fields — a record
/// missing either is never produced. Everything else is optional context
/// that passes through to the catalog write when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPriceUpdate {
    pub name: String,
    pub width: Option<String>,
    pub price_per_sqft: f64,
    pub discount_percentage: Option<f64>,
    pub min_qty_discount: Option<i32>,
    /// Promotion name or free-text hint.
    pub promotion: Option<String>,
    /// Free-text volume-discount tier specification.
    pub volume_discounts: Option<String>,
}

impl ExtractedPriceUpdate {
    #[must_use]
    pub fn new(name: impl Into<String>, width: Option<String>, price_per_sqft: f64) -> Self {
        Self {
            name: name.into(),
            width,
            price_per_sqft,
            discount_percentage: None,
            min_qty_discount: None,
            promotion: None,
            volume_discounts: None,
        }
    }
}

/// Everything one extraction pass found in one email body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub products: Vec<ExtractedPriceUpdate>,
    pub notes: String,
}
