//! Results reported by one reply-processing run.

use serde::Serialize;

/// One catalog update that was written and then verified by re-reading
/// the stored price.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedUpdate {
    /// Display name, `"White Oak (5\")"` or just the name when widthless.
    pub name: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub promotion: Option<String>,
    pub volume_discounts: Option<String>,
}

/// Summary of one supplier message that led to at least one verified
/// update. Messages with nothing actionable produce no result at all.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierReplyResult {
    pub supplier: String,
    pub products: Vec<AppliedUpdate>,
    pub status: String,
    pub message: String,
}
