//! Quote base pricing: active-promotion discounts plus volume tiers.

use chrono::NaiveDateTime;

use floorline_core::catalog::ProductVariant;
use floorline_core::pricing::discount_for_quantity;
use floorline_core::promotion;

/// Per-sqft price for one variant at `now`: the standard price, discounted
/// by `discount_percentage` while the promotion window is active. Cost
/// price stands in when no standard price is set.
#[must_use]
pub fn effective_base_price(variant: &ProductVariant, now: NaiveDateTime) -> f64 {
    let base = if variant.standard_price > 0.0 {
        variant.standard_price
    } else {
        variant.cost_price
    };

    match variant.discount_percentage {
        Some(pct)
            if promotion::is_active(
                variant.promotion_start_date.as_deref(),
                variant.promotion_end_date.as_deref(),
                now,
            ) =>
        {
            base * (1.0 - pct / 100.0)
        }
        _ => base,
    }
}

/// Total for `quantity_sqft` of one variant: the effective base price with
/// the best matching volume tier applied on top.
#[must_use]
pub fn quote_total(variant: &ProductVariant, quantity_sqft: u32, now: NaiveDateTime) -> f64 {
    let unit = effective_base_price(variant, now);
    let volume_pct = variant
        .volume_discounts
        .as_deref()
        .map_or(0.0, |text| discount_for_quantity(text, quantity_sqft));

    unit * (1.0 - volume_pct / 100.0) * f64::from(quantity_sqft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn variant() -> ProductVariant {
        ProductVariant {
            name: "White Oak".to_string(),
            width: "5\"".to_string(),
            description: None,
            category: "Hardwood".to_string(),
            cost_price: 4.25,
            standard_price: 4.50,
            min_qty_discount: Some(500),
            discount_percentage: Some(10.0),
            discount_type: Some("bulk".to_string()),
            promotion_name: Some("Fall Sale 2025".to_string()),
            promotion_start_date: Some("2025-11-01".to_string()),
            promotion_end_date: Some("2025-11-30".to_string()),
            volume_discounts: Some("500-999 sqft: 5% off, 1000+ sqft: 10% off".to_string()),
            supplier_id: None,
            supplier_name: None,
            updated_at: None,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn discount_applies_inside_promotion_window() {
        let price = effective_base_price(&variant(), at(2025, 11, 15));
        assert!((price - 4.05).abs() < 1e-9);
    }

    #[test]
    fn standard_price_outside_promotion_window() {
        let price = effective_base_price(&variant(), at(2025, 12, 15));
        assert!((price - 4.50).abs() < 1e-9);
    }

    #[test]
    fn promotion_still_active_on_end_date_evening() {
        let now = NaiveDate::from_ymd_opt(2025, 11, 30)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let price = effective_base_price(&variant(), now);
        assert!((price - 4.05).abs() < 1e-9);
    }

    #[test]
    fn cost_price_stands_in_when_standard_unset() {
        let mut v = variant();
        v.standard_price = 0.0;
        v.discount_percentage = None;
        let price = effective_base_price(&v, at(2025, 11, 15));
        assert!((price - 4.25).abs() < 1e-9);
    }

    #[test]
    fn quote_total_applies_best_volume_tier() {
        // Active promotion (10% off 4.50 = 4.05) plus the 1000+ tier (10%).
        let total = quote_total(&variant(), 1000, at(2025, 11, 15));
        assert!((total - 4.05 * 0.9 * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn quote_total_without_tiers_is_unit_times_quantity() {
        let mut v = variant();
        v.volume_discounts = None;
        let total = quote_total(&v, 300, at(2025, 12, 15));
        assert!((total - 4.50 * 300.0).abs() < 1e-6);
    }

    #[test]
    fn below_first_tier_gets_no_volume_discount() {
        let total = quote_total(&variant(), 100, at(2025, 12, 15));
        assert!((total - 4.50 * 100.0).abs() < 1e-6);
    }
}
