//! Price sanity bounds and volume-discount tier evaluation.
//!
//! Tier text arrives from free-text supplier emails and is stored verbatim
//! on the catalog row; it is re-parsed at read time. Malformed text must
//! never panic or error — it simply yields no discount.

use std::sync::OnceLock;

use regex::Regex;

pub const MIN_PRICE: f64 = 0.01;
pub const MAX_PRICE: f64 = 1000.0;

/// Sanity fence against extraction hallucination: a misread "$5,140" or a
/// percentage mistaken for a price must be rejected outright.
#[must_use]
pub fn is_valid_price(price: f64) -> bool {
    (MIN_PRICE..=MAX_PRICE).contains(&price)
}

/// One quantity-range-to-percentage mapping within a volume-discount
/// specification. `max_qty` of `None` means unbounded above.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeTier {
    pub min_qty: u32,
    pub max_qty: Option<u32>,
    pub discount_pct: f64,
}

impl VolumeTier {
    /// Inclusive on both bounds.
    #[must_use]
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_qty && self.max_qty.is_none_or(|max| quantity <= max)
    }
}

fn tier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "500-999 sqft: 5% off", "500 to 999 sqft - 5%", "1000+ sqft: 10% off"
        Regex::new(r"(?i)(\d+)\s*(?:(?:to|-)\s*(\d+)|\+)?\s*sq\.?\s*ft\s*[:-]\s*(\d+(?:\.\d+)?)\s*%")
            .expect("tier regex is valid")
    })
}

/// Parses free-text volume-discount tiers, comma/newline separated and
/// order-independent. Returns `None` when nothing in the text parses.
#[must_use]
pub fn parse_volume_tiers(text: &str) -> Option<Vec<VolumeTier>> {
    let tiers: Vec<VolumeTier> = tier_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let min_qty = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let max_qty = match caps.get(2) {
                Some(m) => Some(m.as_str().parse::<u32>().ok()?),
                None => None,
            };
            let discount_pct = caps.get(3)?.as_str().parse::<f64>().ok()?;
            Some(VolumeTier {
                min_qty,
                max_qty,
                discount_pct,
            })
        })
        .collect();

    if tiers.is_empty() {
        None
    } else {
        Some(tiers)
    }
}

/// Evaluates tier text against a quantity. Ranges are independent and the
/// maximum matching percentage wins when tiers overlap — not first-match.
/// Unparsable text degrades to `0.0`.
#[must_use]
pub fn discount_for_quantity(tier_text: &str, quantity: u32) -> f64 {
    let Some(tiers) = parse_volume_tiers(tier_text) else {
        return 0.0;
    };
    tiers
        .iter()
        .filter(|tier| tier.contains(quantity))
        .map(|tier| tier.discount_pct)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // is_valid_price
    // -----------------------------------------------------------------------

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(is_valid_price(0.01));
        assert!(is_valid_price(1000.0));
        assert!(is_valid_price(3.95));
    }

    #[test]
    fn zero_and_negative_prices_rejected() {
        assert!(!is_valid_price(0.0));
        assert!(!is_valid_price(-4.25));
    }

    #[test]
    fn hallucinated_large_price_rejected() {
        assert!(!is_valid_price(5140.0));
    }

    // -----------------------------------------------------------------------
    // parse_volume_tiers
    // -----------------------------------------------------------------------

    #[test]
    fn parses_bounded_and_unbounded_tiers() {
        let tiers = parse_volume_tiers("500-999 sqft: 5% off, 1000+ sqft: 10% off").unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].min_qty, 500);
        assert_eq!(tiers[0].max_qty, Some(999));
        assert_eq!(tiers[0].discount_pct, 5.0);
        assert_eq!(tiers[1].min_qty, 1000);
        assert_eq!(tiers[1].max_qty, None);
        assert_eq!(tiers[1].discount_pct, 10.0);
    }

    #[test]
    fn parses_to_separator_and_decimal_percent() {
        let tiers = parse_volume_tiers("250 to 599 sqft - 7.5%").unwrap();
        assert_eq!(tiers[0].min_qty, 250);
        assert_eq!(tiers[0].max_qty, Some(599));
        assert_eq!(tiers[0].discount_pct, 7.5);
    }

    #[test]
    fn unparsable_text_is_none() {
        assert!(parse_volume_tiers("call us for bulk pricing").is_none());
        assert!(parse_volume_tiers("").is_none());
    }

    // -----------------------------------------------------------------------
    // discount_for_quantity
    // -----------------------------------------------------------------------

    const TWO_TIERS: &str = "500-999 sqft: 5% off, 1000+ sqft: 10% off";

    #[test]
    fn quantity_in_upper_tier_gets_upper_discount() {
        assert_eq!(discount_for_quantity(TWO_TIERS, 1200), 10.0);
    }

    #[test]
    fn quantity_in_lower_tier_gets_lower_discount() {
        assert_eq!(discount_for_quantity(TWO_TIERS, 700), 5.0);
    }

    #[test]
    fn quantity_below_all_tiers_gets_zero() {
        assert_eq!(discount_for_quantity(TWO_TIERS, 100), 0.0);
    }

    #[test]
    fn tier_bounds_are_inclusive() {
        assert_eq!(discount_for_quantity(TWO_TIERS, 500), 5.0);
        assert_eq!(discount_for_quantity(TWO_TIERS, 999), 5.0);
        assert_eq!(discount_for_quantity(TWO_TIERS, 1000), 10.0);
    }

    #[test]
    fn overlapping_tiers_maximum_wins() {
        // Not first-match: 700 falls in both ranges, 8% must win.
        assert_eq!(
            discount_for_quantity("0-1000 sqft: 5% off, 500+ sqft: 8% off", 700),
            8.0
        );
    }

    #[test]
    fn malformed_text_degrades_to_zero() {
        assert_eq!(discount_for_quantity("no tiers here", 1000), 0.0);
        assert_eq!(discount_for_quantity("", 1000), 0.0);
    }
}
