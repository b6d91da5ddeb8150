//! Message-level promotion and discount heuristics.
//!
//! An email is assumed to describe one commercial context, so these run
//! once per message and their findings attach to every product extracted
//! from it. Both the LLM strategy and the regex fallback use them.

use std::sync::OnceLock;

use regex::Regex;

use floorline_core::pricing::{parse_volume_tiers, VolumeTier};

/// Promotion hints found in one email body. All fields optional; only
/// `name` flows through to the catalog write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromoInfo {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub discount: Option<String>,
}

impl PromoInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.discount.is_none()
    }
}

fn promo_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:promo|promotion|special|offer)\s*(?:name|code)?\s*[:-]\s*([^\n,]+)")
            .expect("promo name regex is valid")
    })
}

fn start_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:valid|active|starts?|from)\s*(?:on|from)?\s*([\d][\d\-/]+)")
            .expect("start date regex is valid")
    })
}

fn end_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:until|ends?|through)\s*([\d][\d\-/]+)").expect("end date regex is valid")
    })
}

fn discount_mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?\s*%\s*(?:discount|off))").expect("discount regex is valid")
    })
}

fn discount_pct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "discount of 12%" or "12% off" / "12% discount"
        Regex::new(r"(?i)(?:discount\s+of\s+(\d+(?:\.\d+)?)\s*%|(\d+(?:\.\d+)?)\s*%\s*(?:off|discount))")
            .expect("discount pct regex is valid")
    })
}

fn min_qty_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:above|over|minimum|min)\s*(?:the\s+range\s+of|order|orders?\s+of|qty|quantity)?\s*(\d+)\s*(?:sq\.?\s*ft\.?|sqft|square\s+feet)?",
        )
        .expect("min qty regex is valid")
    })
}

/// Scans one email body for promotion name/date/discount hints.
#[must_use]
pub fn extract_promo_info(body: &str) -> PromoInfo {
    let capture = |re: &Regex| {
        re.captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
    };

    PromoInfo {
        name: capture(promo_name_regex()),
        start_date: capture(start_date_regex()),
        end_date: capture(end_date_regex()),
        discount: capture(discount_mention_regex()),
    }
}

/// First discount percentage stated in the body
/// (`"discount of 12%"` / `"12% off"`).
#[must_use]
pub fn extract_discount_pct(body: &str) -> Option<f64> {
    let caps = discount_pct_regex().captures(body)?;
    caps.get(1)
        .or_else(|| caps.get(2))?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// First minimum-quantity threshold stated in the body
/// (`"for orders above 550 sqft"`, `"min order 500"`).
#[must_use]
pub fn extract_min_qty(body: &str) -> Option<i32> {
    min_qty_regex()
        .captures(body)?
        .get(1)?
        .as_str()
        .parse::<i32>()
        .ok()
}

/// Volume-discount tiers mentioned anywhere in the body, re-rendered in
/// canonical form so the stored text round-trips through
/// [`floorline_core::pricing::discount_for_quantity`].
#[must_use]
pub fn extract_volume_discounts(body: &str) -> Option<String> {
    let tiers = parse_volume_tiers(body)?;
    Some(render_tiers(&tiers))
}

fn render_tiers(tiers: &[VolumeTier]) -> String {
    tiers
        .iter()
        .map(|tier| match tier.max_qty {
            Some(max) => format!(
                "{}-{} sqft: {}% off",
                tier.min_qty, max, tier.discount_pct
            ),
            None => format!("{}+ sqft: {}% off", tier.min_qty, tier.discount_pct),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
