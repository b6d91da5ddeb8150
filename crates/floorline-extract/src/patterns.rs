//! Deterministic regex fallback extractor.
//!
//! Always available; the engine falls through to it whenever the LLM
//! strategy is unconfigured or yields nothing usable. Patterns are tried
//! in sequence and ALL matches from ALL patterns are collected, then
//! de-duplicated by exact (name, width, price) triple.
//!
//! Candidate names must contain a recognized wood/material word. This is a
//! deliberate precision-over-recall guard: supplier emails are full of
//! unrelated numbers (order ids, phone numbers, footer years), and a false
//! catalog write is far worse than a missed one.

use std::sync::OnceLock;

use regex::Regex;

use floorline_core::normalize::{normalize_product_name, normalize_width};
use floorline_core::pricing::is_valid_price;

use crate::promo::{extract_discount_pct, extract_min_qty, extract_promo_info, extract_volume_discounts};
use crate::types::{ExtractedPriceUpdate, Extraction};

/// Group order a pattern captures.
#[derive(Debug, Clone, Copy)]
enum Shape {
    NameWidthPrice,
    WidthNamePrice,
    NamePrice,
}

const MATERIAL_VOCABULARY: &[&str] = &[
    "oak", "maple", "walnut", "bamboo", "cork", "cherry", "hickory", "ash",
];

const NAME: &str = r"([A-Za-z][A-Za-z\s]*?)";
const WIDTH: &str = r#"(\d+(?:\.\d+)?)\s*(?:inch|in\b|"|'')"#;
const PRICE: &str = r"\$?(\d+(?:\.\d+)?)";
const PER_SQFT: &str = r"(?:\s*(?:/\s*sq\.?\s*ft\.?|per\s+sq\.?\s*ft\.?))?";

fn price_patterns() -> &'static Vec<(Regex, Shape)> {
    static PATTERNS: OnceLock<Vec<(Regex, Shape)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let specs: &[(String, Shape)] = &[
            // "Red Oak 5" now costs $3.95"
            (
                format!(r"(?i){NAME}\s+{WIDTH}\s+(?:now\s+)?(?:costs?|is|will\s+be)\s+{PRICE}"),
                Shape::NameWidthPrice,
            ),
            // "updated the price of 7 inch White Oak to $5.14"
            (
                format!(
                    r"(?i)(?:updated?\s+)?(?:the\s+)?price\s+(?:of\s+)?{WIDTH}\s*(?:width\s+)?(?:of\s+)?{NAME}\s+(?:to|is|now|:)\s*{PRICE}"
                ),
                Shape::WidthNamePrice,
            ),
            // "Maple 6" - $5.25/sqft", "Walnut 5": $6.50"
            (
                format!(r"(?i){NAME}\s+{WIDTH}\s*[:\-]?\s*(?:is\s+)?(?:now\s+)?(?:will\s+be\s+)?{PRICE}{PER_SQFT}"),
                Shape::NameWidthPrice,
            ),
            // "5" Red Oak is $3.95 per sq ft"
            (
                format!(r"(?i){WIDTH}\s+{NAME}\s+(?:is\s+)?(?:now\s+)?(?:will\s+be\s+)?{PRICE}{PER_SQFT}"),
                Shape::WidthNamePrice,
            ),
            // "Bamboo: $4.25/sqft" — no width stated
            (
                format!(r"(?i){NAME}\s*[:\-]\s*{PRICE}{PER_SQFT}"),
                Shape::NamePrice,
            ),
        ];

        specs
            .iter()
            .map(|(pattern, shape)| {
                (
                    Regex::new(pattern).expect("price pattern regex is valid"),
                    *shape,
                )
            })
            .collect()
    })
}

fn html_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("html tag regex is valid"))
}

fn strip_html(body: &str) -> String {
    html_tag_regex().replace_all(body, " ").into_owned()
}

fn contains_material_word(name: &str) -> bool {
    let lower = name.to_lowercase();
    MATERIAL_VOCABULARY.iter().any(|word| lower.contains(word))
}

// Filler words the lazy name groups tend to swallow from either edge
// ("price of Bamboo", "Walnut to").
const CONNECTOR_WORDS: &[&str] = &[
    "the", "of", "to", "is", "now", "at", "for", "and", "will", "be", "our", "new", "price",
];

fn trim_connector_words(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    while let Some(first) = words.first() {
        if CONNECTOR_WORDS.contains(&first.to_lowercase().as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if CONNECTOR_WORDS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

/// Runs the pattern list over an email body and returns every product
/// mention that survives the vocabulary guard and price bound, with
/// message-level promotion/discount context attached to each.
///
/// Returns `None` when nothing actionable was found — a normal outcome
/// for irrelevant or unparsable replies, not an error.
#[must_use]
pub fn fallback_extract(email_body: &str) -> Option<Extraction> {
    let clean = strip_html(email_body);

    let promo = extract_promo_info(&clean);
    let volume_discounts = extract_volume_discounts(&clean);
    let discount_pct = extract_discount_pct(&clean);
    let min_qty = extract_min_qty(&clean);

    let mut products: Vec<ExtractedPriceUpdate> = Vec::new();

    for (regex, shape) in price_patterns() {
        for caps in regex.captures_iter(&clean) {
            let (raw_name, raw_width, raw_price) = match shape {
                Shape::NameWidthPrice => (caps.get(1), caps.get(2), caps.get(3)),
                Shape::WidthNamePrice => (caps.get(2), caps.get(1), caps.get(3)),
                Shape::NamePrice => (caps.get(1), None, caps.get(2)),
            };
            let (Some(raw_name), Some(raw_price)) = (raw_name, raw_price) else {
                continue;
            };
            let Ok(price) = raw_price.as_str().parse::<f64>() else {
                continue;
            };

            let name = normalize_product_name(&trim_connector_words(raw_name.as_str()));
            if name.len() <= 2 || !contains_material_word(&name) || !is_valid_price(price) {
                continue;
            }

            let width = raw_width.and_then(|w| normalize_width(w.as_str()));

            let duplicate = products.iter().any(|p| {
                p.name == name && p.width == width && p.price_per_sqft == price
            });
            if duplicate {
                continue;
            }

            tracing::debug!(
                product = %name,
                width = width.as_deref().unwrap_or("-"),
                price,
                "regex fallback matched product"
            );

            let mut product = ExtractedPriceUpdate::new(name, width, price);
            product.discount_percentage = discount_pct;
            product.min_qty_discount = min_qty;
            product.promotion = promo.name.clone();
            product.volume_discounts = volume_discounts.clone();
            products.push(product);
        }
    }

    if products.is_empty() {
        return None;
    }

    Some(Extraction {
        products,
        notes: "Parsed using regex fallback".to_owned(),
    })
}
