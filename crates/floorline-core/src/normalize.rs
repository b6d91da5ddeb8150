//! Canonical forms for product names and plank widths.
//!
//! Supplier emails spell the same product many ways ("red oak", "Red  Oak",
//! "RED OAK") and widths in several notations (`7"`, `7 inch`, `7-inch`).
//! Everything downstream — catalog lookups, verification, de-duplication —
//! keys on the canonical forms produced here, so both functions are
//! idempotent: normalizing an already-normalized value returns it unchanged.

use std::sync::OnceLock;

use regex::Regex;

/// Collapses internal whitespace and title-cases each word.
#[must_use]
pub fn normalize_product_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the first numeric token (integer or decimal) from a raw width
/// string and formats it as `<number>"`.
///
/// Returns `None` when the string carries no numeric token (e.g. `"N/A"`);
/// callers must treat a missing width as "applies to no specific width"
/// rather than guessing one.
#[must_use]
pub fn normalize_width(raw: &str) -> Option<String> {
    let number = numeric_token_regex().find(raw)?.as_str();
    Some(format!("{number}\""))
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn numeric_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Integer or decimal; "7." leaves the dot behind.
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("numeric token regex is valid"))
}
