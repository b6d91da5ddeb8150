//! Best-effort parsing of JSON embedded in model output.
//!
//! Models asked for "ONLY valid JSON" still wrap it in markdown code fences
//! or prepend prose. [`parse_loose_json`] peels those layers off before
//! handing the remainder to `serde_json`. Any failure is `None` — the
//! caller falls back to regex extraction rather than erroring.

use serde_json::Value;

/// Attempts to parse a JSON object out of free-form model text.
///
/// Stripping rules, applied in order:
/// 1. Trim whitespace.
/// 2. Remove a leading ```` ```json ```` or ```` ``` ```` fence and a
///    trailing ```` ``` ```` fence.
/// 3. Prefer the span from the first `{` to the last `}` (models sometimes
///    surround the object with prose); fall back to the whole remainder.
#[must_use]
pub fn parse_loose_json(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text.trim());

    if let Some(span) = outer_object_span(cleaned) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return Some(value);
        }
    }

    serde_json::from_str(cleaned).ok()
}

fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text;
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// The widest `{...}` span in the text, when one exists.
fn outer_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
