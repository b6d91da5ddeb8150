//! Two-strategy extraction: LLM first, deterministic regex fallback second.
//!
//! The engine owns the prompt, the loose-JSON repair step and the
//! per-product validation of whatever the model claims it found. Any
//! failure along the LLM path — transport error, unparsable response,
//! zero products surviving validation — degrades to the regex fallback
//! rather than surfacing an error. Extraction never fails hard; it either
//! produces products or reports "no data".

use serde_json::Value;

use floorline_core::normalize::normalize_width;
use floorline_core::pricing::is_valid_price;
use floorline_gemini::{GeminiClient, GeminiError};

use crate::json::parse_loose_json;
use crate::patterns::fallback_extract;
use crate::promo::{extract_promo_info, extract_volume_discounts};
use crate::types::{ExtractedPriceUpdate, Extraction};

/// Email bodies are clipped to this many characters before prompting;
/// supplier replies past this point are quoted history and signatures.
const MAX_PROMPT_BODY_CHARS: usize = 2_000;

const PROMPT_HEAD: &str = r#"Extract ALL product pricing and promotion information from this supplier email response.

Email Content:
"#;

const PROMPT_TAIL: &str = r#"

Instructions:
1. Find ALL products with prices mentioned in ANY format
2. Products may be mentioned as: "Red Oak", "RedOak", "red oak", "Red  Oak" (normalize spacing/case)
3. Widths may be: 7", 7 inch, 7-inch, 7inch (convert to format like "7\"")
4. Prices may be: $5.14, 5.14, USD 5.14, 5.14/sqft (extract number only)
5. ALSO extract if mentioned: discount percentage, promotion name, volume discounts, minimum quantities
6. If no width specified, set width to null
7. Look for phrases like: "discount of X%", "X% off", "volume discount", "bulk pricing", "min order", "above X sqft"

Return ONLY valid JSON with this structure:
{
  "products": [
    {
      "name": "Product Name",
      "width": "5\"",
      "price_per_sqft": 4.25,
      "discount_percentage": 10,
      "min_qty_discount": 500,
      "promotion": "Promotion Name",
      "volume_discounts": "500-999 sqft: 5% off, 1000+ sqft: 10% off"
    }
  ],
  "notes": "any additional information"
}

Example for "Red Oak 5\" now costs $3.95 with a discount of 12% for 20 days above 550 sq. feet":
{
  "products": [
    {
      "name": "Red Oak",
      "width": "5\"",
      "price_per_sqft": 3.95,
      "discount_percentage": 12,
      "min_qty_discount": 550,
      "promotion": "20-day promotion",
      "volume_discounts": null
    }
  ],
  "notes": "12% discount applies for purchases over 550 sq. feet for 20 days"
}

IMPORTANT RULES:
- Extract ALL discount/promotion info mentioned in the email
- Return ALL products found (list can have 1 or more items)
- Discount percentage as number (not string with %)
- Min quantity as number in sqft
- Normalize product names to title case
- Only include promotion/volume/min_qty fields if mentioned in the email (otherwise null)
"#;

/// Extracts price updates from supplier reply bodies.
pub struct ExtractionEngine {
    llm: Option<GeminiClient>,
}

impl ExtractionEngine {
    #[must_use]
    pub fn new(llm: Option<GeminiClient>) -> Self {
        Self { llm }
    }

    /// Engine without a model; every extraction uses the regex fallback.
    #[must_use]
    pub fn regex_only() -> Self {
        Self { llm: None }
    }

    #[must_use]
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Extracts every actionable price update from one email body.
    ///
    /// `None` means the email contained no recognizable pricing data; the
    /// caller is expected to leave the message untouched, not to treat
    /// this as a failure.
    pub async fn extract(&self, email_body: &str) -> Option<Extraction> {
        if let Some(client) = &self.llm {
            match extract_with_llm(client, email_body).await {
                Ok(Some(extraction)) => {
                    tracing::debug!(
                        products = extraction.products.len(),
                        "model extraction succeeded"
                    );
                    return Some(extraction);
                }
                Ok(None) => {
                    tracing::debug!("model returned no usable products, trying regex fallback");
                }
                Err(error) => {
                    tracing::warn!(%error, "model extraction failed, trying regex fallback");
                }
            }
        }

        fallback_extract(email_body)
    }
}

async fn extract_with_llm(
    client: &GeminiClient,
    email_body: &str,
) -> Result<Option<Extraction>, GeminiError> {
    let text = client.generate_content(&build_prompt(email_body)).await?;

    let Some(payload) = parse_loose_json(&text) else {
        tracing::warn!("model response was not parseable JSON");
        return Ok(None);
    };
    let Some(mut extraction) = validate_payload(&payload) else {
        return Ok(None);
    };

    augment_from_message(&mut extraction, email_body);
    Ok(Some(extraction))
}

fn build_prompt(email_body: &str) -> String {
    let excerpt = truncate_chars(email_body, MAX_PROMPT_BODY_CHARS);
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + excerpt.len() + PROMPT_TAIL.len());
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(excerpt);
    prompt.push_str(PROMPT_TAIL);
    prompt
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Validates the model's JSON payload product by product. Records missing
/// a usable name or price, or priced outside the accepted band, are
/// dropped silently; `None` means nothing survived.
fn validate_payload(payload: &Value) -> Option<Extraction> {
    let raw_products = payload.get("products")?.as_array()?;

    let mut products: Vec<ExtractedPriceUpdate> = Vec::new();
    for raw in raw_products {
        if let Some(product) = validate_product(raw) {
            products.push(product);
        }
    }
    if products.is_empty() {
        return None;
    }

    let notes = payload
        .get("notes")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    Some(Extraction { products, notes })
}

fn validate_product(raw: &Value) -> Option<ExtractedPriceUpdate> {
    let object = raw.as_object()?;

    let name = object.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let price = coerce_f64(object.get("price_per_sqft")?)?;
    if !is_valid_price(price) {
        return None;
    }

    let width = object.get("width").and_then(coerce_width);

    let mut product = ExtractedPriceUpdate::new(name, width, price);
    product.discount_percentage = object.get("discount_percentage").and_then(coerce_f64);
    product.min_qty_discount = object.get("min_qty_discount").and_then(coerce_i32);
    product.promotion = object.get("promotion").and_then(coerce_promotion);
    product.volume_discounts = object.get("volume_discounts").and_then(coerce_volume_text);
    Some(product)
}

/// Overwrites per-product promotion/volume fields with message-level
/// findings. An email describes one commercial context, and the regex
/// helpers read the full body while the model saw a clipped excerpt.
fn augment_from_message(extraction: &mut Extraction, email_body: &str) {
    let promo_name = extract_promo_info(email_body).name;
    let volume = extract_volume_discounts(email_body);
    if promo_name.is_none() && volume.is_none() {
        return;
    }

    for product in &mut extraction.products {
        if let Some(name) = &promo_name {
            product.promotion = Some(name.clone());
        }
        if let Some(volume) = &volume {
            product.volume_discounts = Some(volume.clone());
        }
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    if let Some(number) = value.as_f64() {
        return Some(number);
    }
    value.as_str()?.trim().parse().ok()
}

fn coerce_i32(value: &Value) -> Option<i32> {
    if let Some(number) = value.as_i64() {
        return i32::try_from(number).ok();
    }
    value.as_str()?.trim().parse().ok()
}

fn coerce_width(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => normalize_width(text),
        Value::Number(number) => Some(format!("{number}\"")),
        _ => None,
    }
}

fn coerce_promotion(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.as_str(),
        // The model occasionally nests the promotion as an object.
        Value::Object(map) => map.get("name")?.as_str()?,
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn coerce_volume_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Object(_) => Some(value.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_keeps_complete_product() {
        let payload = json!({
            "products": [{
                "name": "Red Oak",
                "width": "5\"",
                "price_per_sqft": 3.95,
                "discount_percentage": 12,
                "min_qty_discount": 550,
                "promotion": "Fall Sale",
                "volume_discounts": "500-999 sqft: 5% off"
            }],
            "notes": "seasonal pricing"
        });
        let extraction = validate_payload(&payload).unwrap();
        assert_eq!(extraction.notes, "seasonal pricing");

        let product = &extraction.products[0];
        assert_eq!(product.name, "Red Oak");
        assert_eq!(product.width.as_deref(), Some("5\""));
        assert_eq!(product.price_per_sqft, 3.95);
        assert_eq!(product.discount_percentage, Some(12.0));
        assert_eq!(product.min_qty_discount, Some(550));
        assert_eq!(product.promotion.as_deref(), Some("Fall Sale"));
    }

    #[test]
    fn validate_coerces_numeric_string_price() {
        let payload = json!({ "products": [{ "name": "Maple", "price_per_sqft": "5.25" }] });
        let extraction = validate_payload(&payload).unwrap();
        assert_eq!(extraction.products[0].price_per_sqft, 5.25);
        assert_eq!(extraction.products[0].width, None);
    }

    #[test]
    fn validate_drops_out_of_band_price_silently() {
        let payload = json!({
            "products": [
                { "name": "Walnut", "price_per_sqft": 5140.0 },
                { "name": "Cork", "price_per_sqft": 4.15 }
            ]
        });
        let extraction = validate_payload(&payload).unwrap();
        assert_eq!(extraction.products.len(), 1);
        assert_eq!(extraction.products[0].name, "Cork");
    }

    #[test]
    fn validate_drops_nameless_and_priceless_records() {
        let payload = json!({
            "products": [
                { "name": "  ", "price_per_sqft": 3.0 },
                { "name": "Hickory" },
                { "price_per_sqft": 3.0 }
            ]
        });
        assert!(validate_payload(&payload).is_none());
    }

    #[test]
    fn validate_rejects_non_object_payloads() {
        assert!(validate_payload(&json!("just text")).is_none());
        assert!(validate_payload(&json!({ "products": "none" })).is_none());
        assert!(validate_payload(&json!({ "products": [] })).is_none());
    }

    #[test]
    fn width_coercions() {
        assert_eq!(coerce_width(&json!("7 inch")).as_deref(), Some("7\""));
        assert_eq!(coerce_width(&json!(5)).as_deref(), Some("5\""));
        assert_eq!(coerce_width(&json!(null)), None);
        assert_eq!(coerce_width(&json!("")), None);
    }

    #[test]
    fn promotion_accepts_string_or_named_object() {
        assert_eq!(
            coerce_promotion(&json!("Holiday Bundle")).as_deref(),
            Some("Holiday Bundle")
        );
        assert_eq!(
            coerce_promotion(&json!({ "name": "Holiday Bundle", "discount": "10% off" }))
                .as_deref(),
            Some("Holiday Bundle")
        );
        assert_eq!(coerce_promotion(&json!({ "discount": "10% off" })), None);
        assert_eq!(coerce_promotion(&json!(null)), None);
    }

    #[test]
    fn volume_object_is_kept_as_json_text() {
        let kept = coerce_volume_text(&json!({ "500-999": 5.0 })).unwrap();
        assert!(kept.contains("500-999"));
        assert_eq!(coerce_volume_text(&json!("  ")), None);
    }

    #[test]
    fn augmentation_overwrites_from_message_body() {
        let mut extraction = Extraction {
            products: vec![ExtractedPriceUpdate::new("Red Oak", None, 3.95)],
            notes: String::new(),
        };
        augment_from_message(
            &mut extraction,
            "Promotion: Winter Clearance\n500-999 sqft: 5% off and 1000+ sqft: 10% off",
        );
        let product = &extraction.products[0];
        assert_eq!(product.promotion.as_deref(), Some("Winter Clearance"));
        assert_eq!(
            product.volume_discounts.as_deref(),
            Some("500-999 sqft: 5% off, 1000+ sqft: 10% off")
        );
    }

    #[test]
    fn augmentation_is_a_no_op_without_message_hints() {
        let mut extraction = Extraction {
            products: vec![ExtractedPriceUpdate::new("Red Oak", None, 3.95)],
            notes: String::new(),
        };
        augment_from_message(&mut extraction, "prices attached below");
        assert_eq!(extraction.products[0].promotion, None);
        assert_eq!(extraction.products[0].volume_discounts, None);
    }

    #[test]
    fn prompt_clips_long_bodies_on_char_boundaries() {
        let body = "é".repeat(MAX_PROMPT_BODY_CHARS + 50);
        let prompt = build_prompt(&body);
        assert_eq!(
            prompt.chars().filter(|c| *c == 'é').count(),
            MAX_PROMPT_BODY_CHARS
        );
    }

    #[test]
    fn prompt_embeds_short_bodies_whole() {
        let prompt = build_prompt("Red Oak 5\" is $3.95");
        assert!(prompt.contains("Red Oak 5\" is $3.95"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }
}
