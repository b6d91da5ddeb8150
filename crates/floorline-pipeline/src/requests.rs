//! Outbound price-request email: subject and body template.

/// Subject line of outbound requests; the reply scan matches on it.
pub const REQUEST_SUBJECT: &str = "Price Update Request - PrimeLine Flooring";

/// Subject carried by supplier replies.
#[must_use]
pub fn reply_subject() -> String {
    format!("Re: {REQUEST_SUBJECT}")
}

/// The fixed request template: product list plus the response format the
/// extraction engine understands (pricing, promotion dates, volume tiers).
#[must_use]
pub fn build_request_body(products: &[String]) -> String {
    let product_list = products
        .iter()
        .map(|product| format!("- {product}: $_______ per sq.ft"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Dear Valued Supplier Partner,\n\
         \n\
         Thank you for being a key part of our flooring supply chain. We are reaching out\n\
         to request the most current pricing and promotional information for the following\n\
         products:\n\
         \n\
         {product_list}\n\
         \n\
         PRICING & PROMOTIONS REQUEST\n\
         \n\
         We track both standard pricing AND promotional offers. Please provide:\n\
         \n\
         1. STANDARD PRICING per sq.ft (required) for each product:\n\
         \x20  Example: \"Red Oak 7\": $5.14/sqft\"\n\
         \n\
         2. PROMOTIONS & DISCOUNTS (if applicable):\n\
         \x20  - Promotion Name (e.g., \"Fall Sale 2025\", \"Contractor Discount\")\n\
         \x20  - Discount Percentage (e.g., 10% off, 15% off)\n\
         \x20  - Promotion Valid Dates (start date and end date)\n\
         \x20  - Volume discounts, tiered by quantity\n\
         \x20    Example: \"500-999 sqft: 5% off, 1000+ sqft: 10% off\"\n\
         \n\
         RESPONSE FORMAT EXAMPLES:\n\
         - \"Red Oak 7\" is now $5.14/sqft\"\n\
         - \"White Oak 5\": $4.50/sqft (10% off - Fall Sale 2025 - ends Nov 30)\"\n\
         - \"Maple 6\" - Standard: $5.25 | Promo: Holiday Bundle (12% off until 12/31) | Volume: 500-999 sqft: 8% off, 1000+ sqft: 12% off\"\n\
         \n\
         Promotion expiry dates ensure we quote customers accurately, and volume\n\
         discount tiers determine bid competitiveness.\n\
         \n\
         Please reply within 24 hours.\n\
         \n\
         Thank you for your continued partnership.\n\
         \n\
         Best regards,\n\
         PrimeLine Flooring\n\
         \n\
         Note: This is an automated request. If you have any questions, please contact\n\
         your PrimeLine Flooring representative.\n"
    )
}
