//! End-to-end tests for `ExtractionEngine` with a mocked Gemini backend.

use floorline_extract::ExtractionEngine;
use floorline_gemini::client::RetryPolicy;
use floorline_gemini::GeminiClient;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "AIzaSyTestKeyTestKeyTest";
const MODEL: &str = "gemini-2.0-flash-lite";

fn engine_against(base_url: &str) -> ExtractionEngine {
    let policy = RetryPolicy {
        max_retries: 0,
        backoff_base_ms: 0,
    };
    let client = GeminiClient::with_base_url(TEST_KEY, MODEL, 30, policy, base_url)
        .expect("client construction should not fail");
    ExtractionEngine::new(Some(client))
}

fn model_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn llm_path_parses_fenced_json() {
    let server = MockServer::start().await;

    let reply = "```json\n{\"products\": [{\"name\": \"Red Oak\", \"width\": \"5\\\"\", \
                 \"price_per_sqft\": 3.95, \"discount_percentage\": 12}], \
                 \"notes\": \"updated pricing\"}\n```";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .mount(&server)
        .await;

    let engine = engine_against(&server.uri());
    let extraction = engine
        .extract("Red Oak 5\" now costs $3.95 with a discount of 12%")
        .await
        .expect("should extract one product");

    assert_eq!(extraction.notes, "updated pricing");
    let product = &extraction.products[0];
    assert_eq!(product.name, "Red Oak");
    assert_eq!(product.width.as_deref(), Some("5\""));
    assert_eq!(product.price_per_sqft, 3.95);
    assert_eq!(product.discount_percentage, Some(12.0));
}

#[tokio::test]
async fn llm_failure_degrades_to_regex_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = engine_against(&server.uri());
    let extraction = engine
        .extract("White Oak 7\" is $5.14 per sq ft")
        .await
        .expect("fallback should still extract");

    assert_eq!(extraction.notes, "Parsed using regex fallback");
    assert_eq!(extraction.products[0].name, "White Oak");
    assert_eq!(extraction.products[0].price_per_sqft, 5.14);
}

#[tokio::test]
async fn llm_gibberish_degrades_to_regex_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(model_reply("I could not find any structured data, sorry!")),
        )
        .mount(&server)
        .await;

    let engine = engine_against(&server.uri());
    let extraction = engine
        .extract("Maple 6\" is now $5.25/sqft")
        .await
        .expect("fallback should still extract");

    assert_eq!(extraction.notes, "Parsed using regex fallback");
    assert_eq!(extraction.products[0].name, "Maple");
}

#[tokio::test]
async fn regex_only_engine_never_calls_the_model() {
    let engine = ExtractionEngine::regex_only();
    assert!(!engine.has_llm());

    let extraction = engine
        .extract("Bamboo: $4.25 per sq ft")
        .await
        .expect("regex path should extract");
    assert_eq!(extraction.products[0].name, "Bamboo");

    assert!(engine.extract("nothing priced here").await.is_none());
}
