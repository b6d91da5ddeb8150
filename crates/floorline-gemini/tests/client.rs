//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use floorline_gemini::client::RetryPolicy;
use floorline_gemini::{GeminiClient, GeminiError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "AIzaSyTestKeyTestKeyTest";
const MODEL: &str = "gemini-2.0-flash-lite";

fn no_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url(TEST_KEY, MODEL, 30, no_retry(), base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn generate_content_returns_candidate_text() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": "  {\"products\": []}  " } ] } }
        ]
    });

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(query_param("key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let text = client
        .generate_content("extract prices")
        .await
        .expect("should return candidate text");

    assert_eq!(text, "{\"products\": []}");
}

#[tokio::test]
async fn empty_candidates_is_empty_response_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate_content("hello").await.unwrap_err();
    assert!(matches!(err, GeminiError::EmptyResponse));
}

#[tokio::test]
async fn api_error_surfaces_status_and_message() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate_content("hello").await.unwrap_err();
    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_429_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate_content("hello").await.unwrap_err();
    assert!(matches!(err, GeminiError::RateLimited));
}

#[tokio::test]
async fn retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let body = serde_json::json!({
        "candidates": [ { "content": { "parts": [ { "text": "ok" } ] } } ]
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 1,
    };
    let client = GeminiClient::with_base_url(TEST_KEY, MODEL, 30, retry, &server.uri())
        .expect("client construction should not fail");

    let text = client.generate_content("hello").await.unwrap();
    assert_eq!(text, "ok");
}

#[test]
fn malformed_api_key_is_rejected_at_construction() {
    let err = GeminiClient::with_base_url("sk-wrong-vendor-key-shape", MODEL, 30, no_retry(), "http://localhost")
        .err()
        .expect("construction must fail");
    assert!(matches!(err, GeminiError::InvalidApiKey));
}
