//! HTTP client for the Gemini `generateContent` REST endpoint.
//!
//! Wraps `reqwest` with Gemini-specific error handling, API-key shape
//! validation, and typed response deserialization. The client knows nothing
//! about prompts or extraction — callers in `floorline-extract` own those.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::GeminiError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorEnvelope, GenerateRequest, GenerateResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Retry policy for one `generate_content` call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

/// Client for the Gemini REST API.
///
/// Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::InvalidApiKey`] if the key fails shape
    /// validation, or [`GeminiError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, timeout_secs, retry, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::InvalidApiKey`] for a malformed key,
    /// [`GeminiError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`GeminiError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        if !floorline_core::config::is_plausible_gemini_key(api_key) {
            return Err(GeminiError::InvalidApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("floorline/0.1 (supplier-pricing)")
            .build()?;

        // Normalise: exactly one trailing slash so join() appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeminiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
            retry,
        })
    }

    /// Sends one single-turn prompt and returns the first candidate's text.
    ///
    /// Transient failures are retried per the client's [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// - [`GeminiError::RateLimited`] on HTTP 429 after retries exhaust.
    /// - [`GeminiError::Api`] for other non-2xx API responses.
    /// - [`GeminiError::Http`] on network failure.
    /// - [`GeminiError::Deserialize`] if the response body is not the
    ///   expected envelope.
    /// - [`GeminiError::EmptyResponse`] when no candidate text came back.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        retry_with_backoff(self.retry.max_retries, self.retry.backoff_base_ms, || {
            self.generate_once(prompt)
        })
        .await
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = self.endpoint_url()?;
        let request = GenerateRequest::from_prompt(prompt);

        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeminiError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        parsed
            .first_text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
            .ok_or(GeminiError::EmptyResponse)
    }

    fn endpoint_url(&self) -> Result<Url, GeminiError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| GeminiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}
