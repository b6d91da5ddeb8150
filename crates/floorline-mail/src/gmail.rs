//! Gmail REST implementation of [`Mailbox`].
//!
//! Talks to the `users/me` surface with a bearer access token: message
//! list + full-format get for search, label modification for read/archive,
//! raw RFC 2822 send, and the profile endpoint for the account's own
//! address. Token acquisition and refresh happen outside this crate.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::types::{EmailMessage, Mailbox, SendOutcome};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/";

/// Gmail REST client scoped to the authenticated user (`users/me`).
pub struct GmailClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl GmailClient {
    /// Creates a client pointed at the production Gmail API.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, MailError> {
        Self::with_base_url(access_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`MailError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("floorline/0.1 (supplier-pricing)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MailError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, MailError> {
        self.base_url
            .join(path)
            .map_err(|e| MailError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn check_status(response: Response) -> Result<Response, MailError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map_or_else(|_| truncate(&body, 200), |envelope| envelope.error.message);
        Err(MailError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_full_message(&self, id: &str) -> Result<EmailMessage, MailError> {
        let url = self.endpoint(&format!("gmail/v1/users/me/messages/{id}"))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let message: FullMessage =
            serde_json::from_str(&body).map_err(|source| MailError::Deserialize {
                context: "message resource",
                source,
            })?;
        Ok(flatten_message(message))
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailMessage>, MailError> {
        let url = self.endpoint("gmail/v1/users/me/messages")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("maxResults", &max_results.to_string())])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let listing: MessageListResponse =
            serde_json::from_str(&body).map_err(|source| MailError::Deserialize {
                context: "message list",
                source,
            })?;

        if listing.messages.is_empty() {
            tracing::debug!(query, "no messages matched");
            return Ok(Vec::new());
        }

        let mut messages = Vec::with_capacity(listing.messages.len());
        for reference in &listing.messages {
            match self.fetch_full_message(&reference.id).await {
                Ok(message) => messages.push(message),
                // One unreadable message should not sink the whole scan.
                Err(error) => {
                    tracing::warn!(message_id = %reference.id, %error, "skipping unreadable message");
                }
            }
        }

        tracing::debug!(query, count = messages.len(), "inbox search complete");
        Ok(messages)
    }

    async fn mark_read(&self, message_id: &str) -> Result<(), MailError> {
        self.modify_labels(message_id, &["UNREAD"]).await
    }

    async fn archive(&self, message_id: &str) -> Result<(), MailError> {
        self.modify_labels(message_id, &["INBOX"]).await
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<SendOutcome, MailError> {
        let raw = URL_SAFE_NO_PAD.encode(compose_rfc2822(to, subject, body));

        let url = self.endpoint("gmail/v1/users/me/messages/send")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&SendRequest { raw })
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let sent: SendResponse =
            serde_json::from_str(&body).map_err(|source| MailError::Deserialize {
                context: "send response",
                source,
            })?;

        let thread_id = sent.thread_id.unwrap_or_else(|| sent.id.clone());
        tracing::info!(to, message_id = %sent.id, thread_id = %thread_id, "email sent");
        Ok(SendOutcome {
            message_id: sent.id,
            thread_id,
        })
    }

    async fn user_email(&self) -> Result<String, MailError> {
        let url = self.endpoint("gmail/v1/users/me/profile")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let profile: Profile =
            serde_json::from_str(&body).map_err(|source| MailError::Deserialize {
                context: "profile",
                source,
            })?;
        Ok(profile.email_address)
    }
}

impl GmailClient {
    async fn modify_labels(
        &self,
        message_id: &str,
        remove_label_ids: &[&str],
    ) -> Result<(), MailError> {
        let url = self.endpoint(&format!("gmail/v1/users/me/messages/{message_id}/modify"))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&ModifyRequest {
                remove_label_ids: remove_label_ids.iter().map(|&s| s.to_owned()).collect(),
            })
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

fn compose_rfc2822(to: &str, subject: &str, body: &str) -> String {
    format!(
        "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{body}"
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => text[..index].to_owned(),
        None => text.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullMessage {
    id: String,
    thread_id: String,
    #[serde(default)]
    internal_date: String,
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest {
    remove_label_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest {
    raw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: String,
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

fn flatten_message(message: FullMessage) -> EmailMessage {
    let payload = message.payload.unwrap_or_default();
    let subject = header_value(&payload.headers, "subject").unwrap_or_else(|| "No Subject".into());
    let sender = header_value(&payload.headers, "from").unwrap_or_else(|| "Unknown".into());
    let body = extract_body(&payload);

    EmailMessage {
        id: message.id,
        thread_id: message.thread_id,
        subject,
        sender,
        body,
        date: message.internal_date,
    }
}

fn header_value(headers: &[Header], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
}

/// Walks a MIME tree and returns the best-effort text body: the first
/// `text/plain` part wins, `text/html` is kept only as a fallback, and
/// `multipart/*` containers are descended into recursively.
fn extract_body(payload: &MessagePart) -> String {
    if payload.parts.is_empty() {
        return decode_part_data(payload).unwrap_or_default();
    }

    let mut html_fallback = String::new();
    for part in &payload.parts {
        if part.mime_type == "text/plain" {
            if let Some(text) = decode_part_data(part) {
                return text;
            }
        } else if part.mime_type == "text/html" && html_fallback.is_empty() {
            if let Some(text) = decode_part_data(part) {
                html_fallback = text;
            }
        } else if !part.parts.is_empty() {
            let nested = extract_body(part);
            if !nested.is_empty() {
                return nested;
            }
        }
    }
    html_fallback
}

fn decode_part_data(part: &MessagePart) -> Option<String> {
    let data = part.body.as_ref()?.data.as_deref()?;
    if data.is_empty() {
        return None;
    }
    // The API emits URL-safe base64, sometimes padded.
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn part_from_json(value: serde_json::Value) -> MessagePart {
        serde_json::from_value(value).unwrap()
    }

    fn encoded(text: &str) -> String {
        URL_SAFE_NO_PAD.encode(text)
    }

    #[test]
    fn single_part_body_is_decoded() {
        let payload = part_from_json(serde_json::json!({
            "mimeType": "text/plain",
            "body": { "data": encoded("prices attached") }
        }));
        assert_eq!(extract_body(&payload), "prices attached");
    }

    #[test]
    fn plain_text_part_wins_over_html() {
        let payload = part_from_json(serde_json::json!({
            "mimeType": "multipart/alternative",
            "parts": [
                { "mimeType": "text/html", "body": { "data": encoded("<p>html</p>") } },
                { "mimeType": "text/plain", "body": { "data": encoded("plain") } }
            ]
        }));
        assert_eq!(extract_body(&payload), "plain");
    }

    #[test]
    fn html_used_when_no_plain_part_exists() {
        let payload = part_from_json(serde_json::json!({
            "mimeType": "multipart/alternative",
            "parts": [
                { "mimeType": "text/html", "body": { "data": encoded("<p>html only</p>") } }
            ]
        }));
        assert_eq!(extract_body(&payload), "<p>html only</p>");
    }

    #[test]
    fn nested_multipart_is_descended() {
        let payload = part_from_json(serde_json::json!({
            "mimeType": "multipart/mixed",
            "parts": [
                {
                    "mimeType": "multipart/alternative",
                    "parts": [
                        { "mimeType": "text/plain", "body": { "data": encoded("nested body") } }
                    ]
                },
                { "mimeType": "application/pdf", "body": {} }
            ]
        }));
        assert_eq!(extract_body(&payload), "nested body");
    }

    #[test]
    fn padded_base64_still_decodes() {
        let payload = part_from_json(serde_json::json!({
            "mimeType": "text/plain",
            "body": { "data": "YWI=" }
        }));
        assert_eq!(extract_body(&payload), "ab");
    }

    #[test]
    fn missing_data_yields_empty_body() {
        let payload = part_from_json(serde_json::json!({ "mimeType": "text/plain", "body": {} }));
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let payload = part_from_json(serde_json::json!({
            "headers": [
                { "name": "SUBJECT", "value": "Price Update" },
                { "name": "From", "value": "supplier@example.com" }
            ]
        }));
        assert_eq!(
            header_value(&payload.headers, "subject").as_deref(),
            Some("Price Update")
        );
        assert_eq!(
            header_value(&payload.headers, "from").as_deref(),
            Some("supplier@example.com")
        );
    }

    #[test]
    fn rfc2822_message_has_crlf_header_block() {
        let raw = compose_rfc2822("a@b.com", "Price Update", "Hello");
        assert!(raw.starts_with("To: a@b.com\r\nSubject: Price Update\r\n"));
        assert!(raw.ends_with("\r\n\r\nHello"));
    }
}
