use thiserror::Error;

/// Errors from mailbox operations.
#[derive(Debug, Error)]
pub enum MailError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail API returned a non-success status.
    #[error("mail API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A response body did not match the expected shape.
    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL `{base_url}`: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
