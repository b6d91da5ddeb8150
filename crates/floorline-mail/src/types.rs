//! The mailbox seam the reply pipeline depends on.

use async_trait::async_trait;

use crate::error::MailError;

/// One inbox message, already flattened from the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub id: String,
    pub thread_id: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
    /// Provider timestamp, epoch milliseconds as delivered.
    pub date: String,
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub message_id: String,
    pub thread_id: String,
}

/// Mailbox operations the pipeline needs. Implemented by [`crate::GmailClient`]
/// in production and by in-memory fakes in tests.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Searches the inbox and returns matching messages with bodies resolved.
    async fn search(&self, query: &str, max_results: u32)
        -> Result<Vec<EmailMessage>, MailError>;

    /// Clears the unread flag on one message.
    async fn mark_read(&self, message_id: &str) -> Result<(), MailError>;

    /// Removes one message from the inbox.
    async fn archive(&self, message_id: &str) -> Result<(), MailError>;

    /// Sends a plain-text email.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<SendOutcome, MailError>;

    /// Address of the authenticated account, used to skip our own outbound
    /// messages when scanning threads.
    async fn user_email(&self) -> Result<String, MailError>;
}
