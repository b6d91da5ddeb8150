//! Mailbox access for supplier correspondence.
//!
//! The [`Mailbox`] trait is the seam the reply pipeline works against;
//! [`GmailClient`] is the production implementation over the Gmail REST API.

pub mod error;
pub mod gmail;
pub mod types;

pub use error::MailError;
pub use gmail::GmailClient;
pub use types::{EmailMessage, Mailbox, SendOutcome};
