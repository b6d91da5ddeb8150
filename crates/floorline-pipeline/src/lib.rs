//! The supplier-pricing workflow: outbound price requests, reply
//! processing with verify-after-write catalog updates, and quote base
//! pricing that honours active promotions and volume tiers.

pub mod quoting;
pub mod replies;
pub mod requests;
pub mod types;

pub use replies::ReplyProcessor;
pub use types::{AppliedUpdate, SupplierReplyResult};
