//! Reply scanning and verify-after-write catalog updates.

use std::collections::HashSet;

use floorline_core::catalog::{Catalog, PriceUpdate};
use floorline_core::normalize::{normalize_product_name, normalize_width};
use floorline_core::pricing::is_valid_price;
use floorline_extract::{ExtractedPriceUpdate, ExtractionEngine};
use floorline_mail::{EmailMessage, MailError, Mailbox, SendOutcome};

use crate::requests::{build_request_body, reply_subject, REQUEST_SUBJECT};
use crate::types::{AppliedUpdate, SupplierReplyResult};

const DEFAULT_MAX_RESULTS: u32 = 20;

/// Stored prices must land within a cent of what we wrote for the update
/// to count as verified.
const VERIFY_TOLERANCE: f64 = 0.01;

/// Drives the supplier-pricing loop: sends requests, scans for replies,
/// applies extracted price updates and verifies each write by re-reading
/// the catalog. A message is only marked read and archived once at least
/// one product from it verified.
pub struct ReplyProcessor<M, C> {
    mailbox: M,
    catalog: C,
    engine: ExtractionEngine,
    max_results: u32,
    outstanding_threads: HashSet<String>,
}

impl<M: Mailbox, C: Catalog> ReplyProcessor<M, C> {
    pub fn new(mailbox: M, catalog: C, engine: ExtractionEngine) -> Self {
        Self {
            mailbox,
            catalog,
            engine,
            max_results: DEFAULT_MAX_RESULTS,
            outstanding_threads: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Thread ids of price requests still awaiting a processed reply.
    #[must_use]
    pub fn outstanding_threads(&self) -> &HashSet<String> {
        &self.outstanding_threads
    }

    /// Sends one price request and starts tracking its thread.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the send fails; a failed send tracks
    /// nothing.
    pub async fn send_price_request(
        &mut self,
        supplier_email: &str,
        product_names: &[String],
    ) -> Result<SendOutcome, MailError> {
        let body = build_request_body(product_names);
        let outcome = self
            .mailbox
            .send(supplier_email, REQUEST_SUBJECT, &body)
            .await?;

        tracing::info!(
            supplier = supplier_email,
            thread_id = %outcome.thread_id,
            products = product_names.len(),
            "price request sent"
        );
        self.outstanding_threads.insert(outcome.thread_id.clone());
        Ok(outcome)
    }

    /// Scans the inbox for supplier replies and applies every extractable
    /// price update.
    ///
    /// Infallible by design: every failure along the way (mailbox, model,
    /// catalog) is logged and narrows the result rather than aborting the
    /// run. One result per message that produced at least one verified
    /// update.
    pub async fn process_replies(&mut self) -> Vec<SupplierReplyResult> {
        let own_email = match self.mailbox.user_email().await {
            Ok(address) => Some(address),
            Err(error) => {
                tracing::warn!(%error, "could not resolve own address; self-filter disabled");
                None
            }
        };

        let messages = self.fetch_replies().await;
        if messages.is_empty() {
            tracing::info!("no supplier replies found");
            return Vec::new();
        }

        let mut results = Vec::new();
        for message in messages {
            if let Some(own) = &own_email {
                if message.sender.eq_ignore_ascii_case(own) {
                    tracing::debug!(sender = %message.sender, "skipping message from self");
                    continue;
                }
            }

            if let Some(result) = self.process_message(&message).await {
                results.push(result);
            }
        }
        results
    }

    /// Tries queries from most to least specific; the first one with any
    /// matches wins, so a precise unread reply is never shadowed by the
    /// broad catch-all.
    async fn fetch_replies(&self) -> Vec<EmailMessage> {
        let reply_subject = reply_subject();
        let queries = [
            format!("subject:\"{reply_subject}\" is:unread"),
            format!("subject:\"{reply_subject}\""),
            "subject:\"Price Update\"".to_owned(),
        ];

        for query in &queries {
            match self.mailbox.search(query, self.max_results).await {
                Ok(messages) if !messages.is_empty() => {
                    tracing::info!(query, count = messages.len(), "replies found");
                    return messages;
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(query, %error, "inbox query failed");
                }
            }
        }
        Vec::new()
    }

    async fn process_message(&mut self, message: &EmailMessage) -> Option<SupplierReplyResult> {
        tracing::debug!(sender = %message.sender, subject = %message.subject, "processing reply");

        let extraction = self.engine.extract(&message.body).await?;
        tracing::debug!(products = extraction.products.len(), "extraction complete");

        let mut applied = Vec::new();
        for product in &extraction.products {
            if let Some(update) = self.apply_product(product).await {
                applied.push(update);
            }
        }

        if applied.is_empty() {
            tracing::info!(sender = %message.sender, "no products verified; message left untouched");
            return None;
        }

        self.finalize_message(message).await;

        let count = applied.len();
        Some(SupplierReplyResult {
            supplier: message.sender.clone(),
            products: applied,
            status: "processed".to_owned(),
            message: format!("Updated {count} product(s)"),
        })
    }

    /// Normalizes, writes and verifies one extracted product. Returns the
    /// applied update only when the re-read price matches what we wrote.
    async fn apply_product(&self, product: &ExtractedPriceUpdate) -> Option<AppliedUpdate> {
        let name = normalize_product_name(&product.name);
        let width = product.width.as_deref().and_then(normalize_width);
        let price = product.price_per_sqft;

        if !is_valid_price(price) {
            tracing::warn!(product = %name, price, "price outside accepted band");
            return None;
        }

        let update = PriceUpdate {
            name: name.clone(),
            width: width.clone(),
            price,
            discount_percentage: product.discount_percentage,
            min_qty: product.min_qty_discount,
            promotion_name: product.promotion.clone(),
            volume_discounts: product.volume_discounts.clone(),
            supplier_id: None,
        };

        match self.catalog.update_price(&update).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    product = %name,
                    width = width.as_deref().unwrap_or("any"),
                    "product not found in catalog"
                );
                return None;
            }
            Err(error) => {
                tracing::warn!(product = %name, %error, "catalog update failed");
                return None;
            }
        }

        if !self.verify_update(&name, width.as_deref(), price).await {
            tracing::warn!(
                product = %name,
                width = width.as_deref().unwrap_or("any"),
                price,
                "update reported success but verification failed"
            );
            return None;
        }

        let display_name = match &width {
            Some(width) => format!("{name} ({width})"),
            None => name.clone(),
        };
        tracing::info!(
            product = %display_name,
            price,
            discount = product.discount_percentage.unwrap_or(0.0),
            "updated and verified"
        );

        Some(AppliedUpdate {
            name: display_name,
            price,
            discount: product.discount_percentage,
            promotion: product.promotion.clone(),
            volume_discounts: product.volume_discounts.clone(),
        })
    }

    /// Re-reads the catalog and confirms some row at the (name, width)
    /// address stores the price we just wrote, within a cent. The stored
    /// standard price is compared, falling back to cost when standard is
    /// unset.
    async fn verify_update(&self, name: &str, width: Option<&str>, price: f64) -> bool {
        let products = match self.catalog.list_products().await {
            Ok(products) => products,
            Err(error) => {
                tracing::warn!(%error, "verification read failed");
                return false;
            }
        };

        products.iter().any(|p| {
            p.name == name
                && width.is_none_or(|w| p.width == w)
                && {
                    let stored = if p.standard_price > 0.0 {
                        p.standard_price
                    } else {
                        p.cost_price
                    };
                    (stored - price).abs() < VERIFY_TOLERANCE
                }
        })
    }

    /// Marks the message read and archives it; label failures are logged
    /// but do not undo the catalog updates that already verified.
    async fn finalize_message(&mut self, message: &EmailMessage) {
        if let Err(error) = self.mailbox.mark_read(&message.id).await {
            tracing::warn!(message_id = %message.id, %error, "failed to mark message read");
        }
        if let Err(error) = self.mailbox.archive(&message.id).await {
            tracing::warn!(message_id = %message.id, %error, "failed to archive message");
        }
        if self.outstanding_threads.remove(&message.thread_id) {
            tracing::debug!(thread_id = %message.thread_id, "request thread settled");
        }
    }
}
