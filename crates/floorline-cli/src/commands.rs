//! Command handlers for the CLI.
//!
//! These are called from `main` (and from the scheduler's cron jobs) after
//! configuration is loaded. Per-supplier failures inside a run are logged
//! and skipped rather than propagated so one bad address does not abort the
//! full run.

use anyhow::Context;
use sqlx::PgPool;

use floorline_core::AppConfig;
use floorline_db::{products, seed, suppliers, sync_history, PgCatalog};
use floorline_extract::ExtractionEngine;
use floorline_gemini::client::RetryPolicy;
use floorline_gemini::GeminiClient;
use floorline_mail::GmailClient;
use floorline_pipeline::{ReplyProcessor, SupplierReplyResult};

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool_config = floorline_db::PoolConfig::from_app_config(config);
    let pool = floorline_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to the database")?;
    let applied = floorline_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }
    Ok(pool)
}

fn build_mailbox(config: &AppConfig) -> anyhow::Result<GmailClient> {
    let token = config
        .gmail_access_token
        .as_deref()
        .context("GMAIL_ACCESS_TOKEN is not set; mail commands are unavailable")?;
    Ok(GmailClient::new(token, config.http_timeout_secs)?)
}

/// Builds the extraction engine, degrading to regex-only when no usable
/// Gemini key is configured.
fn build_engine(config: &AppConfig) -> ExtractionEngine {
    let llm = config.gemini_api_key.as_deref().and_then(|key| {
        let retry = RetryPolicy {
            max_retries: config.gemini_max_retries,
            backoff_base_ms: config.gemini_backoff_base_ms,
        };
        match GeminiClient::new(key, &config.gemini_model, config.http_timeout_secs, retry) {
            Ok(client) => Some(client),
            Err(error) => {
                tracing::warn!(%error, "Gemini client unavailable, continuing with regex fallback only");
                None
            }
        }
    });
    ExtractionEngine::new(llm)
}

fn max_results(config: &AppConfig) -> u32 {
    u32::try_from(config.mail_max_results).unwrap_or(20)
}

/// One reply-processing cycle: fetch, extract, apply, verify, archive.
/// Records the outcome in `sync_history`.
pub(crate) async fn check_replies_cycle(
    pool: &PgPool,
    config: &AppConfig,
) -> anyhow::Result<Vec<SupplierReplyResult>> {
    let mailbox = build_mailbox(config)?;
    let catalog = PgCatalog::new(pool.clone());
    let mut processor = ReplyProcessor::new(mailbox, catalog, build_engine(config))
        .with_max_results(max_results(config));

    let results = processor.process_replies().await;
    if results.is_empty() {
        sync_history::log_sync_event(
            pool,
            "email_check",
            "skipped",
            Some("No supplier replies found"),
            None,
        )
        .await?;
    } else {
        let updated: usize = results.iter().map(|r| r.products.len()).sum();
        let message = format!("Updated {updated} product(s) from {} replies", results.len());
        sync_history::log_sync_event(pool, "email_check", "success", Some(&message), None).await?;
    }
    Ok(results)
}

/// One request cycle: email the current product list to every active
/// supplier. Returns the number of requests sent.
pub(crate) async fn send_requests_cycle(
    pool: &PgPool,
    config: &AppConfig,
) -> anyhow::Result<usize> {
    let mailbox = build_mailbox(config)?;
    let catalog = PgCatalog::new(pool.clone());
    let mut processor = ReplyProcessor::new(mailbox, catalog, build_engine(config));

    let product_list: Vec<String> = products::list_products(pool)
        .await?
        .into_iter()
        .map(|row| format!("{} {}", row.name, row.width))
        .collect();

    let mut sent = 0usize;
    for supplier in suppliers::list_suppliers(pool).await? {
        if !supplier.is_active {
            continue;
        }
        match processor
            .send_price_request(&supplier.email, &product_list)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    supplier = %supplier.name,
                    thread_id = %outcome.thread_id,
                    "price request sent"
                );
                sync_history::log_sync_event(
                    pool,
                    "price_request",
                    "success",
                    Some(&format!("Request sent to {}", supplier.name)),
                    Some(supplier.id),
                )
                .await?;
                sent += 1;
            }
            Err(error) => {
                tracing::error!(supplier = %supplier.name, %error, "failed to send price request");
                sync_history::log_sync_event(
                    pool,
                    "price_request",
                    "error",
                    Some(&error.to_string()),
                    Some(supplier.id),
                )
                .await?;
            }
        }
    }
    Ok(sent)
}

pub(crate) async fn run_check_replies(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let results = check_replies_cycle(&pool, config).await?;
    if results.is_empty() {
        println!("no supplier replies to process");
        return Ok(());
    }
    for result in &results {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

pub(crate) async fn run_send_requests(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let sent = send_requests_cycle(&pool, config).await?;
    println!("sent {sent} price request(s)");
    Ok(())
}

pub(crate) async fn run_seed(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let (product_count, supplier_count) = seed::seed_sample_data(&pool).await?;
    println!("seeded {product_count} products and {supplier_count} suppliers");
    Ok(())
}

pub(crate) async fn run_ensure_widths(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let created = products::ensure_all_widths(&pool).await?;
    println!("created {created} missing width variant(s)");
    Ok(())
}
