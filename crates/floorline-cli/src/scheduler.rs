//! Recurring job loop for the `schedule` command.
//!
//! Two cron jobs: price requests go out Monday mornings, reply checks run
//! each weekday afternoon. Jobs run one at a time within the process and
//! every outcome lands in `sync_history`, so an operator can audit runs
//! without watching the logs.

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use floorline_core::AppConfig;
use floorline_db::sync_history;

use crate::commands;

const REQUEST_SCHEDULE: &str = "0 0 9 * * Mon";
const REPLY_CHECK_SCHEDULE: &str = "0 0 14 * * Mon-Fri";

pub(crate) async fn run_schedule(config: AppConfig) -> anyhow::Result<()> {
    let pool = commands::connect(&config).await?;

    let mut scheduler = JobScheduler::new().await?;

    let request_pool = pool.clone();
    let request_config = config.clone();
    scheduler
        .add(Job::new_async(REQUEST_SCHEDULE, move |_id, _lock| {
            let pool = request_pool.clone();
            let config = request_config.clone();
            Box::pin(async move {
                match commands::send_requests_cycle(&pool, &config).await {
                    Ok(sent) => tracing::info!(sent, "scheduled price request run finished"),
                    Err(error) => {
                        tracing::error!(%error, "scheduled price request run failed");
                        record_failure(&pool, "price_request", &error).await;
                    }
                }
            })
        })?)
        .await?;

    let reply_pool = pool.clone();
    let reply_config = config.clone();
    scheduler
        .add(Job::new_async(REPLY_CHECK_SCHEDULE, move |_id, _lock| {
            let pool = reply_pool.clone();
            let config = reply_config.clone();
            Box::pin(async move {
                match commands::check_replies_cycle(&pool, &config).await {
                    Ok(results) => {
                        tracing::info!(replies = results.len(), "scheduled reply check finished");
                    }
                    Err(error) => {
                        tracing::error!(%error, "scheduled reply check failed");
                        record_failure(&pool, "email_check", &error).await;
                    }
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!(
        requests = REQUEST_SCHEDULE,
        replies = REPLY_CHECK_SCHEDULE,
        "scheduler running, press ctrl-c to stop"
    );

    tokio::signal::ctrl_c().await?;
    scheduler.shutdown().await?;
    Ok(())
}

async fn record_failure(pool: &PgPool, sync_type: &str, error: &anyhow::Error) {
    if let Err(log_error) =
        sync_history::log_sync_event(pool, sync_type, "error", Some(&error.to_string()), None).await
    {
        tracing::error!(%log_error, "failed to record job failure in sync_history");
    }
}
