mod commands;
mod scheduler;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "floorline")]
#[command(about = "Supplier pricing operations for the Floorline catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch supplier replies, apply extracted price updates, archive handled mail.
    CheckReplies,
    /// Email a price update request to every active supplier on file.
    SendRequests,
    /// Reset the database to the sample catalog and supplier list.
    Seed,
    /// Backfill missing width variants for every product family.
    EnsureWidths,
    /// Run the recurring request and reply-check jobs until interrupted.
    Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = floorline_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::CheckReplies => commands::run_check_replies(&config).await,
        Commands::SendRequests => commands::run_send_requests(&config).await,
        Commands::Seed => commands::run_seed(&config).await,
        Commands::EnsureWidths => commands::run_ensure_widths(&config).await,
        Commands::Schedule => scheduler::run_schedule(config).await,
    }
}
