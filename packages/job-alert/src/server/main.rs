// Main entry point for the job alert service

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_alert_core::scheduler::{start_scheduler, stop_scheduler};
use job_alert_core::server::build_app;
use job_alert_core::{force_sweep, run_search_cycle, Config, CycleError, SearchContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "job-alert")]
#[command(about = "Scheduled job board search with new-job alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and HTTP API (default)
    Serve,

    /// Run one search cycle and exit
    Run,

    /// Print job history statistics as JSON
    Stats,

    /// Sweep old entries from the job history now
    Sweep {
        /// Defaults to HISTORY_MAX_AGE_DAYS
        #[arg(long)]
        max_age_days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_alert_core=debug,job_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let ctx = Arc::new(SearchContext::from_config(config).context("Failed to set up search")?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(ctx).await,
        Commands::Run => {
            let outcome = match run_search_cycle(&ctx).await {
                Ok(outcome) => outcome,
                Err(CycleError::AlreadyRunning { pid }) => {
                    tracing::warn!(holder = ?pid, "Another search cycle is running, exiting");
                    return Ok(());
                }
                Err(e) => return Err(e).context("Search cycle failed"),
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&ctx.history_stats())?);
            Ok(())
        }
        Commands::Sweep { max_age_days } => {
            let max_age_days = max_age_days.unwrap_or(ctx.config.history_max_age_days);
            let stats = force_sweep(&ctx, max_age_days)
                .await
                .context("Sweep failed")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn serve(ctx: Arc<SearchContext>) -> Result<()> {
    let scheduler = start_scheduler(ctx.clone())
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(ctx.clone());

    // Start server
    let addr = ctx.config.bind_addr();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Status: http://localhost:{}/status", ctx.config.server_port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    stop_scheduler(scheduler, &ctx).await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
