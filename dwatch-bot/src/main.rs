//! DAO governance watcher
//!
//! Polls the indexer for governance operations on one contract and posts a
//! chat notification for each vote, proposal, timelock execution, and
//! voting close.

mod config;
mod shutdown;

use clap::Parser;
use config::{ConfigLoader, Overrides};
use dwatch_core::processors::{ErrorReporter, Watcher};
use dwatch_core::utils::sleeper::TokioSleeper;
use dwatch_sdk::client::{IndexerClient, WebhookClient};
use shutdown::spawn_shutdown_handler;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Request timeout shared by the indexer and webhook clients.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// DAO governance watcher - posts contract activity to a Discord webhook
#[derive(Parser, Debug)]
#[command(name = "dwatch-bot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discord webhook URL notifications are posted to
    #[arg(long, env = "DISCORD_WEBHOOK", hide_env_values = true)]
    webhook: Option<String>,

    /// Endpoint that receives JSON error reports (replaces SENTRY_DSN, which
    /// is no longer read as a reporting target)
    #[arg(long, env = "ERROR_REPORT_URL", hide_env_values = true)]
    error_report_url: Option<String>,

    /// Only checked to warn that it is no longer used
    #[arg(long, env = "SENTRY_DSN", hide = true, hide_env_values = true)]
    sentry_dsn: Option<String>,

    /// Contract to watch, as <network>/<address>
    #[arg(long, env = "DWATCH_CONTRACT")]
    contract: Option<String>,

    /// Base URL of the indexer API
    #[arg(long, env = "DWATCH_INDEXER_URL")]
    indexer_url: Option<String>,

    /// Notify for the contract's entire history once, then exit
    #[arg(long, default_value = "false")]
    backfill: bool,

    /// Emit logs as JSON
    #[arg(long, default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_json);

    tracing::info!("Starting dwatch-bot v{}", env!("CARGO_PKG_VERSION"));

    let overrides = Overrides {
        webhook: args.webhook,
        error_report_url: args.error_report_url,
        contract: args.contract,
        indexer_url: args.indexer_url,
        sentry_dsn: args.sentry_dsn,
    };
    let loaded = ConfigLoader::new(args.config.as_deref(), overrides)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;

    if let Some(path) = &args.config {
        tracing::info!("Configuration loaded from {:?}", path);
    }
    tracing::info!(
        contract = %loaded.watcher.contract,
        indexer = %loaded.indexer_url,
        "Watching contract"
    );

    let reporter = ErrorReporter::new(loaded.error_report_url.clone());
    if loaded.sentry_dsn_ignored {
        tracing::warn!(
            "SENTRY_DSN is set but no longer used; set ERROR_REPORT_URL to keep error reporting"
        );
    }
    if !reporter.is_enabled() {
        tracing::warn!("ERROR_REPORT_URL not set, error reporting disabled");
    }

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let indexer = IndexerClient::new(loaded.indexer_url.clone(), loaded.watcher.contract.clone())
        .with_http_client(http.clone());
    let webhook = WebhookClient::new(loaded.webhook_url.clone()).with_http_client(http);

    let mut shutdown_rx = spawn_shutdown_handler()?;

    let mut watcher = Watcher::new(
        indexer,
        webhook,
        loaded.watcher,
        reporter,
        Arc::new(TokioSleeper),
    );

    if args.backfill {
        tokio::select! {
            result = watcher.backfill() => {
                let report = result.map_err(|e| {
                    tracing::error!("Backfill failed: {}", e);
                    e
                })?;
                tracing::info!(
                    groups = report.groups,
                    delivered = report.delivered,
                    unknown = report.unknown,
                    malformed = report.malformed,
                    dropped = report.dropped,
                    "Backfill complete"
                );
            }
            _ = shutdown_rx.changed() => {
                tracing::info!("Backfill interrupted");
            }
        }
        return Ok(());
    }

    watcher.run(shutdown_rx).await;
    tracing::info!("dwatch-bot shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
