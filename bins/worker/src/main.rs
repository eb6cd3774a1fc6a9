//! Tilasto background worker.
//!
//! Keeps the statistics store up to date by fetching every due StatFin dataset on
//! a fixed interval.
//!
//! Usage:
//! - `tilasto-worker` runs the scheduler until Ctrl-C or SIGTERM
//! - `tilasto-worker once [DATASET_ID]` fetches once (one dataset, or every active
//!   configuration) and exits

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tilasto_core::schedule::FetchSummary;
use tilasto_fetcher::{DataFetcher, FetcherOptions, Scheduler};
use tilasto_shared::AppConfig;
use tilasto_shared::config::{LogConfig, LogFormat};
use tilasto_statfin::StatFinClient;
use tilasto_store::{CatalogSeed, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let store = MemoryStore::new();
    if let Some(path) = &config.worker.catalog_path {
        let seed = CatalogSeed::load(path).with_context(|| format!("Failed to read catalog {path}"))?;
        store.seed(seed).context("Failed to seed catalog")?;
    }

    let client = StatFinClient::from_config(&config.statfin).context("Failed to create StatFin client")?;
    info!(base_url = %client.base_url(), "StatFin client configured");

    let fetcher = Arc::new(DataFetcher::new(
        Arc::new(client),
        store,
        FetcherOptions::from_config(&config.worker),
    ));
    let scheduler = Arc::new(Scheduler::from_config(fetcher, &config.worker));

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("once") {
        let dataset_id = args.next();
        let results = scheduler.trigger_now(dataset_id.as_deref()).await;
        let summary = FetchSummary::from_results(&results);
        for result in &results {
            info!("{result}");
        }
        anyhow::ensure!(summary.is_clean(), "{} of {} fetches failed", summary.failed, summary.attempted);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run(shutdown_rx).await }
    });

    info!("Worker is running. Press Ctrl+C to stop.");
    shutdown_signal().await;
    info!("Shutting down, waiting for the current job to finish");
    shutdown_tx.send(true).ok();

    let runs = worker.await.context("Scheduler task panicked")?;
    info!(runs, "Worker stopped");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let (pretty, json) = match log.format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
