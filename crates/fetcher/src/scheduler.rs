//! Periodic fetch job.
//!
//! The job runs once at startup and then on every interval tick. Ticks missed
//! while a job is still running are skipped, so at most one job runs at a time
//! and a backlog never builds up.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tilasto_core::schedule::{FetchResult, FetchSummary};
use tilasto_shared::config::WorkerConfig;
use tilasto_statfin::StatFinSource;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::fetcher::DataFetcher;

const SECS_PER_HOUR: u64 = 3600;

/// Runs the fetch job on a fixed interval until shut down.
#[derive(Debug)]
pub struct Scheduler<S> {
    fetcher: Arc<DataFetcher<S>>,
    interval: Duration,
}

impl<S: StatFinSource> Scheduler<S> {
    /// Creates a scheduler. A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(fetcher: Arc<DataFetcher<S>>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Creates a scheduler with the configured interval in hours.
    #[must_use]
    pub fn from_config(fetcher: Arc<DataFetcher<S>>, config: &WorkerConfig) -> Self {
        let hours = config.fetch_interval_hours.max(1);
        Self::new(fetcher, Duration::from_secs(hours.saturating_mul(SECS_PER_HOUR)))
    }

    /// Time between job runs.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs jobs until `shutdown` turns true or its sender is dropped.
    ///
    /// A job in progress is finished before returning. Returns the number of
    /// jobs run.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = self.interval.as_secs(), "Scheduler started");
        let mut runs = 0;
        if *shutdown.borrow() {
            tracing::info!(runs, "Scheduler stopped");
            return runs;
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_job().await;
                    runs += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(runs, "Scheduler stopped");
        runs
    }

    /// Runs one scheduled job: every due configuration.
    pub async fn run_job(&self) -> FetchSummary {
        let started = Instant::now();
        tracing::info!("Starting scheduled fetch job");

        let results = self.fetcher.fetch_all_active(false).await;
        let summary = FetchSummary::from_results(&results);

        tracing::info!(
            attempted = summary.attempted,
            successful = summary.successful,
            failed = summary.failed,
            records_inserted = summary.records_inserted,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Fetch job completed"
        );
        for error in &summary.errors {
            tracing::warn!(error = %error, "Fetch failed during job");
        }
        summary
    }

    /// Runs a fetch outside the schedule: one dataset, or every active
    /// configuration regardless of when it is due.
    pub async fn trigger_now(&self, dataset_id: Option<&str>) -> Vec<FetchResult> {
        tracing::info!(dataset_id = dataset_id.unwrap_or("all active"), "Manual fetch triggered");
        match dataset_id {
            Some(id) => vec![self.fetcher.fetch_dataset(id).await],
            None => self.fetcher.fetch_all_active(true).await,
        }
    }
}
