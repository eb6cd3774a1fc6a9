//! Outcomes of fetch runs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of fetching one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Whether the fetch completed.
    pub success: bool,
    /// Dataset fetched.
    pub dataset_id: String,
    /// Cells received from StatFin.
    pub records_fetched: usize,
    /// Rows inserted.
    pub records_inserted: usize,
    /// Rows updated in place.
    pub records_updated: usize,
    /// Cells dropped during normalization.
    pub records_skipped: usize,
    /// Wall-clock time of the fetch.
    pub duration: Duration,
    /// Failure reason.
    pub error_message: Option<String>,
    /// Non-fatal issues, e.g. unknown dimension codes.
    pub warnings: Vec<String>,
}

impl FetchResult {
    /// A failed result for `dataset_id`.
    #[must_use]
    pub fn failed(dataset_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(
                f,
                "FetchResult(dataset={}, success=true, fetched={}, inserted={}, updated={}, skipped={}, duration={}ms)",
                self.dataset_id,
                self.records_fetched,
                self.records_inserted,
                self.records_updated,
                self.records_skipped,
                self.duration.as_millis()
            )
        } else {
            write!(
                f,
                "FetchResult(dataset={}, success=false, error={:?})",
                self.dataset_id,
                self.error_message.as_deref().unwrap_or_default()
            )
        }
    }
}

/// Aggregate of one scheduled run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Datasets attempted.
    pub attempted: usize,
    /// Datasets fetched successfully.
    pub successful: usize,
    /// Datasets that failed.
    pub failed: usize,
    /// Rows inserted across all datasets.
    pub records_inserted: usize,
    /// `dataset: error` for each failure.
    pub errors: Vec<String>,
}

impl FetchSummary {
    /// Aggregates individual results.
    #[must_use]
    pub fn from_results(results: &[FetchResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.attempted += 1;
            if result.success {
                summary.successful += 1;
                summary.records_inserted += result.records_inserted;
            } else {
                summary.failed += 1;
                summary.errors.push(format!(
                    "{}: {}",
                    result.dataset_id,
                    result.error_message.as_deref().unwrap_or("unknown error")
                ));
            }
            summary
        })
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
