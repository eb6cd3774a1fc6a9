//! Fetch errors.

use thiserror::Error;
use tilasto_shared::AppError;
use tilasto_statfin::StatFinError;
use tilasto_store::StoreError;

/// Errors that abort the fetch of a dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No dataset with this id.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// No fetch configuration with this id.
    #[error("FetchConfig not found: {0}")]
    ConfigNotFound(i64),

    /// StatFin kept rate limiting the request.
    #[error("Rate limited: {0}")]
    RateLimited(StatFinError),

    /// Any other StatFin failure.
    #[error("API error: {0}")]
    Api(StatFinError),

    /// The rows could not be stored.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<StatFinError> for FetchError {
    fn from(err: StatFinError) -> Self {
        if err.is_rate_limited() {
            Self::RateLimited(err)
        } else {
            Self::Api(err)
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::DatasetNotFound(_) | FetchError::ConfigNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            FetchError::RateLimited(e) | FetchError::Api(e) => e.into(),
            FetchError::Store(e) => e.into(),
        }
    }
}
