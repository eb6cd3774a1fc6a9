//! Catalog validation errors.

use thiserror::Error;
use tilasto_shared::AppError;

/// Catalog input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A required name is empty or blank.
    #[error("Name must not be empty")]
    EmptyName,

    /// A dataset identifier is empty or blank.
    #[error("Dataset id must not be empty")]
    EmptyDatasetId,

    /// A StatFin table identifier is empty or blank.
    #[error("StatFin table id must not be empty")]
    EmptyTableId,

    /// Fetch interval below one hour or above the supported maximum.
    #[error("Fetch interval must be between 1 and {max} hours, got {0}", max = crate::catalog::types::MAX_FETCH_INTERVAL_HOURS)]
    InvalidInterval(u32),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Validation(err.to_string())
    }
}
