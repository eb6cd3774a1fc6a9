//! Store errors.

use thiserror::Error;
use tilasto_core::catalog::CatalogError;
use tilasto_shared::AppError;

/// Errors raised by the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind.
        entity: &'static str,
        /// Identifier looked up.
        id: String,
    },

    /// The record would violate a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The input failed validation.
    #[error(transparent)]
    Validation(#[from] CatalogError),

    /// A seed catalog could not be read.
    #[error("Invalid catalog file: {0}")]
    Seed(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Validation(e) => e.into(),
            StoreError::Seed(msg) => Self::Configuration(msg),
        }
    }
}
