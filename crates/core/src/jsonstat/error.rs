//! JSON-stat decoding errors.

use thiserror::Error;
use tilasto_shared::AppError;

/// Errors raised while decoding a JSON-stat document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsonStatError {
    /// A required top-level field is missing.
    #[error("Invalid JSON-stat response: missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("Invalid JSON-stat response: field '{field}' {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl From<JsonStatError> for AppError {
    fn from(err: JsonStatError) -> Self {
        Self::ExternalService(err.to_string())
    }
}
