//! Normalization errors.

use thiserror::Error;

/// Errors raised while normalizing dimension codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// No year could be read from a time code.
    #[error("Unrecognized time code format: {0}")]
    UnrecognizedTimeCode(String),
}
