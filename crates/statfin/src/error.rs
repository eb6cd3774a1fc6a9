//! StatFin client errors.

use thiserror::Error;
use tilasto_core::jsonstat::JsonStatError;
use tilasto_shared::AppError;

/// Errors raised by the StatFin client.
#[derive(Debug, Error)]
pub enum StatFinError {
    /// The API kept answering 429 until retries ran out.
    #[error("StatFin rate limit exceeded after {attempts} attempts")]
    RateLimited {
        /// Attempts made.
        attempts: u32,
    },

    /// The request was rejected (4xx other than 429). Not retried.
    #[error("StatFin rejected request with HTTP {status}: {message}")]
    Client {
        /// HTTP status.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The API kept failing with 5xx until retries ran out.
    #[error("StatFin server error HTTP {status} after {attempts} attempts")]
    Server {
        /// Last HTTP status.
        status: u16,
        /// Attempts made.
        attempts: u32,
    },

    /// The request timed out on every attempt.
    #[error("StatFin request timed out after {attempts} attempts")]
    Timeout {
        /// Attempts made.
        attempts: u32,
    },

    /// Connection or protocol failure on every attempt.
    #[error("StatFin transport error after {attempts} attempts: {message}")]
    Transport {
        /// Attempts made.
        attempts: u32,
        /// Last error.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid StatFin response: {0}")]
    Decode(String),

    /// The response was not a valid JSON-stat document.
    #[error(transparent)]
    JsonStat(#[from] JsonStatError),

    /// The configured base URL or a table path is not a valid URL.
    #[error("Invalid StatFin URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl StatFinError {
    /// Returns true for rate limiting.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<StatFinError> for AppError {
    fn from(err: StatFinError) -> Self {
        match err {
            StatFinError::RateLimited { .. } => Self::RateLimited(err.to_string()),
            StatFinError::InvalidUrl(_) | StatFinError::Build(_) => Self::Configuration(err.to_string()),
            _ => Self::ExternalService(err.to_string()),
        }
    }
}
