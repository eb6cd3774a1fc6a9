//! Retry policy for StatFin requests.
//!
//! Rate limiting (429) waits for `Retry-After` when the server sends one. Server
//! errors, timeouts and transport failures back off exponentially. Other client
//! errors are never retried.

use std::time::Duration;

use reqwest::StatusCode;
use tilasto_shared::config::StatFinConfig;

use crate::error::StatFinError;

/// First backoff delay.
pub const INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for a single backoff delay.
pub const MAX_DELAY: Duration = Duration::from_secs(30);

/// Backoff multiplier between attempts.
pub const BACKOFF_FACTOR: u32 = 2;

/// How failed requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Delay cap.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryPolicy {
    /// Creates a policy with the standard delays.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: INITIAL_DELAY,
            max_delay: MAX_DELAY,
        }
    }

    /// Builds the policy from configuration.
    #[must_use]
    pub const fn from_config(config: &StatFinConfig) -> Self {
        Self::new(config.max_retries)
    }

    /// Overrides the delay bounds.
    #[must_use]
    pub const fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    /// Exponential backoff for the given zero-based attempt, capped at `max_delay`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = BACKOFF_FACTOR.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Delay before retrying after `failure` on the given attempt.
    ///
    /// A server-provided `Retry-After` wins over the computed backoff.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, failure: &AttemptFailure) -> Duration {
        match failure {
            AttemptFailure::RateLimited {
                retry_after: Some(wait),
            } => *wait,
            _ => self.backoff(attempt),
        }
    }

    /// Total attempts including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// A failed attempt that may be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// HTTP 429.
    RateLimited {
        /// Parsed `Retry-After` header.
        retry_after: Option<Duration>,
    },
    /// HTTP 5xx.
    Server {
        /// Response status.
        status: u16,
    },
    /// The request timed out.
    Timeout,
    /// Connection or protocol failure.
    Transport(String),
}

impl AttemptFailure {
    /// Converts the last failure into the error reported to the caller.
    #[must_use]
    pub fn into_error(self, attempts: u32) -> StatFinError {
        match self {
            Self::RateLimited { .. } => StatFinError::RateLimited { attempts },
            Self::Server { status } => StatFinError::Server { status, attempts },
            Self::Timeout => StatFinError::Timeout { attempts },
            Self::Transport(message) => StatFinError::Transport { attempts, message },
        }
    }
}

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx, use the body.
    Success,
    /// 429, wait and retry.
    RateLimited,
    /// 5xx, back off and retry.
    ServerError,
    /// Anything else, fail now.
    ClientError,
}

impl StatusClass {
    /// Classifies a response status.
    #[must_use]
    pub fn of(status: StatusCode) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else if status.is_server_error() {
            Self::ServerError
        } else {
            Self::ClientError
        }
    }
}

/// Parses a `Retry-After` header given in seconds.
///
/// HTTP-date values are ignored and fall back to the regular backoff.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
