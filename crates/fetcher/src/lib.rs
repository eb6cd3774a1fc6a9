//! Fetch orchestration and scheduling for Tilasto.
//!
//! # Modules
//!
//! - `fetcher` - `DataFetcher`: fetch, normalize and store one dataset at a time
//! - `scheduler` - Periodic fetch job with graceful shutdown

pub mod error;
pub mod fetcher;
pub mod scheduler;

pub use error::FetchError;
pub use fetcher::{DataFetcher, FetcherOptions};
pub use scheduler::Scheduler;

#[cfg(test)]
mod tests;
