//! StatFin PxWeb API client for Tilasto.
//!
//! Statistics Finland publishes its tables through a PxWeb API: a folder tree of
//! tables, a metadata endpoint per table and a POST endpoint returning JSON-stat.
//!
//! # Modules
//!
//! - `client` - HTTP client with retry and caching
//! - `retry` - Backoff policy and response classification
//! - `cache` - Listing and metadata cache
//! - `source` - The `StatFinSource` trait consumed by the fetcher

pub mod cache;
pub mod client;
pub mod error;
pub mod retry;
pub mod source;

pub use client::StatFinClient;
pub use error::StatFinError;
pub use retry::RetryPolicy;
pub use source::StatFinSource;
