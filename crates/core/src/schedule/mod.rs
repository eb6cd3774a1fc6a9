//! Fetch configuration lifecycle: due checks, outcome recording and run summaries.

pub mod result;
pub mod service;


pub use result::{FetchResult, FetchSummary};
pub use service::ScheduleService;
