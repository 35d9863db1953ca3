//! Remote data access.
//!
//! - RescueTime request building + blocking HTTP client (`rescuetime`)
//! - bounded retry with exponential backoff (`retry`)

pub mod rescuetime;
pub mod retry;

pub use rescuetime::{ChunkFetcher, RescueTimeClient, build_request, build_request_at, redact_credential};
pub use retry::{Failure, RetryPolicy};
