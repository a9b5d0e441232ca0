//! Resilience for idempotent reads
//!
//! Retry with exponential backoff and jitter for transient failures.

pub mod retry;

pub use retry::{RetryPolicy, RetryConfig, RetryableError};
