//! Praxis REST API
//!
//! Typed client for the course, lecture, survey and assignment endpoints.
//! The base path is fixed when the client is built from configuration.

pub mod client;
pub mod constants;
pub mod models;
pub mod resilience;

pub use client::{DashboardApi, PraxisClient};
pub use models::*;
pub use resilience::{RetryConfig, RetryPolicy, RetryableError};
