//! HTTP client layer — `QuoteHttp` with an opt-in retry policy.

pub mod client;
pub mod retry;

pub use client::QuoteHttp;
pub use retry::{RetryConfig, RetryPolicy};
