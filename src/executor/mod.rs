//! Resilient request execution.
//!
//! This module provides:
//! - Logical request and response envelopes ([`ApiRequest`], [`ApiResponse`])
//! - Per-call overrides ([`RequestOptions`])
//! - Exponential backoff ([`RetryPolicy`])
//! - The retrying executor ([`RequestExecutor`])
//!
//! Failure classification lives in a private submodule; it is the only
//! code that constructs [`ApiError`](crate::error::ApiError) values.

pub(crate) mod classify;
mod request;
mod retry;
mod retrying;

#[cfg(test)]
mod classify_tests;

pub use request::{ApiRequest, ApiResponse, RequestOptions};
pub use retry::RetryPolicy;
pub use retrying::RequestExecutor;
