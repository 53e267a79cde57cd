//! Transport layer: one HTTP attempt, no policy.
//!
//! This module provides:
//! - Request and response value types ([`HttpRequest`], [`HttpResponse`])
//! - The client seam used by the executor ([`HttpClient`])
//! - The production implementation ([`ReqwestClient`])
//! - Failures that produced no response ([`HttpError`])

mod client;
mod error;
mod http;

#[cfg(test)]
mod client_tests;

pub use client::{ReqwestClient, USER_AGENT};
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
