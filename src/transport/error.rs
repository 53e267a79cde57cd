//! Transport-level failures.

use thiserror::Error;

/// A request that produced no HTTP response at all.
///
/// Any response, including 4xx/5xx, is not a transport failure; status
/// handling belongs to the executor's classification step.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The connection could not be established or broke mid-exchange.
    ///
    /// Covers DNS failures, refused connections, resets, and body read
    /// errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The attempt exceeded its timeout before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Returns true if this failure was caused by the attempt's timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
