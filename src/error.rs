//! Classified errors surfaced by every remote operation.
//!
//! [`ApiError`] values are produced only by the executor's classification
//! step; callers branch on [`ErrorKind`] to decide on remediation.

use std::fmt;
use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::HttpError;

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed (400).
    Validation,
    /// Credentials were missing or rejected (401).
    Authentication,
    /// Credentials were valid but lack permission (403).
    Authorization,
    /// The addressed resource does not exist (404).
    NotFound,
    /// The service is throttling the caller (429).
    RateLimit,
    /// The attempt timed out, locally or as reported by the server (408).
    Timeout,
    /// No response was received.
    Network,
    /// The service failed (500, 502, 503, 504).
    Server,
    /// Any other non-success status.
    Unknown,
}

impl ErrorKind {
    /// Maps an HTTP status to its kind.
    #[must_use]
    pub const fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            408 => Self::Timeout,
            429 => Self::RateLimit,
            500 | 502 | 503 | 504 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Returns true if a request failing this way may succeed unchanged.
    ///
    /// Validation, authentication, authorization and not-found failures
    /// need caller-side correction and are never retried.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        match self {
            Self::Validation | Self::Authentication | Self::Authorization | Self::NotFound => false,
            Self::RateLimit | Self::Timeout | Self::Network | Self::Server | Self::Unknown => true,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-level validation message returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name or path of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// A failure observed while talking to the service, after classification.
///
/// Immutable once created. When `status` is present it agrees with
/// `kind` (for example `RateLimit` always carries 429).
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    details: Option<serde_json::Value>,
    validation_errors: Vec<FieldError>,
    retry_after: Option<Duration>,
    timeout: Option<Duration>,
    #[source]
    source: Option<HttpError>,
}

impl ApiError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
            validation_errors: Vec::new(),
            retry_after: None,
            timeout: None,
            source: None,
        }
    }

    pub(crate) const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub(crate) fn with_validation_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.validation_errors = errors;
        self
    }

    pub(crate) const fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub(crate) const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn with_source(mut self, source: HttpError) -> Self {
        self.source = Some(source);
        self
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Free-form details from the error body.
    #[must_use]
    pub const fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    /// Field-level validation messages, empty unless the service sent any.
    #[must_use]
    pub fn validation_errors(&self) -> &[FieldError] {
        &self.validation_errors
    }

    /// Server-suggested wait before retrying (rate limiting).
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Timeout that expired, when known.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Shorthand for `self.kind().is_retryable()`.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
