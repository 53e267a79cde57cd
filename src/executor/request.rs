//! Logical request and response envelopes.

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::transport::HttpResponse;

use super::classify;

/// Per-call overrides of the client defaults.
///
/// Anything left unset falls back to the [`ClientConfig`] snapshot the
/// executor holds when the call starts.
///
/// [`ClientConfig`]: crate::config::ClientConfig
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Per-attempt timeout.
    pub timeout: Option<Duration>,
    /// Retries after the first attempt.
    pub retries: Option<u32>,
    /// Extra headers; these win over client defaults.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Creates empty options (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the per-attempt timeout.
    ///
    /// A zero timeout is rejected by the executor as a validation error
    /// before any attempt is made.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the retry count.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Adds a header, replacing any value already set under that name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// One logical operation against the service.
///
/// `path` is appended to the configured base URL as-is, so it normally
/// starts with `/`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL
    pub path: String,
    /// JSON body
    pub body: Option<serde_json::Value>,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Per-call overrides
    pub options: RequestOptions,
}

impl ApiRequest {
    /// Creates a request with no body, query, or overrides.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Replaces the per-call overrides.
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Successful response envelope.
///
/// Returned verbatim from the first attempt that succeeded.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Decoded payload; `null` for empty bodies, a JSON string for
    /// bodies that are not JSON
    pub data: serde_json::Value,
    /// HTTP status
    pub status: StatusCode,
    /// Canonical reason phrase for `status`
    pub status_text: String,
    /// Response headers
    pub headers: HeaderMap,
}

impl ApiResponse {
    pub(crate) fn from_http(response: HttpResponse) -> Self {
        let data = decode_body(&response.body);
        Self {
            data,
            status: response.status,
            status_text: response
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            headers: response.headers,
        }
    }

    /// Decodes the payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an unknown-kind [`ApiError`] if the payload does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.data).map_err(|e| classify::undecodable_payload(&e, self.status))
    }
}

/// Decodes a response body leniently.
pub(crate) fn decode_body(body: &[u8]) -> serde_json::Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|_| {
        serde_json::Value::String(String::from_utf8_lossy(body).into_owned())
    })
}
