//! Turns observed failures into [`ApiError`] values.
//!
//! This is the only place classified errors are constructed.

use std::time::Duration;

use http::StatusCode;
use serde::Deserialize;

use crate::error::{ApiError, ErrorKind, FieldError};
use crate::transport::{HttpError, HttpResponse};

/// Error envelope fields the service may include in a failure body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
    details: Option<serde_json::Value>,
    validation_errors: Option<serde_json::Value>,
    retry_after: Option<serde_json::Value>,
    timeout: Option<serde_json::Value>,
}

/// Classifies a failed exchange that produced no response.
///
/// Timeouts become [`ErrorKind::Timeout`]; an unusable URL is a caller
/// mistake and becomes [`ErrorKind::Validation`]; everything else is
/// [`ErrorKind::Network`].
pub(crate) fn transport_failure(error: HttpError, timeout: Duration) -> ApiError {
    match error {
        HttpError::Timeout => ApiError::new(
            ErrorKind::Timeout,
            format!("Request timed out after {}ms", timeout.as_millis()),
        )
        .with_timeout(timeout)
        .with_source(error),
        HttpError::InvalidUrl(ref reason) => {
            ApiError::new(ErrorKind::Validation, format!("Invalid request URL: {reason}"))
                .with_source(error)
        }
        HttpError::Connection(_) => {
            ApiError::new(ErrorKind::Network, format!("Network error: {error}")).with_source(error)
        }
    }
}

/// Classifies a non-success response by status, enriched from its body.
pub(crate) fn error_response(response: &HttpResponse) -> ApiError {
    let kind = ErrorKind::from_status(response.status);
    let body: ErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();

    let message = body
        .message
        .as_ref()
        .and_then(error_message)
        .or_else(|| body.error.as_ref().and_then(error_message))
        .unwrap_or_else(|| default_message(kind, response.status));

    let mut error = ApiError::new(kind, message).with_status(response.status);

    if let Some(details) = body.details {
        error = error.with_details(details);
    }

    if let Some(raw) = body.validation_errors {
        error = error.with_validation_errors(field_errors(raw));
    }

    let retry_after = body
        .retry_after
        .as_ref()
        .and_then(number)
        .and_then(seconds)
        .or_else(|| retry_after_header(response));
    if let Some(retry_after) = retry_after {
        error = error.with_retry_after(retry_after);
    }

    let timeout = body
        .timeout
        .as_ref()
        .and_then(number)
        .and_then(|ms| seconds(ms / 1000.0));
    if let Some(timeout) = timeout {
        error = error.with_timeout(timeout);
    }

    error
}

/// A request that could not be built locally; never sent.
pub(crate) fn invalid_request(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorKind::Validation, message)
}

/// A successful response whose payload did not match the expected shape.
pub(crate) fn undecodable_payload(error: &serde_json::Error, status: StatusCode) -> ApiError {
    ApiError::new(
        ErrorKind::Unknown,
        format!("Unexpected response payload: {error}"),
    )
    .with_status(status)
}

/// A local wait that ran out of time.
pub(crate) fn deadline_exceeded(what: &str, waited: Duration) -> ApiError {
    ApiError::new(
        ErrorKind::Timeout,
        format!("{what} did not finish within {}s", waited.as_secs()),
    )
    .with_timeout(waited)
}

fn error_message(error: &serde_json::Value) -> Option<String> {
    match error {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string),
        _ => None,
    }
}

fn default_message(kind: ErrorKind, status: StatusCode) -> String {
    match kind {
        ErrorKind::Validation => "Invalid request".to_string(),
        ErrorKind::Authentication => "Authentication failed".to_string(),
        ErrorKind::Authorization => "Access denied".to_string(),
        ErrorKind::NotFound => "Resource not found".to_string(),
        ErrorKind::RateLimit => "Rate limit exceeded".to_string(),
        ErrorKind::Timeout => "Request timed out".to_string(),
        ErrorKind::Server => format!("Server error ({status})"),
        ErrorKind::Network | ErrorKind::Unknown => format!("Request failed with status {status}"),
    }
}

/// Accepts `[{"field", "message"}]` or `{"field": "msg" | ["msg", ...]}`.
fn field_errors(raw: serde_json::Value) -> Vec<FieldError> {
    match raw {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<FieldError>(item).ok())
            .collect(),
        serde_json::Value::Object(map) => map
            .into_iter()
            .flat_map(|(field, value)| {
                let messages = match value {
                    serde_json::Value::String(s) => vec![s],
                    serde_json::Value::Array(list) => list
                        .into_iter()
                        .filter_map(|m| m.as_str().map(ToString::to_string))
                        .collect(),
                    other => vec![other.to_string()],
                };
                messages.into_iter().map(move |message| FieldError {
                    field: field.clone(),
                    message,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts JSON numbers and numeric strings.
fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

fn retry_after_header(response: &HttpResponse) -> Option<Duration> {
    response
        .headers
        .get(http::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
