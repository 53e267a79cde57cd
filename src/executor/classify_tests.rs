//! Tests for failure classification.

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use super::classify::{deadline_exceeded, error_response, invalid_request, transport_failure};
use crate::error::{ErrorKind, FieldError};
use crate::test_support::json_response;
use crate::transport::{HttpError, HttpResponse};

mod transport {
    use super::*;

    #[test]
    fn timeout_becomes_timeout_kind_without_status() {
        let error = transport_failure(HttpError::Timeout, Duration::from_millis(1500));

        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert_eq!(error.status(), None);
        assert_eq!(error.timeout(), Some(Duration::from_millis(1500)));
        assert!(error.message().contains("1500ms"));
    }

    #[test]
    fn connection_failure_becomes_network_kind() {
        let error = transport_failure(
            HttpError::Connection(Box::new(std::io::Error::other("connection refused"))),
            Duration::from_secs(30),
        );

        assert_eq!(error.kind(), ErrorKind::Network);
        assert!(error.message().contains("connection refused"));
        assert!(error.is_retryable());
    }

    #[test]
    fn invalid_url_is_terminal() {
        let error = transport_failure(
            HttpError::InvalidUrl("relative URL without a base".to_string()),
            Duration::from_secs(30),
        );

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(!error.is_retryable());
    }
}

mod responses {
    use super::*;

    #[test]
    fn body_message_wins_over_default() {
        let error = error_response(&json_response(404, &json!({"message": "flow f-9 not found"})));

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(error.message(), "flow f-9 not found");
    }

    #[test]
    fn error_field_used_when_message_missing() {
        let as_string = error_response(&json_response(401, &json!({"error": "token expired"})));
        let as_object = error_response(&json_response(
            403,
            &json!({"error": {"code": "forbidden", "message": "scope missing"}}),
        ));

        assert_eq!(as_string.message(), "token expired");
        assert_eq!(as_string.kind(), ErrorKind::Authentication);
        assert_eq!(as_object.message(), "scope missing");
        assert_eq!(as_object.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn non_json_body_falls_back_to_default_message() {
        let response = HttpResponse::new(
            StatusCode::BAD_GATEWAY,
            http::HeaderMap::new(),
            b"<html>bad gateway</html>".to_vec(),
        );
        let error = error_response(&response);

        assert_eq!(error.kind(), ErrorKind::Server);
        assert!(error.message().contains("502"));
    }

    #[test]
    fn validation_errors_accept_list_form() {
        let error = error_response(&json_response(
            400,
            &json!({
                "message": "Validation failed",
                "validation_errors": [
                    {"field": "name", "message": "is required"},
                    {"field": "capabilities", "message": "must not be empty"}
                ]
            }),
        ));

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(
            error.validation_errors(),
            &[
                FieldError {
                    field: "name".to_string(),
                    message: "is required".to_string()
                },
                FieldError {
                    field: "capabilities".to_string(),
                    message: "must not be empty".to_string()
                },
            ]
        );
    }

    #[test]
    fn validation_errors_accept_map_form() {
        let error = error_response(&json_response(
            400,
            &json!({"validation_errors": {"input": ["must be an object", "too large"]}}),
        ));

        let messages: Vec<_> = error
            .validation_errors()
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![("input", "must be an object"), ("input", "too large")]
        );
    }

    #[test]
    fn rate_limit_carries_retry_after_from_body() {
        let error = error_response(&json_response(429, &json!({"retry_after": 12})));

        assert_eq!(error.kind(), ErrorKind::RateLimit);
        assert_eq!(error.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(error.retry_after(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn rate_limit_falls_back_to_retry_after_header() {
        let mut response = json_response(429, &json!({}));
        response.headers.insert(
            http::header::RETRY_AFTER,
            http::HeaderValue::from_static("7"),
        );

        assert_eq!(
            error_response(&response).retry_after(),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn server_timeout_field_is_milliseconds() {
        let error = error_response(&json_response(408, &json!({"timeout": 30000})));

        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert_eq!(error.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn details_are_preserved() {
        let error = error_response(&json_response(
            500,
            &json!({"message": "boom", "details": {"trace_id": "abc"}}),
        ));

        assert_eq!(error.details(), Some(&json!({"trace_id": "abc"})));
    }

    #[test]
    fn unmapped_status_is_unknown_and_retryable() {
        let error = error_response(&json_response(409, &json!({})));

        assert_eq!(error.kind(), ErrorKind::Unknown);
        assert!(error.is_retryable());
    }
}

mod local {
    use super::*;

    #[test]
    fn invalid_request_is_validation_without_status() {
        let error = invalid_request("bad path");

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn deadline_exceeded_is_timeout() {
        let error = deadline_exceeded("Execution ex-1", Duration::from_secs(90));

        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert!(error.message().contains("90s"));
    }
}
