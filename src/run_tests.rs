//! Tests for the run module.

use std::sync::Mutex;

use agentflow::api::ExecutionStatus;
use agentflow::config::{Cli, ClientConfig};
use agentflow::executor::RequestExecutor;
use agentflow::time::InstantSleeper;
use agentflow::transport::{HttpError, HttpRequest, HttpResponse};
use serde_json::json;
use url::Url;

use super::*;

/// Replays canned JSON bodies in order.
struct StubClient {
    responses: Mutex<Vec<(u16, serde_json::Value)>>,
}

impl StubClient {
    fn new(mut responses: Vec<(u16, serde_json::Value)>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
        }
    }
}

impl HttpClient for StubClient {
    async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let (status, body) = self.responses.lock().unwrap().pop().ok_or(HttpError::Timeout)?;
        Ok(HttpResponse::new(
            http::StatusCode::from_u16(status).unwrap(),
            http::HeaderMap::new(),
            serde_json::to_vec(&body).unwrap(),
        ))
    }
}

fn client(stub: StubClient) -> AgentFlowClient<StubClient, InstantSleeper> {
    let config = ClientConfig::new(Url::parse("https://api.example.com/v1").unwrap()).unwrap();
    AgentFlowClient::from_executor(RequestExecutor::new(stub, config).with_sleeper(InstantSleeper))
}

fn execution(status: &str) -> serde_json::Value {
    json!({"id": "ex-1", "flowId": "flow-1", "status": status})
}

mod run_error {
    use super::*;

    #[test]
    fn invalid_input_names_the_argument() {
        let error = RunError::InvalidInput {
            what: "--query",
            reason: "'a' is not in K=V format".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid --query: 'a' is not in K=V format"
        );
    }

    #[test]
    fn signature_error_is_transparent() {
        let error = RunError::from(SignatureError::Mismatch);
        assert_eq!(error.to_string(), "Signature mismatch");
    }
}

mod request_building {
    use super::*;

    #[test]
    fn method_is_case_insensitive() {
        assert_eq!(parse_method("patch").unwrap(), Method::PATCH);
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
    }

    #[test]
    fn unsupported_method_is_rejected() {
        assert!(matches!(
            parse_method("TRACE"),
            Err(RunError::InvalidInput { what: "method", .. })
        ));
    }

    #[test]
    fn collects_body_and_query() {
        let request = build_request(
            "post",
            "/agents".to_string(),
            Some(r#"{"name":"researcher"}"#),
            &["limit=10".to_string(), "tag=a=b".to_string()],
        )
        .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"name": "researcher"})));
        assert_eq!(
            request.query,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("tag".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn query_without_separator_is_rejected() {
        let result = build_request("GET", "/agents".to_string(), None, &["limit".to_string()]);

        assert!(matches!(
            result,
            Err(RunError::InvalidInput { what: "--query", .. })
        ));
    }

    #[test]
    fn relative_path_is_rejected() {
        let result = build_request("GET", "agents".to_string(), None, &[]);

        assert!(matches!(result, Err(RunError::InvalidInput { what: "path", .. })));
    }

    #[test]
    fn invalid_json_body_is_rejected() {
        let result = build_request("POST", "/agents".to_string(), Some("{nope"), &[]);

        assert!(matches!(result, Err(RunError::InvalidInput { what: "--data", .. })));
    }

    #[test]
    fn missing_input_defaults_to_empty_object() {
        assert_eq!(parse_json("--input", None).unwrap(), json!({}));
    }

    #[test]
    fn wait_timeout_overrides_default() {
        assert_eq!(wait_options(None).timeout, WaitOptions::DEFAULT_TIMEOUT);
        assert_eq!(
            wait_options(Some(12)).timeout,
            std::time::Duration::from_secs(12)
        );
    }
}

mod commands {
    use super::*;

    #[tokio::test]
    async fn request_renders_payload() {
        let client = client(StubClient::new(vec![(200, json!({"data": [1, 2]}))]));
        let request = build_request("GET", "/agents".to_string(), None, &[]).unwrap();

        let output = request_command(&client, request).await.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"data": [1, 2]}));
    }

    #[tokio::test]
    async fn request_failure_is_api_error() {
        let client = client(StubClient::new(vec![(401, json!({"message": "bad key"}))]));
        let request = build_request("GET", "/agents".to_string(), None, &[]).unwrap();

        let err = request_command(&client, request).await.unwrap_err();

        assert!(matches!(err, RunError::Api(_)));
        assert!(err.to_string().contains("bad key"));
    }

    #[tokio::test]
    async fn execute_without_wait_returns_started_execution() {
        let client = client(StubClient::new(vec![(201, execution("pending"))]));

        let result = execute_command(&client, "flow-1", json!({}), None).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Pending);
    }

    #[tokio::test]
    async fn execute_with_wait_polls_until_terminal() {
        let client = client(StubClient::new(vec![
            (201, execution("pending")),
            (200, execution("running")),
            (200, execution("completed")),
        ]));

        let result = execute_command(&client, "flow-1", json!({}), Some(&WaitOptions::default()))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
    }

    #[test]
    fn sign_with_fixed_timestamp_is_deterministic() {
        let header = sign_command("whsec_test", Some(1_700_000_000), r#"{"id":"evt-1"}"#).unwrap();

        assert_eq!(
            header,
            "t=1700000000,v1=5056f09710e0bebdbcd623bb1a7714db4eac94f18745b31b96dd55a69f444e14"
        );
    }

    #[test]
    fn fresh_signature_verifies() {
        let header = sign_command("whsec_test", None, "payload").unwrap();

        let output = verify_command(
            "whsec_test",
            &header,
            "payload",
            std::time::Duration::from_secs(300),
        )
        .unwrap();

        assert_eq!(output, "Signature valid");
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let header = sign_command("whsec_test", None, "payload").unwrap();

        let err = verify_command(
            "whsec_test",
            &header,
            "payload!",
            std::time::Duration::from_secs(300),
        )
        .unwrap_err();

        assert!(matches!(err, RunError::Signature(SignatureError::Mismatch)));
    }

    #[tokio::test]
    async fn sign_without_secret_is_config_error() {
        let cli = Cli::parse_from_iter(["agentflow", "sign", "--payload", "{}"]);
        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        let err = execute(config, cli.command).await.unwrap_err();

        assert!(matches!(err, RunError::Config(ConfigError::MissingRequired { .. })));
    }

    #[tokio::test]
    async fn verify_rejects_zero_tolerance() {
        let cli = Cli::parse_from_iter([
            "agentflow",
            "--webhook-secret",
            "whsec_test",
            "verify",
            "--signature",
            "t=1,v1=00",
            "--payload",
            "{}",
            "--tolerance",
            "0",
        ]);
        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        let err = execute(config, cli.command).await.unwrap_err();

        assert!(matches!(err, RunError::InvalidInput { what: "--tolerance", .. }));
    }

    #[test]
    fn init_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentflow.toml");

        let output = init(&path).unwrap();

        assert!(output.contains("agentflow.toml"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("[client]"));
    }
}
