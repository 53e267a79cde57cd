//! Command execution.
//!
//! Each subcommand resolves into one function that returns the text to
//! print; `main` owns printing and exit codes.

use std::path::Path;
use std::time::Duration;

use http::Method;
use thiserror::Error;

use agentflow::api::{AgentFlowClient, Execution, WaitOptions};
use agentflow::config::{Command, ConfigError, ValidatedConfig, write_default_config};
use agentflow::error::ApiError;
use agentflow::executor::ApiRequest;
use agentflow::time::Sleeper;
use agentflow::transport::HttpClient;
use agentflow::webhook::{SignatureError, generate_signature, sign_now, verify_signature};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Settings were missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The service request failed after classification and retries.
    #[error("Request failed: {0}")]
    Api(#[from] ApiError),

    /// A signature could not be produced or was rejected.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// A command argument could not be interpreted.
    #[error("Invalid {what}: {reason}")]
    InvalidInput { what: &'static str, reason: String },

    /// The result could not be rendered as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Runs one command against the validated configuration.
///
/// # Errors
///
/// Returns [`RunError`] describing the first failure.
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<String, RunError> {
    match command {
        Command::Init { output } => init(&output),
        Command::Request {
            method,
            path,
            data,
            query,
        } => {
            let client = AgentFlowClient::new(config.require_client()?.clone());
            let request = build_request(&method, path, data.as_deref(), &query)?;
            request_command(&client, request).await
        }
        Command::Execute {
            flow_id,
            input,
            wait,
            wait_timeout,
        } => {
            let client = AgentFlowClient::new(config.require_client()?.clone());
            let input = parse_json("--input", input.as_deref())?;
            let wait = wait.then(|| wait_options(wait_timeout));
            let execution = execute_command(&client, &flow_id, input, wait.as_ref()).await?;
            render(&execution)
        }
        Command::Sign { payload, timestamp } => {
            sign_command(config.require_secret()?, timestamp, &payload)
        }
        Command::Verify {
            signature,
            payload,
            tolerance,
        } => {
            let tolerance = match tolerance {
                Some(0) => {
                    return Err(RunError::InvalidInput {
                        what: "--tolerance",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Some(secs) => Duration::from_secs(secs),
                None => config.webhook.tolerance,
            };
            verify_command(config.require_secret()?, &signature, &payload, tolerance)
        }
    }
}

/// Writes the configuration template to `output`.
pub fn init(output: &Path) -> Result<String, RunError> {
    write_default_config(output)?;
    Ok(format!(
        "Configuration template written to: {}",
        output.display()
    ))
}

/// Sends a raw request and renders its JSON payload.
async fn request_command<H: HttpClient, S: Sleeper>(
    client: &AgentFlowClient<H, S>,
    request: ApiRequest,
) -> Result<String, RunError> {
    let response = client.request(request).await?;
    tracing::debug!(status = response.status.as_u16(), "Request succeeded");
    render(&response.data)
}

/// Starts a flow and, when `wait` is set, polls it to completion.
async fn execute_command<H: HttpClient, S: Sleeper>(
    client: &AgentFlowClient<H, S>,
    flow_id: &str,
    input: serde_json::Value,
    wait: Option<&WaitOptions>,
) -> Result<Execution, RunError> {
    let execution = client.execute_flow(flow_id, input).await?;
    tracing::info!(execution_id = %execution.id, status = ?execution.status, "Execution started");

    let Some(options) = wait else {
        return Ok(execution);
    };
    if execution.status.is_terminal() {
        return Ok(execution);
    }

    let finished = client.wait_for_execution(&execution.id, options).await?;
    tracing::info!(execution_id = %finished.id, status = ?finished.status, "Execution finished");
    Ok(finished)
}

fn sign_command(secret: &str, timestamp: Option<i64>, payload: &str) -> Result<String, RunError> {
    let header = match timestamp {
        Some(t) => generate_signature(secret, t, payload.as_bytes())?,
        None => sign_now(secret, payload.as_bytes())?,
    };
    Ok(header)
}

fn verify_command(
    secret: &str,
    signature: &str,
    payload: &str,
    tolerance: Duration,
) -> Result<String, RunError> {
    verify_signature(signature, payload.as_bytes(), secret, tolerance)?;
    Ok("Signature valid".to_string())
}

fn build_request(
    method: &str,
    path: String,
    data: Option<&str>,
    query: &[String],
) -> Result<ApiRequest, RunError> {
    let method = parse_method(method)?;
    if !path.starts_with('/') {
        return Err(RunError::InvalidInput {
            what: "path",
            reason: format!("'{path}' must start with '/'"),
        });
    }

    let mut request = ApiRequest::new(method, path);
    if let Some(data) = data {
        request = request.with_body(parse_json("--data", Some(data))?);
    }
    for pair in query {
        let (name, value) = pair.split_once('=').ok_or_else(|| RunError::InvalidInput {
            what: "--query",
            reason: format!("'{pair}' is not in K=V format"),
        })?;
        request = request.with_query(name.trim(), value.trim());
    }
    Ok(request)
}

fn parse_method(method: &str) -> Result<Method, RunError> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(RunError::InvalidInput {
            what: "method",
            reason: format!("'{method}' (expected GET, POST, PUT, PATCH or DELETE)"),
        }),
    }
}

/// Parses an optional JSON argument; absent means an empty object.
fn parse_json(what: &'static str, raw: Option<&str>) -> Result<serde_json::Value, RunError> {
    raw.map_or_else(
        || Ok(serde_json::json!({})),
        |raw| {
            serde_json::from_str(raw).map_err(|e| RunError::InvalidInput {
                what,
                reason: e.to_string(),
            })
        },
    )
}

fn wait_options(timeout_secs: Option<u64>) -> WaitOptions {
    let options = WaitOptions::default();
    match timeout_secs {
        Some(secs) => options.with_timeout(Duration::from_secs(secs)),
        None => options,
    }
}

fn render<T: serde::Serialize>(value: &T) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(value)?)
}
