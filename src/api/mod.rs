//! Typed wrappers over the request executor.
//!
//! Every operation here is one executor call (or, for
//! [`AgentFlowClient::wait_for_execution`], a bounded series of them), so
//! retries, classification, and headers behave exactly as for raw
//! requests.

mod agents;
mod flows;
mod types;
mod webhooks;

#[cfg(test)]
mod webhooks_tests;

use serde::Serialize;

use crate::config::{ClientConfig, ConfigError, ConfigUpdate};
use crate::error::ApiError;
use crate::executor::{ApiRequest, ApiResponse, RequestExecutor, classify};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, ReqwestClient};

pub use flows::WaitOptions;
pub use types::{
    Agent, AgentRegistration, Execution, ExecutionStatus, Webhook, WebhookSubscription,
};

/// Client for the orchestration service.
///
/// # Example
///
/// ```no_run
/// use agentflow::api::AgentFlowClient;
/// use agentflow::config::ClientConfig;
/// use url::Url;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new(Url::parse("https://api.example.com/v1")?)?
///     .with_api_key("sk-...");
/// let client = AgentFlowClient::new(config);
///
/// let execution = client
///     .execute_flow("flow-1", serde_json::json!({"topic": "rust"}))
///     .await?;
/// println!("started {}", execution.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AgentFlowClient<H = ReqwestClient, S = TokioSleeper> {
    executor: RequestExecutor<H, S>,
}

impl AgentFlowClient<ReqwestClient, TokioSleeper> {
    /// Creates a client backed by reqwest.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::from_executor(RequestExecutor::new(ReqwestClient::new(), config))
    }
}

impl<H, S> AgentFlowClient<H, S> {
    /// Wraps an existing executor.
    #[must_use]
    pub const fn from_executor(executor: RequestExecutor<H, S>) -> Self {
        Self { executor }
    }

    /// Returns the underlying executor.
    #[must_use]
    pub const fn executor(&self) -> &RequestExecutor<H, S> {
        &self.executor
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    /// Installs a new configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the update is invalid.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<&ClientConfig, ConfigError> {
        self.executor.update_config(update)
    }
}

impl<H: HttpClient, S: Sleeper> AgentFlowClient<H, S> {
    /// Sends a raw request through the executor.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the last attempt.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.executor.execute(request).await
    }
}

/// Validates an identifier before it is spliced into a path.
fn path_segment<'a>(what: &str, id: &'a str) -> Result<&'a str, ApiError> {
    if id.is_empty() {
        return Err(classify::invalid_request(format!("{what} id must not be empty")));
    }
    if id
        .chars()
        .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(classify::invalid_request(format!(
            "{what} id '{id}' contains characters not allowed in a path segment"
        )));
    }
    Ok(id)
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| classify::invalid_request(format!("Unserializable request body: {e}")))
}
