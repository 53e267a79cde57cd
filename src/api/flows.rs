//! Flow execution operations.

use std::time::Duration;

use serde_json::json;

use crate::error::ApiError;
use crate::executor::{ApiRequest, RetryPolicy, classify};
use crate::time::Sleeper;
use crate::transport::HttpClient;

use super::{AgentFlowClient, Execution, path_segment};

/// How long and how often [`AgentFlowClient::wait_for_execution`] polls.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOptions {
    /// Give up once this much time has been spent between polls
    pub timeout: Duration,
    /// Delay curve between polls
    pub poll_policy: RetryPolicy,
}

impl WaitOptions {
    /// Default overall wait (5 minutes).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Polls from 1s, doubling up to 30s, for at most five minutes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            poll_policy: RetryPolicy::polling(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_poll_policy(mut self, policy: RetryPolicy) -> Self {
        self.poll_policy = policy;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HttpClient, S: Sleeper> AgentFlowClient<H, S> {
    /// Starts an execution of `flow_id` with `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn execute_flow(
        &self,
        flow_id: &str,
        input: serde_json::Value,
    ) -> Result<Execution, ApiError> {
        let flow_id = path_segment("Flow", flow_id)?;
        let request =
            ApiRequest::post(format!("/flows/{flow_id}/execute")).with_body(json!({ "input": input }));
        self.executor.execute(request).await?.json()
    }

    /// Fetches the current state of an execution.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn get_execution(&self, execution_id: &str) -> Result<Execution, ApiError> {
        let execution_id = path_segment("Execution", execution_id)?;
        self.executor
            .get(&format!("/executions/{execution_id}"))
            .await?
            .json()
    }

    /// Asks the service to cancel an execution.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn cancel_execution(&self, execution_id: &str) -> Result<Execution, ApiError> {
        let execution_id = path_segment("Execution", execution_id)?;
        self.executor
            .execute(ApiRequest::post(format!("/executions/{execution_id}/cancel")))
            .await?
            .json()
    }

    /// Polls an execution until it completes, fails, or is cancelled.
    ///
    /// The deadline counts time spent sleeping between polls; each poll is
    /// itself an executor request with its own timeout and retries.
    ///
    /// # Errors
    ///
    /// Returns a timeout-kind [`ApiError`] if the execution is still running
    /// when `options.timeout` is used up, or the error of a failed poll.
    pub async fn wait_for_execution(
        &self,
        execution_id: &str,
        options: &WaitOptions,
    ) -> Result<Execution, ApiError> {
        let mut waited = Duration::ZERO;
        let mut poll: u32 = 0;

        loop {
            let execution = self.get_execution(execution_id).await?;
            if execution.status.is_terminal() {
                tracing::debug!(
                    execution_id,
                    status = ?execution.status,
                    polls = u64::from(poll) + 1,
                    "Execution finished"
                );
                return Ok(execution);
            }

            let remaining = options.timeout.saturating_sub(waited);
            if remaining.is_zero() {
                return Err(classify::deadline_exceeded(
                    &format!("Execution {execution_id}"),
                    waited,
                ));
            }

            let delay = options.poll_policy.delay_for_retry(poll).min(remaining);
            tracing::debug!(
                execution_id,
                status = ?execution.status,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Execution still running"
            );
            self.executor.sleeper().sleep(delay).await;
            waited += delay;
            poll = poll.saturating_add(1);
        }
    }
}
