//! Agent management operations.

use crate::error::ApiError;
use crate::time::Sleeper;
use crate::transport::HttpClient;

use super::types::Listing;
use super::{Agent, AgentFlowClient, AgentRegistration, path_segment, to_body};

impl<H: HttpClient, S: Sleeper> AgentFlowClient<H, S> {
    /// Registers a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails; field problems reported
    /// by the service are in [`ApiError::validation_errors`].
    pub async fn register_agent(&self, registration: &AgentRegistration) -> Result<Agent, ApiError> {
        let body = to_body(registration)?;
        self.executor.post("/agents", body).await?.json()
    }

    /// Lists registered agents.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        let listing: Listing<Agent> = self.executor.get("/agents").await?.json()?;
        Ok(listing.into_vec())
    }

    /// Fetches one agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError> {
        let agent_id = path_segment("Agent", agent_id)?;
        self.executor.get(&format!("/agents/{agent_id}")).await?.json()
    }

    /// Deregisters an agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<(), ApiError> {
        let agent_id = path_segment("Agent", agent_id)?;
        self.executor.delete(&format!("/agents/{agent_id}")).await?;
        Ok(())
    }
}
