//! Webhook subscription operations.

use crate::error::ApiError;
use crate::time::Sleeper;
use crate::transport::HttpClient;

use super::types::Listing;
use super::{AgentFlowClient, Webhook, WebhookSubscription, path_segment, to_body};

impl<H: HttpClient, S: Sleeper> AgentFlowClient<H, S> {
    /// Subscribes a URL to event deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the subscription is empty or the request fails.
    pub async fn create_webhook(&self, subscription: &WebhookSubscription) -> Result<Webhook, ApiError> {
        if subscription.events.is_empty() {
            return Err(crate::executor::classify::invalid_request(
                "Webhook subscription needs at least one event type",
            ));
        }
        let body = to_body(subscription)?;
        self.executor.post("/webhooks", body).await?.json()
    }

    /// Lists webhook subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>, ApiError> {
        let listing: Listing<Webhook> = self.executor.get("/webhooks").await?.json()?;
        Ok(listing.into_vec())
    }

    /// Removes a webhook subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the id is unusable or the request fails.
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), ApiError> {
        let webhook_id = path_segment("Webhook", webhook_id)?;
        self.executor.delete(&format!("/webhooks/{webhook_id}")).await?;
        Ok(())
    }
}
