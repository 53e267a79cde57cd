//! Verified intake of inbound deliveries.

use std::sync::Arc;

use crate::time::{Clock, SystemClock};

use super::{DispatchOutcome, HandlerRegistry, SignatureVerifier, WebhookError, WebhookEvent};

/// A delivery that passed verification and was dispatched.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// The decoded event, with its signature attached
    pub event: WebhookEvent,
    /// What the handlers did with it
    pub outcome: DispatchOutcome,
}

/// Verifies, decodes, and dispatches raw webhook requests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use agentflow::webhook::{HandlerRegistry, SignatureVerifier, WebhookReceiver};
///
/// let registry = Arc::new(HandlerRegistry::new());
/// let receiver = WebhookReceiver::new(SignatureVerifier::new("whsec_test"), Arc::clone(&registry));
/// ```
#[derive(Debug)]
pub struct WebhookReceiver<C = SystemClock> {
    verifier: SignatureVerifier<C>,
    registry: Arc<HandlerRegistry>,
}

impl<C: Clock> WebhookReceiver<C> {
    /// Creates a receiver dispatching into `registry`.
    #[must_use]
    pub const fn new(verifier: SignatureVerifier<C>, registry: Arc<HandlerRegistry>) -> Self {
        Self { verifier, registry }
    }

    /// Returns the registry deliveries are dispatched into.
    #[must_use]
    pub const fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Handles one delivery: `signature` is the raw signature header and
    /// `body` the raw request body it was computed over.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError`] if the signature is rejected or the body is
    /// not a webhook event. Handler failures are logged by dispatch and
    /// reported in the returned [`DispatchOutcome`] instead.
    pub async fn receive(&self, signature: &str, body: &[u8]) -> Result<Delivery, WebhookError> {
        if let Err(e) = self.verifier.verify(signature, body) {
            tracing::warn!("Rejected webhook delivery: {e}");
            return Err(e.into());
        }

        let mut event: WebhookEvent = serde_json::from_slice(body)?;
        event.signature = Some(signature.to_string());

        tracing::debug!(
            event_type = %event.event,
            event_id = %event.id,
            attempt = event.attempt,
            "Dispatching webhook event"
        );
        let outcome = self.registry.dispatch(&event).await;

        Ok(Delivery { event, outcome })
    }
}
