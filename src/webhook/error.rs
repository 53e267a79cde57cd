//! Error types for inbound webhook handling.

use thiserror::Error;

use super::SignatureError;

/// Why an inbound delivery was not dispatched.
///
/// Handler failures never appear here; dispatch contains them.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header was rejected.
    #[error("Webhook signature rejected: {0}")]
    Signature(#[from] SignatureError),

    /// The body is not a valid webhook event.
    #[error("Invalid webhook payload: {0}")]
    Decode(#[from] serde_json::Error),
}
