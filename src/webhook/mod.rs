//! Webhook security and dispatch.
//!
//! This module provides:
//! - Signature generation and verification ([`SignatureVerifier`],
//!   [`generate_signature`], [`verify_signature`])
//! - The event shape ([`WebhookEvent`], [`EventType`])
//! - Handler registration and fan-out ([`HandlerRegistry`], [`EventHandler`])
//! - Verified intake of raw deliveries ([`WebhookReceiver`])

mod error;
mod event;
mod receiver;
mod registry;
mod signature;

#[cfg(test)]
mod event_tests;

pub use error::WebhookError;
pub use event::{EventType, UnknownEventType, WebhookEvent};
pub use receiver::{Delivery, WebhookReceiver};
pub use registry::{
    DispatchOutcome, EventHandler, HandlerRegistry, HandlerResult, async_handler_fn, handler_fn,
};
pub use signature::{
    DEFAULT_TOLERANCE, SIGNATURE_HEADER, SignatureError, SignatureVerifier, generate_signature,
    sign_now, verify_signature,
};
