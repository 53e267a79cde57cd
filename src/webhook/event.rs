//! Webhook event shape and the closed set of event types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event types the service delivers, plus the wildcard.
///
/// [`EventType::Any`] is only meaningful as a registration key: handlers
/// registered under it see every dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "execution.started")]
    ExecutionStarted,
    #[serde(rename = "execution.completed")]
    ExecutionCompleted,
    #[serde(rename = "execution.failed")]
    ExecutionFailed,
    #[serde(rename = "execution.cancelled")]
    ExecutionCancelled,
    #[serde(rename = "agent.registered")]
    AgentRegistered,
    #[serde(rename = "agent.updated")]
    AgentUpdated,
    #[serde(rename = "agent.deregistered")]
    AgentDeregistered,
    #[serde(rename = "webhook.test")]
    WebhookTest,
    /// Wildcard
    #[serde(rename = "*")]
    Any,
}

impl EventType {
    /// Every concrete (non-wildcard) type.
    pub const CONCRETE: [Self; 8] = [
        Self::ExecutionStarted,
        Self::ExecutionCompleted,
        Self::ExecutionFailed,
        Self::ExecutionCancelled,
        Self::AgentRegistered,
        Self::AgentUpdated,
        Self::AgentDeregistered,
        Self::WebhookTest,
    ];

    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExecutionStarted => "execution.started",
            Self::ExecutionCompleted => "execution.completed",
            Self::ExecutionFailed => "execution.failed",
            Self::ExecutionCancelled => "execution.cancelled",
            Self::AgentRegistered => "agent.registered",
            Self::AgentUpdated => "agent.updated",
            Self::AgentDeregistered => "agent.deregistered",
            Self::WebhookTest => "webhook.test",
            Self::Any => "*",
        }
    }

    /// Returns true for the wildcard.
    #[must_use]
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no known event type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown event type '{0}'")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::Any.as_str() {
            return Ok(Self::Any);
        }
        Self::CONCRETE
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// One webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Unique event identifier
    pub id: String,
    /// Event type
    pub event: EventType,
    /// Event payload
    pub data: serde_json::Value,
    /// When the event was produced
    pub timestamp: DateTime<Utc>,
    /// Subscription that produced the delivery
    pub webhook_id: String,
    /// Delivery attempt, starting at 1
    pub attempt: u32,
    /// Signature header the delivery arrived with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl WebhookEvent {
    /// Creates a local event with a fresh id, the current time, and
    /// `attempt = 1`.
    #[must_use]
    pub fn new(event: EventType, webhook_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            data,
            timestamp: Utc::now(),
            webhook_id: webhook_id.into(),
            attempt: 1,
            signature: None,
        }
    }
}
