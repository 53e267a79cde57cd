//! agentflow: client for an AI agent workflow orchestration service.
//!
//! The crate sends requests through a retrying executor with typed error
//! classification, wraps the service's flow, agent, and webhook
//! resources, and verifies and dispatches signed webhook deliveries.
//!
//! # Layers
//!
//! - [`transport`]: one HTTP attempt behind the [`transport::HttpClient`] seam
//! - [`executor`]: retries, backoff, and [`error::ApiError`] classification
//! - [`api`]: typed operations on [`api::AgentFlowClient`]
//! - [`webhook`]: signatures, events, and handler dispatch
//! - [`config`]: CLI, TOML, and validated settings

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod time;
pub mod transport;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use api::AgentFlowClient;
pub use error::{ApiError, ErrorKind};
