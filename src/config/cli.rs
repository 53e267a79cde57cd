//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// agentflow: client for the agent workflow orchestration service
///
/// Sends requests with retries, starts and waits on flow executions,
/// and signs or verifies webhook payloads.
#[derive(Debug, Parser)]
#[command(name = "agentflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Service base URL
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Bearer credential
    #[arg(long = "api-key", env = "AGENTFLOW_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub timeout: Option<u64>,

    /// Retries after the first attempt
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Shared secret for webhook signatures
    #[arg(long = "webhook-secret", global = true)]
    pub webhook_secret: Option<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log every attempt, response, and retry decision
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for agentflow
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "agentflow.toml")]
        output: PathBuf,
    },

    /// Send a raw request and print the JSON payload
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Path relative to the base URL, e.g. /agents
        path: String,

        /// JSON request body
        #[arg(long, value_name = "JSON")]
        data: Option<String>,

        /// Query parameter (can be specified multiple times)
        #[arg(long = "query", value_name = "K=V")]
        query: Vec<String>,
    },

    /// Start a flow execution
    Execute {
        /// Flow identifier
        flow_id: String,

        /// JSON input for the flow
        #[arg(long, value_name = "JSON")]
        input: Option<String>,

        /// Poll until the execution reaches a terminal status
        #[arg(long)]
        wait: bool,

        /// Give up waiting after this many seconds
        #[arg(long = "wait-timeout", value_name = "SECS", requires = "wait")]
        wait_timeout: Option<u64>,
    },

    /// Print a signature header for a payload
    Sign {
        /// Raw payload to sign
        #[arg(long)]
        payload: String,

        /// Unix timestamp in seconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Check a signature header against a payload
    Verify {
        /// Signature header, e.g. t=1700000000,v1=ab12...
        #[arg(long)]
        signature: String,

        /// Raw payload that was signed
        #[arg(long)]
        payload: String,

        /// Accepted clock skew in seconds
        #[arg(long, value_name = "SECS")]
        tolerance: Option<u64>,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }

    /// Returns true if the command talks to the service.
    #[must_use]
    pub const fn needs_client(&self) -> bool {
        matches!(
            self.command,
            Command::Request { .. } | Command::Execute { .. }
        )
    }
}
