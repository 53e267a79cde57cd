//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Service client section
    #[serde(default)]
    pub client: ClientSection,

    /// Inbound webhook section
    #[serde(default)]
    pub webhook: WebhookSection,
}

/// Service client section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Service base URL
    pub base_url: Option<String>,

    /// Bearer credential
    pub api_key: Option<String>,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt
    pub max_retries: Option<u32>,

    /// Log every attempt and retry decision
    #[serde(default)]
    pub debug: bool,

    /// Headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Inbound webhook section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Shared signing secret
    pub secret: Option<String>,

    /// Signature timestamp tolerance in seconds
    pub tolerance_secs: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# agentflow client configuration

[client]
# Service base URL (required for request and execute)
# base_url = "https://api.example.com/v1"

# Bearer credential (can also be set with AGENTFLOW_API_KEY)
# api_key = "your-key-here"

# Per-attempt timeout in milliseconds (default: 30000)
# timeout_ms = 30000

# Retries after the first attempt (default: 3)
# Delays double from 1s and are capped at 10s
# max_retries = 3

# Log every attempt, response, and retry decision
# debug = false

# Headers added to every request
# Note: --header CLI values replace same-named entries
# [client.headers]
# X-Team = "research"

[webhook]
# Shared secret for webhook signatures (required for sign and verify)
# secret = "whsec_..."

# Accepted clock skew for signature timestamps in seconds (default: 300)
# tolerance_secs = 300
"#
    .to_string()
}
