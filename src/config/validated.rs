//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use url::Url;

use super::cli::Cli;
use super::client::ClientConfig;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Client settings; `None` when no base URL was provided
    pub client: Option<ClientConfig>,

    /// Inbound webhook settings
    pub webhook: WebhookSettings,

    /// Config file the values were read from, if any
    pub config_path: Option<PathBuf>,

    /// Verbose logging enabled
    pub verbose: bool,
}

/// Settings for signing and verifying webhook payloads.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Shared signing secret
    pub secret: Option<String>,

    /// Accepted clock skew for signature timestamps
    pub tolerance: Duration,
}

impl fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSettings")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config_str = self
            .config_path
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());

        match &self.client {
            Some(client) => write!(f, "{client}")?,
            None => write!(f, "Client {{ unconfigured }}")?,
        }
        write!(
            f,
            ", Webhook {{ secret: {}, tolerance: {}s }}, config_file: {}",
            if self.webhook.secret.is_some() { "set" } else { "unset" },
            self.webhook.tolerance.as_secs(),
            config_str,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL is invalid or not http(s)
    /// - Duration values are zero
    /// - Header format, name, or value is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let client = Self::resolve_client(cli, toml)?;
        let webhook = Self::resolve_webhook(cli, toml)?;

        Ok(Self {
            client,
            webhook,
            config_path: None,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path. Otherwise
    /// `agentflow/config.toml` under the platform config directory is used
    /// when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let discovered = dirs::config_dir().map(|dir| {
            dir.join(defaults::CONFIG_DIR)
                .join(defaults::CONFIG_FILE)
        });
        Self::load_from(cli, discovered.as_deref())
    }

    /// Like [`ValidatedConfig::load`] with an explicit fallback location.
    ///
    /// # Errors
    ///
    /// See [`ValidatedConfig::load`].
    pub fn load_from(cli: &Cli, fallback: Option<&Path>) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(|| fallback.filter(|p| p.is_file()).map(Path::to_path_buf));

        let toml = match &path {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                Some(TomlConfig::load(path)?)
            }
            None => None,
        };

        let mut config = Self::from_raw(cli, toml.as_ref())?;
        config.config_path = path;
        Ok(config)
    }

    /// Returns the client settings, or an error naming how to supply them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if no base URL was provided.
    pub fn require_client(&self) -> Result<&ClientConfig, ConfigError> {
        self.client.as_ref().ok_or_else(|| {
            ConfigError::missing(
                field::BASE_URL,
                "Use --base-url or set client.base_url in config file",
            )
        })
    }

    /// Returns the webhook secret, or an error naming how to supply it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if no secret was provided.
    pub fn require_secret(&self) -> Result<&str, ConfigError> {
        self.webhook.secret.as_deref().ok_or_else(|| {
            ConfigError::missing(
                field::WEBHOOK_SECRET,
                "Use --webhook-secret or set webhook.secret in config file",
            )
        })
    }

    fn resolve_client(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<ClientConfig>, ConfigError> {
        let section = toml.map(|t| &t.client);

        // Validate the rest even without a base URL so mistakes surface early
        let timeout = Self::resolve_timeout(cli, toml)?;
        let headers = Self::resolve_headers(cli, toml)?;

        let Some(url_str) = cli
            .base_url
            .as_deref()
            .or_else(|| section.and_then(|s| s.base_url.as_deref()))
        else {
            return Ok(None);
        };

        let base_url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        let max_retries = cli
            .retries
            .or_else(|| section.and_then(|s| s.max_retries))
            .unwrap_or(defaults::MAX_RETRIES);

        let mut client = ClientConfig::new(base_url)?
            .with_timeout(timeout)?
            .with_max_retries(max_retries)
            .with_debug(cli.debug || section.is_some_and(|s| s.debug));

        if let Some(api_key) = cli
            .api_key
            .as_deref()
            .or_else(|| section.and_then(|s| s.api_key.as_deref()))
        {
            client = client.with_api_key(api_key);
        }
        client.headers = headers;

        Ok(Some(client))
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let millis = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.client.timeout_ms))
            .unwrap_or(defaults::TIMEOUT_MS);

        if millis == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_millis(millis))
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // Add TOML headers first (CLI can override)
        if let Some(toml) = toml {
            for (name, value) in &toml.client.headers {
                let header_name = parse_header_name(name)?;
                let header_value = parse_header_value(name, value)?;
                headers.insert(header_name, header_value);
            }
        }

        // Add CLI headers (override TOML)
        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            let header_name = parse_header_name(&name)?;
            let header_value = parse_header_value(&name, &value)?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    fn resolve_webhook(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<WebhookSettings, ConfigError> {
        let section = toml.map(|t| &t.webhook);

        let secret = cli
            .webhook_secret
            .clone()
            .or_else(|| section.and_then(|s| s.secret.clone()));

        let tolerance_secs = section
            .and_then(|s| s.tolerance_secs)
            .unwrap_or(defaults::TOLERANCE_SECS);

        if tolerance_secs == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "webhook.tolerance_secs",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(WebhookSettings {
            secret,
            tolerance: Duration::from_secs(tolerance_secs),
        })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
