//! Process-wide client defaults and their explicit update path.

use std::fmt;
use std::time::Duration;

use http::HeaderMap;
use url::Url;

use super::ConfigError;
use super::defaults;

/// Defaults applied to every request the client makes.
///
/// Created once when the client is constructed. The executor never
/// mutates it in place: [`ClientConfig::updated`] produces a new snapshot
/// that the owner installs explicitly, so a request in flight keeps the
/// values it started with.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service base URL; request paths are appended to it
    pub base_url: Url,
    /// Bearer credential sent as `Authorization: Bearer <key>`
    pub api_key: Option<String>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Log every attempt, response, and retry decision
    pub debug: bool,
    /// Headers added to every request
    pub headers: HeaderMap,
}

/// Fields to change on a [`ClientConfig`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    /// New service base URL; must be http(s)
    pub base_url: Option<Url>,
    /// New bearer credential
    pub api_key: Option<String>,
    /// New per-attempt timeout; must be non-zero
    pub timeout: Option<Duration>,
    /// New retry count after the first attempt
    pub max_retries: Option<u32>,
    /// Turns per-attempt logging on or off
    pub debug: Option<bool>,
    /// Merged into the existing headers, replacing same-named entries
    pub headers: HeaderMap,
}

impl ClientConfig {
    /// Creates a configuration with default timeout and retries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] unless `base_url` is http(s).
    pub fn new(base_url: Url) -> Result<Self, ConfigError> {
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            api_key: None,
            timeout: defaults::timeout(),
            max_retries: defaults::MAX_RETRIES,
            debug: false,
            headers: HeaderMap::new(),
        })
    }

    /// Sets the bearer credential.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enables or disables per-attempt debug logging.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the per-attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if `timeout` is zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        validate_timeout(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Returns a new snapshot with `update` applied.
    ///
    /// `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated base URL or timeout is invalid.
    pub fn updated(&self, update: ConfigUpdate) -> Result<Self, ConfigError> {
        let mut next = self.clone();

        if let Some(base_url) = update.base_url {
            validate_base_url(&base_url)?;
            next.base_url = base_url;
        }
        if let Some(api_key) = update.api_key {
            next.api_key = Some(api_key);
        }
        if let Some(timeout) = update.timeout {
            validate_timeout(timeout)?;
            next.timeout = timeout;
        }
        if let Some(max_retries) = update.max_retries {
            next.max_retries = max_retries;
        }
        if let Some(debug) = update.debug {
            next.debug = debug;
        }

        let mut last_name = None;
        for (name, value) in update.headers {
            // HeaderMap yields `None` for repeated values of the same name.
            if let Some(name) = name {
                next.headers.remove(&name);
                last_name = Some(name);
            }
            if let Some(name) = &last_name {
                next.headers.append(name.clone(), value);
            }
        }

        Ok(next)
    }
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::InvalidDuration {
            field: "timeout",
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("debug", &self.debug)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Client {{ base_url: {}, auth: {}, timeout: {}ms, retries: {}, debug: {}, headers: {} }}",
            self.base_url,
            if self.api_key.is_some() { "bearer" } else { "none" },
            self.timeout.as_millis(),
            self.max_retries,
            self.debug,
            self.headers.len(),
        )
    }
}
