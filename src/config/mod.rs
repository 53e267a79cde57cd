//! Configuration layer for the agentflow client.
//!
//! This module provides:
//! - Client defaults and their update path ([`ClientConfig`], [`ConfigUpdate`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! `base_url` has no default: it must come from the CLI or the config file
//! for any command that talks to the service. The webhook secret is only
//! required by `sign` and `verify`.
//!
//! Headers are merged by name: TOML headers first, then `--header` values
//! from the CLI replace same-named entries.
//!
//! # Boolean Flag Semantics
//!
//! `--debug` uses OR semantics: if set `true` in either CLI or TOML, the
//! result is `true`.
//!
//! # Config File Discovery
//!
//! Without `--config`, `agentflow/config.toml` under the platform config
//! directory is used if it exists. A missing file there is not an error.

mod cli;
mod client;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use client::{ClientConfig, ConfigUpdate};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, WebhookSettings, write_default_config};
