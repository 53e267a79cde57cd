//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::ValidatedConfig;

/// Helper to create CLI args from a slice; `sign` is used as a neutral subcommand
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["agentflow"];
    full_args.extend(args);
    full_args.extend(["sign", "--payload", "{}"]);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod client_tests;
mod webhook_tests;
