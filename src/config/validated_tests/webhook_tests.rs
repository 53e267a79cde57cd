//! Tests for webhook settings.

use std::time::Duration;

use super::*;

#[test]
fn tolerance_defaults_to_five_minutes() {
    let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

    assert_eq!(config.webhook.tolerance, Duration::from_secs(300));
    assert!(config.webhook.secret.is_none());
}

#[test]
fn missing_secret_is_reported() {
    let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

    assert!(matches!(
        config.require_secret(),
        Err(ConfigError::MissingRequired {
            field: "webhook.secret",
            ..
        })
    ));
}

#[test]
fn secret_and_tolerance_from_toml() {
    let toml = toml("[webhook]\nsecret = \"whsec_toml\"\ntolerance_secs = 60");
    let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

    assert_eq!(config.require_secret().unwrap(), "whsec_toml");
    assert_eq!(config.webhook.tolerance, Duration::from_secs(60));
}

#[test]
fn cli_secret_overrides_toml() {
    let toml = toml("[webhook]\nsecret = \"whsec_toml\"");
    let config =
        ValidatedConfig::from_raw(&cli(&["--webhook-secret", "whsec_cli"]), Some(&toml)).unwrap();

    assert_eq!(config.require_secret().unwrap(), "whsec_cli");
}

#[test]
fn zero_tolerance_is_rejected() {
    let toml = toml("[webhook]\ntolerance_secs = 0");
    let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

    assert!(matches!(
        result,
        Err(ConfigError::InvalidDuration {
            field: "webhook.tolerance_secs",
            ..
        })
    ));
}
