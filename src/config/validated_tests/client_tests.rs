//! Tests for client settings validation.

use std::time::Duration;

use super::*;

mod required_fields {
    use super::*;

    #[test]
    fn missing_base_url_leaves_client_unset() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert!(config.client.is_none());
        assert!(matches!(
            config.require_client(),
            Err(ConfigError::MissingRequired {
                field: "base_url",
                ..
            })
        ));
    }

    #[test]
    fn base_url_from_cli_builds_client_with_defaults() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--base-url", "https://api.example.com/v1"]), None)
                .unwrap();

        let client = config.require_client().unwrap();
        assert_eq!(client.base_url.as_str(), "https://api.example.com/v1");
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(client.max_retries, 3);
        assert!(!client.debug);
        assert!(client.api_key.is_none());
    }
}

mod validation {
    use super::*;

    #[test]
    fn unparsable_base_url_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--base-url", "not a url"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--base-url", "ftp://example.com"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = ValidatedConfig::from_raw(
            &cli(&["--base-url", "https://api.example.com", "--timeout", "0"]),
            None,
        );

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected_without_base_url() {
        let result = ValidatedConfig::from_raw(&cli(&["--timeout", "0"]), None);

        assert!(result.is_err());
    }

    #[test]
    fn malformed_header_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--header", "no-separator"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidHeader { .. })));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--header", "Bad Name=value"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidHeaderName { .. })));
    }

    #[test]
    fn invalid_header_value_in_toml_is_rejected() {
        let toml = toml("[client.headers]\nX-Team = \"line\\nbreak\"");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidHeaderValue { .. })));
    }

    #[test]
    fn header_accepts_colon_format() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--base-url", "https://api.example.com", "--header", "X-Team: research"]),
            None,
        )
        .unwrap();

        assert_eq!(config.require_client().unwrap().headers["x-team"], "research");
    }
}

mod display {
    use super::*;

    #[test]
    fn display_hides_credentials() {
        let config = ValidatedConfig::from_raw(
            &cli(&[
                "--base-url",
                "https://api.example.com",
                "--api-key",
                "sk-secret",
                "--webhook-secret",
                "whsec_secret",
            ]),
            None,
        )
        .unwrap();

        let display = config.to_string();
        let debug = format!("{config:?}");

        for text in [&display, &debug] {
            assert!(!text.contains("sk-secret"));
            assert!(!text.contains("whsec_secret"));
        }
        assert!(display.contains("https://api.example.com"));
    }
}
