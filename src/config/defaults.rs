//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default per-attempt request timeout in milliseconds.
pub const TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Default webhook signature tolerance window in seconds.
pub const TOLERANCE_SECS: u64 = 300;

/// Config file name looked up under the platform config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Application directory under the platform config directory.
pub const CONFIG_DIR: &str = "agentflow";

/// Default per-attempt timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_millis(TIMEOUT_MS)
}

/// Default signature tolerance as Duration.
#[must_use]
pub const fn tolerance() -> Duration {
    Duration::from_secs(TOLERANCE_SECS)
}
