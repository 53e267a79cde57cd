//! Process-level glue for the `agentflow` binary: exit statuses, the log
//! subscriber, and follow-up advice printed after configuration failures.

use agentflow::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Statuses the binary exits with.
pub mod exit_code {
    use std::process::ExitCode;

    /// The command did what was asked.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Settings were missing, unreadable, or rejected before any work began.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// The command started but failed: the service returned an error, the
    /// execution wait ran out, or a signature did not check out.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Suggests `agentflow init` when the failure looks like a missing setup.
pub fn print_config_hint(error: &ConfigError) {
    if suggests_template(error) {
        eprintln!("\nRun 'agentflow init' to write a configuration template you can fill in.");
    }
}

/// True when a fresh template would give the user somewhere to put the
/// missing value.
fn suggests_template(error: &ConfigError) -> bool {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            *f == field::BASE_URL || *f == field::WEBHOOK_SECRET
        }
        ConfigError::FileRead { .. } => true,
        _ => false,
    }
}

/// Installs the global log subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` when
/// `verbose` is on. Records are written to stderr so stdout carries only
/// command output.
pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
