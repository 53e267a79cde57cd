//! agentflow: command-line client for the agent workflow orchestration service.
//!
//! Entry point for the agentflow binary.

use agentflow::config::{Cli, Command, ValidatedConfig};
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};
use run::RunError;

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Init must work even when the existing config file is broken
    if let Command::Init { output } = &cli.command {
        return report(run::init(output));
    }

    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    let debug = config.client.as_ref().is_some_and(|c| c.debug);
    setup_tracing(config.verbose || debug);
    tracing::debug!("{config}");

    run_application(config, cli.command)
}

/// Runs one command on a fresh runtime.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig, command: Command) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    report(runtime.block_on(run::execute(config, command)))
}

/// Prints the command output or error and picks the exit code.
fn report(result: Result<String, RunError>) -> ExitCode {
    match result {
        Ok(output) => {
            println!("{output}");
            exit_code::SUCCESS
        }
        Err(RunError::Config(e)) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            exit_code::CONFIG_ERROR
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::runtime_error()
        }
    }
}
