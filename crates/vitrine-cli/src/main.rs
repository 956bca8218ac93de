//! Vitrine CLI
//!
//! Main entry point for the `vitrine` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use vitrine_common_async::{build_runtime, RuntimeConfig};
use vitrine_common_config::Environment;
use vitrine_common_log::{LogConfig, LogLevel};

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    NetworkError = 4,
    ValidationError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    Environment::init();
    let cli = Cli::parse();

    init_logging(&cli);

    let runtime = match build_runtime(RuntimeConfig::default()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            e.exit_code().into()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config).await
}

fn init_logging(cli: &Cli) {
    let mut config = LogConfig::from_env_or(LogLevel::Warn);
    if let Some(level) = verbosity_level(cli.verbose, cli.quiet) {
        config.level = level;
    }

    if let Err(e) = vitrine_common_log::init(config) {
        eprintln!("warning: {e}");
    }
}

/// Level selected by `-v`/`-q`, if either was given.
fn verbosity_level(verbose: u8, quiet: bool) -> Option<LogLevel> {
    match verbose {
        0 if quiet => Some(LogLevel::Error),
        0 => None,
        1 => Some(LogLevel::Info),
        2 => Some(LogLevel::Debug),
        _ => Some(LogLevel::Trace),
    }
}
