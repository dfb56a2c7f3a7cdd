//! Metroline CLI entry point.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use miette::GraphicalReportHandler;

use metroline_cli::{Args, CliError};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(args:?; "Parsed arguments");

    match metroline_cli::run(&args) {
        Ok(()) => {
            info!(output = args.output; "Layout finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render(&err));
            ExitCode::FAILURE
        }
    }
}

/// Sets up `env_logger` at `level`, or at `warn` if `level` is not a log
/// level name. `RUST_LOG` style settings in the environment still apply.
fn init_logging(level: &str) {
    let (filter, known) = match LevelFilter::from_str(level) {
        Ok(filter) => (filter, true),
        Err(_) => (LevelFilter::Warn, false),
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();

    if !known {
        warn!(level; "Unknown log level, using warn");
    }
}

/// Renders a failed run as a diagnostic report. Diagnostics are printed
/// even when logging is off.
fn render(err: &CliError) -> String {
    let mut report = String::new();
    match GraphicalReportHandler::new().render_report(&mut report, err) {
        Ok(()) => report,
        Err(_) => err.to_string(),
    }
}
