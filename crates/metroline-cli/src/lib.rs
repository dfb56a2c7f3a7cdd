//! CLI logic for the Metroline layout tool.
//!
//! Reads a TOML network description, lays it out with
//! [`SchematicBuilder`], and writes the result as TOML.

pub mod error;
pub mod network;
pub mod output;

mod args;
mod config;

pub use args::{Args, ModeArg};
pub use error::CliError;

use std::fs;

use log::{info, warn};

use metroline::SchematicBuilder;

use network::NetworkFile;
use output::LayoutFile;

/// Run the Metroline CLI application
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or inconsistent network files
/// - Layout errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing network"
    );

    let app_config = config::load_config(args.config.as_ref(), args.mode.map(Into::into))?;

    let source = fs::read_to_string(&args.input)?;
    let mut graph = NetworkFile::parse(&source)?.build_graph()?;

    let builder = SchematicBuilder::new(app_config.layout().clone());
    let summary = builder.layout(&mut graph)?;
    for warning in summary.warnings() {
        warn!(warning:% = warning; "Layout warning");
    }

    let layout = LayoutFile::new(&graph, &summary);
    fs::write(&args.output, layout.to_toml()?)?;

    info!(output_file = args.output; "Layout written successfully");

    Ok(())
}
