//! Command-line argument definitions for the Metroline CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the layout mode, and logging verbosity.

use clap::{Parser, ValueEnum};

use metroline::config::LayoutMode;

/// Command-line arguments for the Metroline layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input network description (TOML)
    #[arg(help = "Path to the input network file")]
    pub input: String,

    /// Path to the output layout file (TOML)
    #[arg(short, long, default_value = "layout.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout mode, overriding the configuration file
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Layout mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Trunk-based line diagram
    Linear,
    /// Grid-snapped network map
    Grid,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Linear => LayoutMode::Linear,
            ModeArg::Grid => LayoutMode::Grid,
        }
    }
}
