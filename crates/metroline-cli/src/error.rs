//! Error type for the Metroline CLI.
//!
//! [`CliError`] implements [`miette::Diagnostic`] so `main` can render it
//! with miette's graphical report handler.

use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use metroline::{GraphError, MetrolineError};

/// Errors raised while loading, laying out, or writing a network.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(metroline::io))]
    Io(#[from] io::Error),

    #[error("Failed to parse network file: {0}")]
    #[diagnostic(
        code(metroline::input),
        help("the input lists [[stops]], [[edges]], [[patterns]] and optional [[segments]]")
    )]
    Input(#[from] toml::de::Error),

    #[error("Failed to serialize layout: {0}")]
    #[diagnostic(code(metroline::output))]
    Output(#[from] toml::ser::Error),

    #[error("Failed to parse TOML configuration: {0}")]
    #[diagnostic(code(metroline::config))]
    Config(String),

    #[error("Missing configuration file: {0}")]
    #[diagnostic(code(metroline::config))]
    MissingConfig(PathBuf),

    #[error("Invalid network: {0}")]
    #[diagnostic(code(metroline::network))]
    Network(String),

    #[error("Graph error: {0}")]
    #[diagnostic(code(metroline::graph))]
    Graph(#[from] GraphError),

    #[error("Layout failed: {0}")]
    #[diagnostic(code(metroline::layout))]
    Layout(#[from] MetrolineError),
}
