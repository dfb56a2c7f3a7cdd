//! Error types for Metroline operations.
//!
//! [`GraphError`] covers invalid references passed to graph operations. Every
//! operation that returns it leaves the graph untouched. [`MetrolineError`] is
//! the top-level error of the layout pipeline, and [`LayoutWarning`] records
//! non-fatal conditions a pass had to work around.

use std::fmt;

use thiserror::Error;

use metroline_core::{geometry::GridCoord, identifier::Id};

use crate::graph::{EdgeId, VertexId};

/// An operation referred to something that is not part of the graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("vertex {0} is not part of the graph")]
    MissingVertex(VertexId),

    #[error("edge {0} is not part of the graph")]
    MissingEdge(EdgeId),

    #[error("pattern `{0}` is not registered")]
    MissingPattern(Id),

    #[error("edge {edge} is not incident to vertex {vertex}")]
    NotIncident { edge: EdgeId, vertex: VertexId },

    #[error("cannot merge an empty set of vertices")]
    EmptyMerge,

    #[error("grid cell size must be a positive number, got {0}")]
    InvalidCellSize(f64),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// The main error type for the layout pipeline.
#[derive(Debug, Error)]
pub enum MetrolineError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A non-fatal condition recorded while laying out a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutWarning {
    /// A vertex was reached twice during 1-D extension; the branch leading
    /// to it was not laid out.
    Cycle { vertex: VertexId, branch: bool },

    /// No free grid cell was found around `cell`; the vertex shares it.
    GridSearchExhausted { vertex: VertexId, cell: GridCoord },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { vertex, branch } => {
                let place = if *branch { "branch" } else { "line" };
                write!(f, "cycle detected at vertex {vertex}; {place} skipped")
            }
            Self::GridSearchExhausted { vertex, cell } => write!(
                f,
                "no free grid cell near ({}, {}) for vertex {vertex}",
                cell.x(),
                cell.y()
            ),
        }
    }
}
