//! Metroline - Schematic metro-map layout for transit networks.
//!
//! A transit network is loaded into a [`NetworkGraph`] of stop vertices and
//! the edges between them, annotated with the patterns (service variants)
//! that run along each edge. The layout passes then turn the geographic
//! network into either a 1-D line diagram or a grid-snapped 2-D schematic,
//! with parallel lines bundled side by side.

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;

pub use metroline_core::{geometry, identifier, point};

pub use error::{GraphError, LayoutWarning, MetrolineError};
pub use graph::NetworkGraph;

use log::{debug, info};

use config::{LayoutConfig, LayoutMode};

/// Outcome of a layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSummary {
    mode: LayoutMode,
    vertices: usize,
    edges: usize,
    merged: usize,
    warnings: Vec<LayoutWarning>,
}

impl LayoutSummary {
    /// The pipeline that was run.
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Number of vertices after the layout.
    pub fn vertices(&self) -> usize {
        self.vertices
    }

    /// Number of edges after the layout.
    pub fn edges(&self) -> usize {
        self.edges
    }

    /// Number of transfer links collapsed into merged vertices.
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Non-fatal conditions recorded by the layout passes.
    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }
}

/// Runs the layout passes over a network graph.
///
/// # Examples
///
/// ```
/// use metroline::{NetworkGraph, SchematicBuilder, config::LayoutConfig, point::Point};
///
/// let mut graph = NetworkGraph::new();
/// let a = graph.add_vertex(Point::new("a", 52.50, 13.40));
/// let b = graph.add_vertex(Point::new("b", 52.51, 13.42));
/// let edge = graph.add_edge(Vec::new(), a, b).expect("both endpoints exist");
/// graph.add_pattern("u1", vec![edge]).expect("edge exists");
///
/// let builder = SchematicBuilder::new(LayoutConfig::default());
/// let summary = builder.layout(&mut graph).expect("layout succeeds");
/// assert_eq!(summary.edges(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SchematicBuilder {
    config: LayoutConfig,
}

impl SchematicBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `graph` in place.
    ///
    /// Short walking transfers are collapsed first when enabled. The linear
    /// mode then runs the 1-D conversion. The grid mode snaps vertices to
    /// the grid, applies 2-D bundle offsets and, when enabled, aligns edges
    /// around axial edges. Both modes finish by computing edge geometry.
    ///
    /// # Errors
    ///
    /// Returns [`MetrolineError::Config`] for an invalid configuration and
    /// [`MetrolineError::Graph`] if a pass finds the graph inconsistent.
    pub fn layout(&self, graph: &mut NetworkGraph) -> Result<LayoutSummary, MetrolineError> {
        self.config.validate()?;
        graph.set_config(self.config.clone());

        let mode = self.config.mode();
        info!(
            mode:? = mode,
            vertices = graph.vertex_count(),
            edges = graph.edge_count();
            "Starting layout"
        );

        let merged = if self.config.collapse_transfers() {
            graph.collapse_transfers(self.config.transfer_threshold())?
        } else {
            0
        };

        match mode {
            LayoutMode::Linear => {
                graph.convert_to_1d()?;
                graph.calculate_geometry(1.0)?;
            }
            LayoutMode::Grid => {
                let cell_size = self.config.cell_size();
                graph.snap_to_grid(cell_size)?;
                graph.apply_2d_offsets(cell_size)?;
                if self.config.optimize_curvature() {
                    graph.optimize_curvature();
                }
                graph.calculate_geometry(cell_size)?;
            }
        }
        debug!(comparisons = graph.bundle_comparisons().len(); "Bundling finished");

        let summary = LayoutSummary {
            mode,
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            merged,
            warnings: graph.warnings().to_vec(),
        };
        info!(
            vertices = summary.vertices,
            edges = summary.edges,
            merged,
            warnings = summary.warnings.len();
            "Layout finished"
        );
        Ok(summary)
    }
}
