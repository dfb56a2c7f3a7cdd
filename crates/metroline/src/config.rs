//! Configuration types for Metroline layout passes.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from TOML
//! by the CLI; every field falls back to its default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`LayoutConfig`] - Parameters of the layout pipeline.
//! - [`LayoutMode`] - Which layout pipeline to run.
//!
//! # Example
//!
//! ```
//! # use metroline::config::{LayoutConfig, LayoutMode};
//! let config = LayoutConfig::default();
//! assert_eq!(config.mode(), LayoutMode::Grid);
//! assert_eq!(config.line_spacing(), 1.2);
//! assert_eq!(config.snap_search_radius(), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::MetrolineError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Replaces the layout mode, keeping all other settings.
    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.layout.mode = mode;
        self
    }
}

/// The layout pipeline to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Trunk-based 1-D line diagram.
    Linear,
    /// Grid-snapped 2-D diagram.
    #[default]
    Grid,
}

/// Parameters of the layout pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pipeline to run.
    mode: LayoutMode,

    /// Grid cell size, in layout units, for grid snapping.
    cell_size: f64,

    /// Lateral distance between neighbouring lines of a bundle.
    line_spacing: f64,

    /// Walk links shorter than this many meters are collapsed.
    transfer_threshold: f64,

    /// Radius, in cells, searched for a free cell on snap collisions.
    snap_search_radius: u32,

    /// Whether to collapse short walking transfers before layout.
    collapse_transfers: bool,

    /// Whether to run the curvature pass after grid snapping.
    optimize_curvature: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Grid,
            cell_size: 100.0,
            line_spacing: 1.2,
            transfer_threshold: 200.0,
            snap_search_radius: 3,
            collapse_transfers: true,
            optimize_curvature: true,
        }
    }
}

impl LayoutConfig {
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn line_spacing(&self) -> f64 {
        self.line_spacing
    }

    pub fn transfer_threshold(&self) -> f64 {
        self.transfer_threshold
    }

    pub fn snap_search_radius(&self) -> u32 {
        self.snap_search_radius
    }

    pub fn collapse_transfers(&self) -> bool {
        self.collapse_transfers
    }

    pub fn optimize_curvature(&self) -> bool {
        self.optimize_curvature
    }

    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_transfer_threshold(mut self, threshold: f64) -> Self {
        self.transfer_threshold = threshold;
        self
    }

    pub fn with_snap_search_radius(mut self, radius: u32) -> Self {
        self.snap_search_radius = radius;
        self
    }

    pub fn with_collapse_transfers(mut self, enabled: bool) -> Self {
        self.collapse_transfers = enabled;
        self
    }

    pub fn with_optimize_curvature(mut self, enabled: bool) -> Self {
        self.optimize_curvature = enabled;
        self
    }

    /// Checks that numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`MetrolineError::Config`] when the cell size or line spacing
    /// is not a positive finite number, or the transfer threshold is negative.
    pub fn validate(&self) -> Result<(), MetrolineError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MetrolineError::Config(format!(
                "cell_size must be a positive number, got {}",
                self.cell_size
            )));
        }
        if !(self.line_spacing.is_finite() && self.line_spacing > 0.0) {
            return Err(MetrolineError::Config(format!(
                "line_spacing must be a positive number, got {}",
                self.line_spacing
            )));
        }
        if self.transfer_threshold.is_nan() || self.transfer_threshold < 0.0 {
            return Err(MetrolineError::Config(format!(
                "transfer_threshold must not be negative, got {}",
                self.transfer_threshold
            )));
        }
        Ok(())
    }
}
