//! Layout passes over a [`NetworkGraph`](crate::graph::NetworkGraph).
//!
//! Each pass is an `impl NetworkGraph` block in its own module:
//!
//! - [`linear`] - Trunk-based 1-D linearization
//! - [`bundle`] - Pairwise bundle votes and lateral offsets (1-D and 2-D)
//! - [`grid`] - Grid snapping with local collision search
//! - [`curvature`] - Edge alignment at axial edges and final geometry
//!
//! A 1-D layout runs `convert_to_1d`, which applies the 1-D offsets itself.
//! A 2-D layout runs `snap_to_grid`, `apply_2d_offsets` and optionally
//! `optimize_curvature`. Both end with `calculate_geometry`.

pub mod bundle;
pub mod curvature;
pub mod grid;
pub mod linear;
