//! Edge alignment around axial edges and final edge geometry.

use log::{debug, trace};

use metroline_core::{geometry::Vector, identifier::Id};

use crate::{
    error::{GraphError, Result},
    graph::{EdgeId, NetworkGraph, SegmentKind, VertexId, compute_geometry},
};

/// How an incident edge is aligned against an axial edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlignMode {
    /// Same pattern: continue straight through the vertex.
    Continue,
    /// Other patterns: leave at a right angle.
    Perpendicular,
}

impl NetworkGraph {
    /// Fixes departure directions around horizontal and vertical edges.
    ///
    /// The first pass makes edges of the same transit pattern leave an
    /// axial edge's endpoints straight on. The second pass makes the
    /// remaining transit edges at those endpoints leave at a right angle.
    /// An edge is aligned at most once.
    pub fn optimize_curvature(&mut self) {
        let axial: Vec<EdgeId> = self
            .edges
            .keys()
            .copied()
            .filter(|edge| self.is_axial(*edge))
            .collect();

        for mode in [AlignMode::Continue, AlignMode::Perpendicular] {
            for &edge in &axial {
                for pattern in self.transit_patterns(edge) {
                    let Some((from, to)) = self.edges.get(&edge).map(|e| (e.from, e.to)) else {
                        continue;
                    };
                    self.align_incident_edges(from, edge, pattern, mode);
                    self.align_incident_edges(to, edge, pattern, mode);
                }
            }
        }

        let aligned = self.edges.values().filter(|e| e.aligned).count();
        debug!(axial = axial.len(), aligned; "Curvature optimized");
    }

    /// Computes the polyline of every edge from the current vertex
    /// positions and any aligned tangents.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidCellSize`] unless `cell_size` is a
    /// positive finite number.
    pub fn calculate_geometry(&mut self, cell_size: f64) -> Result<()> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GraphError::InvalidCellSize(cell_size));
        }

        let lines: Vec<(EdgeId, Vec<_>)> = self
            .edges
            .values()
            .filter_map(|edge| {
                let (from, to) = self.endpoint_coords(edge.id).ok()?;
                let line = compute_geometry(from, to, edge.from_tangent, edge.to_tangent, cell_size);
                Some((edge.id, line))
            })
            .collect();

        for (id, line) in lines {
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.geometry = line;
            }
        }
        trace!(edges = self.edges.len(); "Edge geometry calculated");
        Ok(())
    }

    /// Patterns of the transit segments drawn along `edge`.
    fn transit_patterns(&self, edge: EdgeId) -> Vec<Option<Id>> {
        let Some(edge) = self.edges.get(&edge) else {
            return Vec::new();
        };
        edge.segments
            .iter()
            .filter_map(|id| self.segments.get(id))
            .filter(|segment| segment.kind == SegmentKind::Transit)
            .map(|segment| segment.pattern)
            .collect()
    }

    fn align_incident_edges(
        &mut self,
        vertex: VertexId,
        in_edge: EdgeId,
        pattern: Option<Id>,
        mode: AlignMode,
    ) {
        let Ok(arrival) = self.vector_at(in_edge, vertex) else {
            return;
        };
        let direction: Vector = match mode {
            AlignMode::Continue => arrival,
            AlignMode::Perpendicular => arrival.perpendicular(),
        };
        let incident = match self.vertices.get(&vertex) {
            Some(found) => found.incident_edges(Some(in_edge)),
            None => return,
        };

        for edge in incident {
            let matches = self.edges.get(&edge).is_some_and(|found| {
                !found.aligned
                    && found.segments.iter().any(|id| {
                        self.segments.get(id).is_some_and(|segment| {
                            segment.kind == SegmentKind::Transit
                                && match mode {
                                    AlignMode::Continue => segment.pattern == pattern,
                                    AlignMode::Perpendicular => segment.pattern != pattern,
                                }
                        })
                    })
            });
            if matches {
                if let Some(found) = self.edges.get_mut(&edge) {
                    found.align(vertex, direction);
                    trace!(edge:% = edge, vertex:% = vertex; "Edge aligned");
                }
            }
        }
    }
}
