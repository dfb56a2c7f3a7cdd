//! Vertex merging and walk-transfer collapsing.

use indexmap::IndexSet;
use log::{debug, info, warn};

use metroline_core::point::MultiPoint;

use super::{EdgeId, NetworkGraph, SegmentKind, Vertex, VertexId};
use crate::error::{GraphError, Result};

impl NetworkGraph {
    /// Replaces a set of vertices with a single vertex at their mean position.
    ///
    /// The merged vertex carries a multipoint of every input point, in input
    /// order. Edges joining two input vertices are removed; every other
    /// incident edge is repointed at the merged vertex. The input vertices
    /// are kept on the merged vertex as [`Vertex::old_vertices`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyMerge`] for an empty set and
    /// [`GraphError::MissingVertex`] for an unknown vertex; the graph is left
    /// untouched in both cases.
    pub fn merge_vertices(&mut self, vertices: &[VertexId]) -> Result<VertexId> {
        if vertices.is_empty() {
            return Err(GraphError::EmptyMerge);
        }
        let members: IndexSet<VertexId> = vertices.iter().copied().collect();
        if let Some(missing) = members.iter().find(|v| !self.vertices.contains_key(*v)) {
            warn!(vertex:% = missing; "Cannot merge a vertex that is not part of the graph");
            return Err(GraphError::MissingVertex(*missing));
        }

        let incident: IndexSet<EdgeId> = members
            .iter()
            .filter_map(|v| self.vertices.get(v))
            .flat_map(|vertex| vertex.edges.iter().copied())
            .collect();
        let internal: Vec<EdgeId> = incident
            .iter()
            .copied()
            .filter(|edge| {
                self.edges.get(edge).is_some_and(|edge| {
                    members.contains(&edge.from) && members.contains(&edge.to)
                })
            })
            .collect();
        for edge in &internal {
            self.remove_edge(*edge)?;
        }

        let merged_id = VertexId::new(self.next_vertex);
        self.next_vertex += 1;

        let mut old_vertices: Vec<Vertex> = members
            .iter()
            .filter_map(|v| self.vertices.shift_remove(v))
            .collect();
        let count = old_vertices.len() as f64;
        let x = old_vertices.iter().map(|v| v.x).sum::<f64>() / count;
        let y = old_vertices.iter().map(|v| v.y).sum::<f64>() / count;

        let mut multi = MultiPoint::new();
        for vertex in &old_vertices {
            multi.add_point(vertex.point.clone());
        }

        let mut merged = Vertex::new(merged_id, multi.into(), x, y);
        for edge_id in incident.iter().filter(|e| !internal.contains(*e)) {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                for old in &members {
                    edge.replace_vertex(*old, merged_id);
                }
                merged.edges.push(*edge_id);
            }
        }
        for vertex in &mut old_vertices {
            vertex.edges.clear();
        }
        merged.old_vertices = old_vertices;

        debug!(
            vertex:% = merged_id,
            members = members.len(),
            removed_edges = internal.len();
            "Vertices merged"
        );
        self.vertices.insert(merged_id, merged);
        Ok(merged_id)
    }

    /// Merges the endpoints of every short walking link.
    ///
    /// An edge is collapsed when it is no longer than `threshold`, neither
    /// endpoint holds a journey origin or destination, and every segment
    /// drawn along it is a walk. An edge without segments qualifies.
    ///
    /// Returns the number of merges performed.
    pub fn collapse_transfers(&mut self, threshold: f64) -> Result<usize> {
        let candidates: Vec<EdgeId> = self.edges.keys().copied().collect();
        let mut merged = 0;

        for edge_id in candidates {
            let Some(edge) = self.edges.get(&edge_id) else {
                continue;
            };
            let (from, to) = (edge.from, edge.to);
            if from == to || self.edge_length(edge_id)? > threshold {
                continue;
            }

            let has_journey_end = [from, to].iter().any(|v| {
                self.vertices.get(v).is_some_and(|vertex| {
                    vertex.point.contains_from_point() || vertex.point.contains_to_point()
                })
            });
            if has_journey_end {
                continue;
            }

            let all_walk = edge.segments.iter().all(|segment| {
                self.segments
                    .get(segment)
                    .is_none_or(|segment| segment.kind == SegmentKind::Walk)
            });
            if all_walk {
                self.merge_vertices(&[from, to])?;
                merged += 1;
            }
        }

        info!(threshold, merged; "Transfers collapsed");
        Ok(merged)
    }
}
