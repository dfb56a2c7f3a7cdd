//! 1-D linearization of a branch-acyclic network.
//!
//! The edge carrying the most patterns becomes the trunk and is laid along
//! the x axis from the origin. The layout then extends outwards from both
//! trunk ends: a lone continuing edge keeps the current row, and at a branch
//! point the first edge keeps the row while each further edge `i` moves to
//! row `y + i`. Each edge spans one unit more than the number of stops on
//! it.
//!
//! A vertex reached a second time means the network has a cycle. The branch
//! leading to it is left where it is and a [`LayoutWarning::Cycle`] is
//! recorded.

use indexmap::IndexSet;
use log::{debug, info};

use metroline_core::point::Point;

use crate::{
    error::{GraphError, LayoutWarning, Result},
    graph::{EdgeId, NetworkGraph, VertexId},
};

/// A vertex whose branches are still being laid out.
struct Extension {
    vertex: VertexId,
    direction: f64,
    y: f64,
    origin_x: f64,
    branches: Vec<EdgeId>,
    next: usize,
}

impl NetworkGraph {
    /// Lays the graph out as a 1-D line diagram and applies 1-D offsets.
    ///
    /// Does nothing on a graph without edges.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError`]s from the edge splits performed at branch
    /// points; these only occur if the graph is internally inconsistent.
    pub fn convert_to_1d(&mut self) -> Result<()> {
        let Some(trunk) = self.trunk_edge() else {
            return Ok(());
        };
        let edge = self.edges.get(&trunk).ok_or(GraphError::MissingEdge(trunk))?;
        let (from, to, stops) = (edge.from, edge.to, edge.stops.len());
        info!(trunk:% = trunk, patterns = edge.patterns.len(); "Converting to 1-D");

        let from_coord = self.vertex_coord(from)?;
        let to_coord = self.vertex_coord(to)?;
        let mut direction = to_coord.x() - from_coord.x();
        if direction == 0.0 {
            direction = to_coord.y() - from_coord.y();
        }

        let mut explored: IndexSet<VertexId> = [from, to].into_iter().collect();
        let length = (stops + 1) as f64;
        if direction > 0.0 {
            self.move_vertex(from, 0.0, 0.0)?;
            self.move_vertex(to, length, 0.0)?;
            self.extend_1d(trunk, from, -1.0, 0.0, &mut explored)?;
            self.extend_1d(trunk, to, 1.0, 0.0, &mut explored)?;
        } else {
            self.move_vertex(to, 0.0, 0.0)?;
            self.move_vertex(from, length, 0.0)?;
            self.extend_1d(trunk, from, 1.0, 0.0, &mut explored)?;
            self.extend_1d(trunk, to, -1.0, 0.0, &mut explored)?;
        }

        debug!(explored = explored.len(); "1-D extension finished");
        self.apply_1d_offsets();
        Ok(())
    }

    /// Lays out everything reachable from `vertex` other than through
    /// `edge`, moving in `direction` (`1.0` or `-1.0`) along row `y`.
    ///
    /// Branches are visited depth first in incident-edge order. `explored`
    /// holds the vertices already placed by this traversal.
    pub fn extend_1d(
        &mut self,
        edge: EdgeId,
        vertex: VertexId,
        direction: f64,
        y: f64,
        explored: &mut IndexSet<VertexId>,
    ) -> Result<()> {
        let mut stack = vec![self.extension(edge, vertex, direction, y)?];
        while let Some(frame) = stack.last_mut() {
            let Some(&branch) = frame.branches.get(frame.next) else {
                stack.pop();
                continue;
            };
            let index = frame.next;
            frame.next += 1;
            let lone = frame.branches.len() == 1;
            let Extension {
                vertex,
                direction,
                y,
                origin_x,
                ..
            } = *frame;

            let opposite = self.opposite_vertex(branch, vertex)?;
            if !explored.insert(opposite) {
                self.record_warning(LayoutWarning::Cycle {
                    vertex: opposite,
                    branch: !lone,
                });
                continue;
            }

            // The first branch continues the current row.
            if index == 0 {
                let span = self.stop_count(branch)? as f64 + 1.0;
                self.move_vertex(opposite, origin_x + span * direction, y)?;
                stack.push(self.extension(branch, opposite, direction, y)?);
                continue;
            }

            let branch_y = y + index as f64;
            let Some(stop) = self.take_near_stop(branch, vertex)? else {
                self.move_vertex(opposite, origin_x + direction, branch_y)?;
                continue;
            };

            let fork_x = origin_x + direction;
            let fork = self.add_vertex_at(stop, fork_x, branch_y);
            self.split_edge(branch, fork, vertex)?;

            let span = self.stop_count(branch)? as f64 + 1.0;
            self.move_vertex(opposite, fork_x + span * direction, branch_y)?;
            stack.push(self.extension(branch, opposite, direction, branch_y)?);
        }
        Ok(())
    }

    /// Pending branches of `vertex`, entered through `edge`.
    fn extension(
        &self,
        edge: EdgeId,
        vertex: VertexId,
        direction: f64,
        y: f64,
    ) -> Result<Extension> {
        let branches = self
            .vertices
            .get(&vertex)
            .ok_or(GraphError::MissingVertex(vertex))?
            .incident_edges(Some(edge));
        Ok(Extension {
            vertex,
            direction,
            y,
            origin_x: self.vertex_coord(vertex)?.x(),
            branches,
            next: 0,
        })
    }

    /// The edge with the most patterns, the first one on ties.
    fn trunk_edge(&self) -> Option<EdgeId> {
        let mut trunk = self.edges.keys().next().copied()?;
        let mut most = 0;
        for edge in self.edges.values() {
            if edge.patterns.len() > most {
                most = edge.patterns.len();
                trunk = edge.id;
            }
        }
        Some(trunk)
    }

    fn stop_count(&self, edge: EdgeId) -> Result<usize> {
        self.edges
            .get(&edge)
            .map(|e| e.stops.len())
            .ok_or(GraphError::MissingEdge(edge))
    }

    /// Removes the stop nearest `vertex` from `edge`.
    fn take_near_stop(
        &mut self,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Result<Option<Point>> {
        let found = self
            .edges
            .get_mut(&edge)
            .ok_or(GraphError::MissingEdge(edge))?;
        if found.stops.is_empty() {
            return Ok(None);
        }
        if found.from == vertex {
            Ok(Some(found.stops.remove(0)))
        } else {
            Ok(found.stops.pop())
        }
    }
}
