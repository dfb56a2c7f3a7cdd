//! Grid snapping.
//!
//! Vertices are snapped one at a time, starting from the vertex nearest the
//! median of the graph and spreading outwards along edges. A vertex takes the
//! grid cell nearest to it unless that cell is already held by another
//! vertex or by the path of an edge whose endpoints are both snapped. In that
//! case the nearest free cell within the configured search radius is taken.
//! When every cell in the radius is taken, the vertex shares its own cell and
//! a [`LayoutWarning::GridSearchExhausted`] is recorded.

use std::collections::HashMap;

use log::{debug, info};

use metroline_core::{
    geometry::{Coord, GridCoord, GridEdge, median},
    queue::{OrderedFloat, PriorityQueue},
};

use crate::{
    error::{GraphError, LayoutWarning, Result},
    graph::{EdgeId, NetworkGraph, VertexId},
};

/// What holds a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Vertex(VertexId),
    Edge(EdgeId),
}

/// Grid cells taken so far during one snapping run.
pub type GridOccupancy = HashMap<GridCoord, Occupant>;

impl NetworkGraph {
    /// Moves every vertex onto the grid of the given cell size.
    ///
    /// The graph is recentered on its median first. Vertices are then
    /// ordered by distance from the median into
    /// [`ordered_vertices`](NetworkGraph::ordered_vertices), and snapping
    /// spreads from the nearest one. Vertices in other connected components
    /// are snapped afterwards in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidCellSize`] unless `cell_size` is a
    /// positive finite number.
    pub fn snap_to_grid(&mut self, cell_size: f64) -> Result<()> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GraphError::InvalidCellSize(cell_size));
        }
        self.cell_size = Some(cell_size);
        self.recenter();

        let mx = median(self.vertices.values().map(|v| v.x)).unwrap_or(0.0);
        let my = median(self.vertices.values().map(|v| v.y)).unwrap_or(0.0);

        let mut queue = PriorityQueue::min_first();
        for vertex in self.vertices.values_mut() {
            vertex.snapped = false;
            let distance = (vertex.x - mx).hypot(vertex.y - my);
            queue.enqueue(vertex.id, OrderedFloat(distance));
        }
        self.ordered_vertices = queue.collect();

        info!(vertices = self.ordered_vertices.len(), cell_size; "Snapping to grid");

        let mut occupancy = GridOccupancy::new();
        let mut components = 0;
        for vertex in self.ordered_vertices.clone() {
            if self.vertices.get(&vertex).is_some_and(|v| !v.snapped) {
                self.snap_vertex(vertex, None, &mut occupancy)?;
                components += 1;
            }
        }

        debug!(components, occupied = occupancy.len(); "Grid snapping finished");
        Ok(())
    }

    /// Snaps `vertex` and then every unsnapped vertex reachable from it.
    ///
    /// Neighbours are visited depth first in incident-edge order; the edge
    /// `in_edge` the vertex was reached by is not followed back. Does nothing
    /// if the vertex is already snapped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingVertex`] for an unknown vertex and
    /// [`GraphError::InvalidCellSize`] when the graph has no valid cell size.
    pub fn snap_vertex(
        &mut self,
        vertex: VertexId,
        in_edge: Option<EdgeId>,
        occupancy: &mut GridOccupancy,
    ) -> Result<()> {
        let cell_size = self
            .cell_size
            .filter(|size| size.is_finite() && *size > 0.0)
            .ok_or(GraphError::InvalidCellSize(self.cell_size.unwrap_or(0.0)))?;

        if !self.place_on_grid(vertex, cell_size, occupancy)? {
            return Ok(());
        }

        let mut stack = vec![(vertex, self.incident_except(vertex, in_edge), 0)];
        while let Some((current, edges, next)) = stack.last_mut() {
            let Some(&edge) = edges.get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;
            let current = *current;

            let opposite = self.opposite_vertex(edge, current)?;
            if self.place_on_grid(opposite, cell_size, occupancy)? {
                let edges = self.incident_except(opposite, Some(edge));
                stack.push((opposite, edges, 0));
            }
        }
        Ok(())
    }

    /// Cells strictly between the endpoints of `edge` on the grid path that
    /// joins them.
    pub fn edge_grid_points(&self, edge: EdgeId, cell_size: f64) -> Vec<GridCoord> {
        let path = self.edge_grid_path(edge, cell_size);
        if path.len() <= 2 {
            return Vec::new();
        }
        path[1..path.len() - 1].to_vec()
    }

    /// Unit grid steps along the grid path of `edge`.
    pub fn edge_grid_edges(&self, edge: EdgeId, cell_size: f64) -> Vec<GridEdge> {
        self.edge_grid_path(edge, cell_size)
            .windows(2)
            .map(|step| GridEdge::new(step[0], step[1]))
            .collect()
    }

    fn edge_grid_path(&self, edge: EdgeId, cell_size: f64) -> Vec<GridCoord> {
        match self.endpoint_coords(edge) {
            Ok((from, to)) => GridCoord::from_coord(from, cell_size)
                .path_to(GridCoord::from_coord(to, cell_size)),
            Err(_) => Vec::new(),
        }
    }

    /// Places one vertex and returns whether it was newly snapped.
    fn place_on_grid(
        &mut self,
        vertex: VertexId,
        cell_size: f64,
        occupancy: &mut GridOccupancy,
    ) -> Result<bool> {
        let found = self
            .vertices
            .get(&vertex)
            .ok_or(GraphError::MissingVertex(vertex))?;
        if found.snapped {
            return Ok(false);
        }

        let nearest = GridCoord::from_coord(found.coord(), cell_size);
        let cell = if occupancy.contains_key(&nearest) {
            match self.free_cell_near(nearest, occupancy) {
                Some(cell) => cell,
                None => {
                    self.record_warning(LayoutWarning::GridSearchExhausted {
                        vertex,
                        cell: nearest,
                    });
                    nearest
                }
            }
        } else {
            nearest
        };
        occupancy.insert(cell, Occupant::Vertex(vertex));

        let target: Coord = cell.to_coord(cell_size);
        let incident = match self.vertices.get_mut(&vertex) {
            Some(found) => {
                found.move_to(target.x(), target.y());
                found.snapped = true;
                found.edges.clone()
            }
            None => return Err(GraphError::MissingVertex(vertex)),
        };

        for edge in incident {
            let both_snapped = self.edges.get(&edge).is_some_and(|e| {
                [e.from, e.to]
                    .iter()
                    .all(|v| self.vertices.get(v).is_some_and(|v| v.snapped))
            });
            if both_snapped {
                for point in self.edge_grid_points(edge, cell_size) {
                    occupancy.insert(point, Occupant::Edge(edge));
                }
            }
        }
        Ok(true)
    }

    /// Nearest unoccupied cell within the search radius, excluding `centre`.
    fn free_cell_near(&self, centre: GridCoord, occupancy: &GridOccupancy) -> Option<GridCoord> {
        let radius = i64::from(self.config.snap_search_radius());
        let mut queue = PriorityQueue::min_first();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let distance = (dx as f64).hypot(dy as f64);
                queue.enqueue(centre.offset(dx, dy), OrderedFloat(distance));
            }
        }
        queue.find(|cell| !occupancy.contains_key(cell))
    }

    fn incident_except(&self, vertex: VertexId, edge: Option<EdgeId>) -> Vec<EdgeId> {
        self.vertices
            .get(&vertex)
            .map(|v| v.incident_edges(edge))
            .unwrap_or_default()
    }
}
