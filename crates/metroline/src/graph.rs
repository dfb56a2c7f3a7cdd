//! The network graph and its mutation primitives.
//!
//! [`NetworkGraph`] owns every vertex, edge, pattern and render segment in
//! insertion-ordered arenas. Vertices and edges are addressed by
//! [`VertexId`] / [`EdgeId`] handles that are never reused, so patterns and
//! segments can refer to edges without holding references into the graph.
//!
//! Iteration order is insertion order everywhere. Trunk selection, branch
//! numbering and bundle sorting all depend on it.
//!
//! # Example
//!
//! ```
//! # use metroline::graph::NetworkGraph;
//! # use metroline::point::Point;
//! let mut graph = NetworkGraph::new();
//! let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
//! let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 10.0, 0.0);
//! let edge = graph.add_edge(Vec::new(), a, b).unwrap();
//!
//! assert_eq!(graph.opposite_vertex(edge, a).unwrap(), b);
//! assert_eq!(graph.edge_length(edge).unwrap(), 10.0);
//! ```

mod edge;
mod merge;
mod pattern;
mod segment;
mod vertex;

pub use edge::Edge;
pub use pattern::{EdgeOffset, Pattern};
pub use segment::{RenderSegment, SegmentKind};
pub use vertex::Vertex;

pub(crate) use edge::compute_geometry;

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use metroline_core::{
    geometry::{Coord, GridEdge, Vector, lat_lon_to_spherical_mercator, median},
    identifier::Id,
    point::{Point, VertexPoint},
};

use crate::{
    config::LayoutConfig,
    error::{GraphError, LayoutWarning, Result},
    layout::bundle::BundleComparisons,
};

// =============================================================================
// Handles
// =============================================================================

/// Stable handle of a vertex within a [`NetworkGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stable handle of an edge within a [`NetworkGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// =============================================================================
// Network graph
// =============================================================================

/// The wireframe network being laid out.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    pub(crate) vertices: IndexMap<VertexId, Vertex>,
    pub(crate) edges: IndexMap<EdgeId, Edge>,
    pub(crate) patterns: IndexMap<Id, Pattern>,
    pub(crate) segments: IndexMap<Id, RenderSegment>,
    next_vertex: usize,
    next_edge: usize,
    pub(crate) bundle_comparisons: BundleComparisons,
    pub(crate) grid_edge_segments: IndexMap<GridEdge, Vec<Id>>,
    pub(crate) ordered_vertices: Vec<VertexId>,
    pub(crate) cell_size: Option<f64>,
    pub(crate) warnings: Vec<LayoutWarning>,
    pub(crate) config: LayoutConfig,
}

impl NetworkGraph {
    /// Creates an empty graph with the default layout configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph whose layout passes use `config`.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Adds a vertex positioned at the spherical-mercator projection of the
    /// point's latitude and longitude.
    pub fn add_vertex(&mut self, point: impl Into<VertexPoint>) -> VertexId {
        let point = point.into();
        let coord = lat_lon_to_spherical_mercator(point.lat(), point.lon());
        self.add_vertex_at(point, coord.x(), coord.y())
    }

    /// Adds a vertex at explicit planar coordinates.
    pub fn add_vertex_at(&mut self, point: impl Into<VertexPoint>, x: f64, y: f64) -> VertexId {
        let id = VertexId::new(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, Vertex::new(id, point.into(), x, y));
        trace!(vertex:% = id, x, y; "Vertex added");
        id
    }

    /// Adds an edge between two vertices of the graph.
    ///
    /// The edge's point array is the sequence of point identifiers from the
    /// `from` vertex through the stops to the `to` vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingVertex`] if either endpoint is not part of
    /// the graph; nothing is added in that case.
    pub fn add_edge(&mut self, stops: Vec<Point>, from: VertexId, to: VertexId) -> Result<EdgeId> {
        for endpoint in [from, to] {
            if !self.vertices.contains_key(&endpoint) {
                warn!(vertex:% = endpoint; "Edge endpoint is not part of the graph");
                return Err(GraphError::MissingVertex(endpoint));
            }
        }

        let mut point_array = self.point_ids(from);
        point_array.extend(stops.iter().map(Point::id));
        point_array.extend(self.point_ids(to));

        let id = EdgeId::new(self.next_edge);
        self.next_edge += 1;
        self.edges
            .insert(id, Edge::new(id, from, to, stops, point_array));
        self.attach_edge(from, id);
        if to != from {
            self.attach_edge(to, id);
        }
        trace!(edge:% = id, from:% = from, to:% = to; "Edge added");
        Ok(id)
    }

    /// Removes an edge from the graph.
    ///
    /// The edge is also dropped from its endpoints' incident lists and from
    /// every pattern and segment that traverses it. A segment left without
    /// edges stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEdge`] if the edge is not part of the graph.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<Edge> {
        let removed = self.edges.shift_remove(&edge).ok_or_else(|| {
            warn!(edge:% = edge; "Cannot remove an edge that is not part of the graph");
            GraphError::MissingEdge(edge)
        })?;

        for endpoint in [removed.from, removed.to] {
            if let Some(vertex) = self.vertices.get_mut(&endpoint) {
                vertex.detach_edge(edge);
            }
        }
        for pattern in &removed.patterns {
            if let Some(pattern) = self.patterns.get_mut(pattern) {
                pattern.detach_edge(edge);
            }
        }
        for segment in &removed.segments {
            if let Some(segment) = self.segments.get_mut(segment) {
                segment.detach_edge(edge);
            }
        }

        trace!(edge:% = edge; "Edge removed");
        Ok(removed)
    }

    /// Finds an edge from `from` to `to` whose point array equals
    /// `point_array` element by element.
    pub fn get_equivalent_edge(
        &self,
        point_array: &[Id],
        from: VertexId,
        to: VertexId,
    ) -> Option<EdgeId> {
        self.edges
            .values()
            .find(|edge| edge.from == from && edge.to == to && edge.point_array == point_array)
            .map(Edge::id)
    }

    /// Registers a pattern traversing `edges` in order.
    ///
    /// Each edge records the pattern, in registration order. Registering an
    /// identifier again replaces the earlier pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEdge`] if any edge is not part of the
    /// graph; nothing is registered in that case.
    pub fn add_pattern(&mut self, id: impl Into<Id>, edges: Vec<EdgeId>) -> Result<()> {
        let id = id.into();
        self.check_edges(&edges)?;

        if let Some(previous) = self.patterns.get(&id) {
            for edge in previous.graph_edges.clone() {
                if let Some(edge) = self.edges.get_mut(&edge) {
                    edge.patterns.retain(|p| *p != id);
                }
            }
        }

        for edge in &edges {
            if let Some(edge) = self.edges.get_mut(edge) {
                if !edge.patterns.contains(&id) {
                    edge.patterns.push(id);
                }
            }
        }
        debug!(pattern:% = id, edges = edges.len(); "Pattern registered");
        self.patterns.insert(id, Pattern::new(id, edges));
        Ok(())
    }

    /// Registers a render segment drawn over `edges` in order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEdge`] for an unknown edge, or
    /// [`GraphError::MissingPattern`] if the segment names a pattern that is
    /// not registered.
    pub fn add_segment(&mut self, mut segment: RenderSegment, edges: Vec<EdgeId>) -> Result<()> {
        self.check_edges(&edges)?;
        if let Some(pattern) = segment.pattern {
            if !self.patterns.contains_key(&pattern) {
                warn!(segment:% = segment.id, pattern:% = pattern; "Segment refers to an unknown pattern");
                return Err(GraphError::MissingPattern(pattern));
            }
        }

        let id = segment.id;
        for edge in &edges {
            if let Some(edge) = self.edges.get_mut(edge) {
                if !edge.segments.contains(&id) {
                    edge.segments.push(id);
                }
            }
        }
        segment.graph_edges = edges;
        trace!(segment:% = id, kind:% = segment.kind; "Segment registered");
        self.segments.insert(id, segment);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn pattern(&self, id: Id) -> Option<&Pattern> {
        self.patterns.get(&id)
    }

    pub fn segment(&self, id: Id) -> Option<&RenderSegment> {
        self.segments.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }

    pub fn segments(&self) -> impl Iterator<Item = &RenderSegment> {
        self.segments.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Pairwise bundle votes from the last offset pass.
    pub fn bundle_comparisons(&self) -> &BundleComparisons {
        &self.bundle_comparisons
    }

    /// Segments covering each grid step, from the last 2-D offset pass.
    pub fn grid_edge_segments(&self) -> &IndexMap<GridEdge, Vec<Id>> {
        &self.grid_edge_segments
    }

    /// Vertices by increasing distance from the median, from the last grid
    /// snap.
    pub fn ordered_vertices(&self) -> &[VertexId] {
        &self.ordered_vertices
    }

    /// Cell size used by the last grid snap.
    pub fn cell_size(&self) -> Option<f64> {
        self.cell_size
    }

    /// Non-fatal conditions recorded by layout passes.
    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns the endpoint of `edge` across from `vertex`.
    ///
    /// # Errors
    ///
    /// Fails if the edge is missing or does not touch `vertex`.
    pub fn opposite_vertex(&self, edge: EdgeId, vertex: VertexId) -> Result<VertexId> {
        let found = self.edges.get(&edge).ok_or(GraphError::MissingEdge(edge))?;
        found
            .opposite(vertex)
            .ok_or(GraphError::NotIncident { edge, vertex })
    }

    /// Straight-line distance between the endpoints of `edge`.
    pub fn edge_length(&self, edge: EdgeId) -> Result<f64> {
        let (from, to) = self.endpoint_coords(edge)?;
        Ok(from.distance(to))
    }

    /// Unit direction of travel along `edge` when arriving at `vertex`.
    ///
    /// A zero-length edge yields the zero vector.
    pub fn vector_at(&self, edge: EdgeId, vertex: VertexId) -> Result<Vector> {
        let opposite = self.opposite_vertex(edge, vertex)?;
        let here = self.vertex_coord(vertex)?;
        let there = self.vertex_coord(opposite)?;
        Ok(here.sub(there).normalize())
    }

    /// Checks whether `edge` runs along a horizontal or vertical line.
    pub fn is_axial(&self, edge: EdgeId) -> bool {
        self.endpoint_coords(edge)
            .map(|(from, to)| from.x() == to.x() || from.y() == to.y())
            .unwrap_or(false)
    }

    /// Finds the vertex whose point, or one of whose merged points, has the
    /// given identifier.
    pub fn vertex_for_point(&self, point: Id) -> Option<VertexId> {
        self.vertices
            .values()
            .find(|vertex| vertex.point.contains(point))
            .map(Vertex::id)
    }

    /// Edges joining `a` and `b` in either direction.
    pub fn edges_between(&self, a: VertexId, b: VertexId) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|edge| (edge.from == a && edge.to == b) || (edge.from == b && edge.to == a))
            .map(Edge::id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Inserts `new_vertex` between `edge` and `adjacent`.
    ///
    /// The end of `edge` at `adjacent` is moved to `new_vertex`, and a new
    /// stop-less edge joins `adjacent` and `new_vertex`. The new edge carries
    /// the patterns and segments of `edge` and is inserted into their edge
    /// lists next to `edge`, on the side facing `adjacent`.
    ///
    /// # Errors
    ///
    /// Fails without touching the graph if any handle is unknown or
    /// `adjacent` is not an endpoint of `edge`.
    pub fn split_edge(
        &mut self,
        edge: EdgeId,
        new_vertex: VertexId,
        adjacent: VertexId,
    ) -> Result<EdgeId> {
        let original = self.edges.get(&edge).ok_or(GraphError::MissingEdge(edge))?;
        for vertex in [new_vertex, adjacent] {
            if !self.vertices.contains_key(&vertex) {
                return Err(GraphError::MissingVertex(vertex));
            }
        }
        let adjacent_is_from = if original.from == adjacent {
            true
        } else if original.to == adjacent {
            false
        } else {
            warn!(edge:% = edge, vertex:% = adjacent; "Cannot split an edge at a vertex it does not touch");
            return Err(GraphError::NotIncident {
                edge,
                vertex: adjacent,
            });
        };

        // Work out every insertion before changing anything.
        let pattern_ids = original.patterns.clone();
        let segment_ids = original.segments.clone();
        let pattern_inserts: Vec<(Id, usize)> = pattern_ids
            .iter()
            .filter_map(|id| {
                let pattern = self.patterns.get(id)?;
                let index =
                    self.split_insert_index(&pattern.graph_edges, edge, adjacent, adjacent_is_from)?;
                Some((*id, index))
            })
            .collect();
        let segment_inserts: Vec<(Id, usize)> = segment_ids
            .iter()
            .filter_map(|id| {
                let segment = self.segments.get(id)?;
                let index =
                    self.split_insert_index(&segment.graph_edges, edge, adjacent, adjacent_is_from)?;
                Some((*id, index))
            })
            .collect();

        let new_edge = if adjacent_is_from {
            self.add_edge(Vec::new(), adjacent, new_vertex)?
        } else {
            self.add_edge(Vec::new(), new_vertex, adjacent)?
        };

        if let Some(original) = self.edges.get_mut(&edge) {
            original.replace_vertex(adjacent, new_vertex);
        }
        if let Some(created) = self.edges.get_mut(&new_edge) {
            created.patterns = pattern_ids;
            created.segments = segment_ids;
        }
        if let Some(vertex) = self.vertices.get_mut(&adjacent) {
            vertex.detach_edge(edge);
        }
        if let Some(vertex) = self.vertices.get_mut(&new_vertex) {
            vertex.edges = vec![new_edge, edge];
        }
        for (id, index) in pattern_inserts {
            if let Some(pattern) = self.patterns.get_mut(&id) {
                pattern.insert_edge(index, new_edge);
            }
        }
        for (id, index) in segment_inserts {
            if let Some(segment) = self.segments.get_mut(&id) {
                let index = index.min(segment.graph_edges.len());
                segment.graph_edges.insert(index, new_edge);
            }
        }

        debug!(edge:% = edge, new_edge:% = new_edge, vertex:% = new_vertex; "Edge split");
        Ok(new_edge)
    }

    /// Subtracts the median x and median y from every vertex.
    pub fn recenter(&mut self) {
        let mx = median(self.vertices.values().map(|v| v.x));
        let my = median(self.vertices.values().map(|v| v.y));
        let (Some(mx), Some(my)) = (mx, my) else {
            return;
        };

        for vertex in self.vertices.values_mut() {
            vertex.x -= mx;
            vertex.y -= my;
        }
        debug!(median_x = mx, median_y = my; "Graph recentered");
    }

    /// Restores every vertex to its position before layout.
    pub fn reset_coordinates(&mut self) {
        for vertex in self.vertices.values_mut() {
            vertex.x = vertex.orig_x;
            vertex.y = vertex.orig_y;
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Returns the entry of `sequence` next to `edge` that also touches
    /// `vertex`, looking at the preceding entry first.
    pub(crate) fn adjacent_edge_in(
        &self,
        sequence: &[EdgeId],
        edge: EdgeId,
        vertex: VertexId,
    ) -> Option<EdgeId> {
        let index = sequence.iter().position(|e| *e == edge)?;
        let previous = index.checked_sub(1).map(|i| sequence[i]);
        let next = sequence.get(index + 1).copied();
        [previous, next]
            .into_iter()
            .flatten()
            .find(|candidate| self.edge_touches(*candidate, vertex))
    }

    pub(crate) fn vertex_coord(&self, vertex: VertexId) -> Result<Coord> {
        self.vertices
            .get(&vertex)
            .map(Vertex::coord)
            .ok_or(GraphError::MissingVertex(vertex))
    }

    pub(crate) fn endpoint_coords(&self, edge: EdgeId) -> Result<(Coord, Coord)> {
        let found = self.edges.get(&edge).ok_or(GraphError::MissingEdge(edge))?;
        Ok((self.vertex_coord(found.from)?, self.vertex_coord(found.to)?))
    }

    pub(crate) fn move_vertex(&mut self, vertex: VertexId, x: f64, y: f64) -> Result<()> {
        let found = self
            .vertices
            .get_mut(&vertex)
            .ok_or(GraphError::MissingVertex(vertex))?;
        found.move_to(x, y);
        Ok(())
    }

    pub(crate) fn record_warning(&mut self, warning: LayoutWarning) {
        warn!(warning:% = warning; "Layout degraded");
        self.warnings.push(warning);
    }

    fn edge_touches(&self, edge: EdgeId, vertex: VertexId) -> bool {
        self.edges
            .get(&edge)
            .is_some_and(|found| found.touches(vertex))
    }

    fn split_insert_index(
        &self,
        sequence: &[EdgeId],
        edge: EdgeId,
        adjacent: VertexId,
        adjacent_is_from: bool,
    ) -> Option<usize> {
        let index = sequence.iter().position(|e| *e == edge)?;
        let before = index
            .checked_sub(1)
            .is_some_and(|i| self.edge_touches(sequence[i], adjacent));
        let after = sequence
            .get(index + 1)
            .is_some_and(|next| self.edge_touches(*next, adjacent));

        if before || (!after && adjacent_is_from) {
            Some(index)
        } else {
            Some(index + 1)
        }
    }

    fn point_ids(&self, vertex: VertexId) -> Vec<Id> {
        match self.vertices.get(&vertex).map(Vertex::point) {
            Some(VertexPoint::Single(point)) => vec![point.id()],
            Some(VertexPoint::Multi(multi)) => multi.points().iter().map(Point::id).collect(),
            None => Vec::new(),
        }
    }

    fn attach_edge(&mut self, vertex: VertexId, edge: EdgeId) {
        if let Some(vertex) = self.vertices.get_mut(&vertex) {
            vertex.edges.push(edge);
        }
    }

    fn check_edges(&self, edges: &[EdgeId]) -> Result<()> {
        match edges.iter().find(|edge| !self.edges.contains_key(*edge)) {
            Some(missing) => {
                warn!(edge:% = missing; "Edge is not part of the graph");
                Err(GraphError::MissingEdge(*missing))
            }
            None => Ok(()),
        }
    }
}
