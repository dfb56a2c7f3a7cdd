use metroline_core::{
    geometry::{Coord, GridEdge, Vector},
    identifier::Id,
    point::Point,
};

use super::{EdgeId, VertexId};

/// A connection between two vertices carrying one or more patterns.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) from: VertexId,
    pub(crate) to: VertexId,
    pub(crate) stops: Vec<Point>,
    pub(crate) point_array: Vec<Id>,
    pub(crate) patterns: Vec<Id>,
    pub(crate) segments: Vec<Id>,
    pub(crate) aligned: bool,
    pub(crate) from_tangent: Option<Vector>,
    pub(crate) to_tangent: Option<Vector>,
    pub(crate) grid_edges: Vec<GridEdge>,
    pub(crate) geometry: Vec<Coord>,
}

impl Edge {
    pub(crate) fn new(
        id: EdgeId,
        from: VertexId,
        to: VertexId,
        stops: Vec<Point>,
        point_array: Vec<Id>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            stops,
            point_array,
            patterns: Vec::new(),
            segments: Vec::new(),
            aligned: false,
            from_tangent: None,
            to_tangent: None,
            grid_edges: Vec::new(),
            geometry: Vec::new(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from(&self) -> VertexId {
        self.from
    }

    pub fn to(&self) -> VertexId {
        self.to
    }

    /// Stops lying on the edge between its endpoints.
    pub fn stops(&self) -> &[Point] {
        &self.stops
    }

    /// Geometric identity key of the edge.
    pub fn point_array(&self) -> &[Id] {
        &self.point_array
    }

    /// Patterns traversing this edge, in bundling priority order.
    pub fn patterns(&self) -> &[Id] {
        &self.patterns
    }

    /// Render segments drawn along this edge.
    pub fn segments(&self) -> &[Id] {
        &self.segments
    }

    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    /// Grid steps covered by the edge, filled in by the 2-D bundler.
    pub fn grid_edges(&self) -> &[GridEdge] {
        &self.grid_edges
    }

    /// Polyline computed by the last geometry pass.
    pub fn geometry(&self) -> &[Coord] {
        &self.geometry
    }

    /// Departure direction fixed at `vertex` by the curvature pass.
    pub fn tangent_at(&self, vertex: VertexId) -> Option<Vector> {
        if vertex == self.from {
            self.from_tangent
        } else if vertex == self.to {
            self.to_tangent
        } else {
            None
        }
    }

    pub fn touches(&self, vertex: VertexId) -> bool {
        self.from == vertex || self.to == vertex
    }

    /// Returns the endpoint across from `vertex`, or `None` if the edge does
    /// not touch it.
    pub fn opposite(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.from {
            Some(self.to)
        } else if vertex == self.to {
            Some(self.from)
        } else {
            None
        }
    }

    pub(crate) fn replace_vertex(&mut self, old: VertexId, new: VertexId) {
        if self.from == old {
            self.from = new;
        }
        if self.to == old {
            self.to = new;
        }
    }

    /// Fixes the direction in which the edge leaves `vertex`.
    pub(crate) fn align(&mut self, vertex: VertexId, direction: Vector) {
        let direction = direction.normalize();
        if vertex == self.from {
            self.from_tangent = Some(direction);
        } else if vertex == self.to {
            self.to_tangent = Some(direction);
        } else {
            return;
        }
        self.aligned = true;
    }
}

/// Builds the polyline of an edge running from `from` to `to`.
///
/// When a departure tangent is fixed at either end, the line leaves that end
/// along the tangent and bends once into a 45 degree run to the other end.
/// The `from` tangent is tried first. A tangent that points away from the
/// other end, or runs straight at it, gives a plain segment.
pub(crate) fn compute_geometry(
    from: Coord,
    to: Coord,
    from_tangent: Option<Vector>,
    to_tangent: Option<Vector>,
    cell_size: f64,
) -> Vec<Coord> {
    if let Some(elbow) = from_tangent.and_then(|t| elbow_point(from, to, t, cell_size)) {
        return vec![from, elbow, to];
    }
    if let Some(elbow) = to_tangent.and_then(|t| elbow_point(to, from, t, cell_size)) {
        return vec![from, elbow, to];
    }
    vec![from, to]
}

fn elbow_point(start: Coord, end: Coord, tangent: Vector, cell_size: f64) -> Option<Coord> {
    let delta = end.sub(start);
    if tangent.length() == 0.0 || tangent.is_parallel(delta) {
        return None;
    }

    let along = delta.dot(tangent);
    let across = delta.cross(tangent).abs();
    let run = along - across;
    if run <= 0.0 {
        return None;
    }

    let elbow = start.translate(tangent.scale(run));
    let axial = tangent.x() == 0.0 || tangent.y() == 0.0;
    if axial && cell_size > 0.0 {
        Some(elbow.quantize(cell_size))
    } else {
        Some(elbow)
    }
}
