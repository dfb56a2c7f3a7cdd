use metroline_core::{geometry::Coord, point::VertexPoint};

use super::{EdgeId, VertexId};

/// A node of the network graph.
///
/// A vertex lists the edges incident to it in insertion order; it does not
/// own them. The list never names an edge that is missing from the graph.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) point: VertexPoint,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) orig_x: f64,
    pub(crate) orig_y: f64,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) snapped: bool,
    pub(crate) old_vertices: Vec<Vertex>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, point: VertexPoint, x: f64, y: f64) -> Self {
        Self {
            id,
            point,
            x,
            y,
            orig_x: x,
            orig_y: y,
            edges: Vec::new(),
            snapped: false,
            old_vertices: Vec::new(),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn point(&self) -> &VertexPoint {
        &self.point
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// Position before the first layout pass.
    pub fn orig(&self) -> Coord {
        Coord::new(self.orig_x, self.orig_y)
    }

    /// Incident edges in insertion order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped
    }

    /// Vertices this one was merged from, empty unless it came from a merge.
    pub fn old_vertices(&self) -> &[Vertex] {
        &self.old_vertices
    }

    /// Incident edges other than `except`, in insertion order.
    pub fn incident_edges(&self, except: Option<EdgeId>) -> Vec<EdgeId> {
        self.edges
            .iter()
            .copied()
            .filter(|edge| Some(*edge) != except)
            .collect()
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn detach_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|e| *e != edge);
    }
}

#[cfg(test)]
mod tests {
    use metroline_core::point::Point;

    use super::*;

    #[test]
    fn test_incident_edges_skips_excluded() {
        let mut vertex = Vertex::new(
            VertexId::new(0),
            Point::new("a", 0.0, 0.0).into(),
            1.0,
            2.0,
        );
        vertex.edges = vec![EdgeId::new(3), EdgeId::new(5), EdgeId::new(8)];

        assert_eq!(
            vertex.incident_edges(Some(EdgeId::new(5))),
            vec![EdgeId::new(3), EdgeId::new(8)]
        );
        assert_eq!(vertex.incident_edges(None).len(), 3);

        vertex.move_to(7.0, 7.0);
        assert_eq!(vertex.orig(), Coord::new(1.0, 2.0));
        assert_eq!(vertex.coord(), Coord::new(7.0, 7.0));
    }
}
