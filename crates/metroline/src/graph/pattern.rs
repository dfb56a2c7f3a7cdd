use indexmap::IndexMap;

use metroline_core::identifier::Id;

use super::{EdgeId, NetworkGraph, VertexId};

/// Lateral offset assigned to a pattern on one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOffset {
    offset: f64,
    bundle_index: Option<usize>,
    bundled: bool,
}

impl EdgeOffset {
    pub fn new(offset: f64, bundle_index: Option<usize>, bundled: bool) -> Self {
        Self {
            offset,
            bundle_index,
            bundled,
        }
    }

    /// Distance from the edge centreline, in line-spacing units.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Position of the pattern within its bundle.
    pub fn bundle_index(&self) -> Option<usize> {
        self.bundle_index
    }

    pub fn is_bundled(&self) -> bool {
        self.bundled
    }
}

/// One transit line: the ordered list of graph edges it traverses.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) id: Id,
    pub(crate) graph_edges: Vec<EdgeId>,
    pub(crate) offsets: IndexMap<EdgeId, EdgeOffset>,
}

impl Pattern {
    pub(crate) fn new(id: Id, graph_edges: Vec<EdgeId>) -> Self {
        Self {
            id,
            graph_edges,
            offsets: IndexMap::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn graph_edges(&self) -> &[EdgeId] {
        &self.graph_edges
    }

    pub fn offset(&self, edge: EdgeId) -> Option<&EdgeOffset> {
        self.offsets.get(&edge)
    }

    pub fn offsets(&self) -> impl Iterator<Item = (EdgeId, &EdgeOffset)> {
        self.offsets.iter().map(|(edge, offset)| (*edge, offset))
    }

    /// Returns the edge this pattern takes after (or before) `edge` at
    /// `vertex`, if the pattern continues through that vertex.
    pub fn adjacent_edge(
        &self,
        graph: &NetworkGraph,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Option<EdgeId> {
        graph.adjacent_edge_in(&self.graph_edges, edge, vertex)
    }

    pub(crate) fn insert_edge(&mut self, index: usize, edge: EdgeId) {
        let index = index.min(self.graph_edges.len());
        self.graph_edges.insert(index, edge);
    }

    pub(crate) fn set_edge_offset(
        &mut self,
        edge: EdgeId,
        offset: f64,
        bundle_index: Option<usize>,
        bundled: bool,
    ) {
        self.offsets
            .insert(edge, EdgeOffset::new(offset, bundle_index, bundled));
    }

    pub(crate) fn detach_edge(&mut self, edge: EdgeId) {
        self.graph_edges.retain(|e| *e != edge);
        self.offsets.shift_remove(&edge);
    }
}
