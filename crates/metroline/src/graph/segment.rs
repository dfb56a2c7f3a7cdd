use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use metroline_core::{
    geometry::{Axis, GridEdge},
    identifier::Id,
};

use super::{EdgeId, NetworkGraph, VertexId};

/// What a render segment depicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// A ride on a transit pattern.
    #[default]
    Transit,
    /// A walking link.
    Walk,
    Other,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Transit => write!(f, "TRANSIT"),
            SegmentKind::Walk => write!(f, "WALK"),
            SegmentKind::Other => write!(f, "OTHER"),
        }
    }
}

/// A drawable run of one pattern (or walk) over consecutive graph edges.
///
/// # Examples
///
/// ```
/// # use metroline::graph::{RenderSegment, SegmentKind};
/// let walk = RenderSegment::new("transfer-1", SegmentKind::Walk);
/// assert_eq!(walk.kind(), SegmentKind::Walk);
/// assert!(walk.pattern().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RenderSegment {
    pub(crate) id: Id,
    pub(crate) kind: SegmentKind,
    pub(crate) pattern: Option<Id>,
    pub(crate) graph_edges: Vec<EdgeId>,
    pub(crate) grid_edge_lookup: IndexMap<GridEdge, EdgeId>,
    pub(crate) axis_offsets: IndexMap<Axis, f64>,
}

impl RenderSegment {
    pub fn new(id: impl Into<Id>, kind: SegmentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            pattern: None,
            graph_edges: Vec::new(),
            grid_edge_lookup: IndexMap::new(),
            axis_offsets: IndexMap::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<Id>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn pattern(&self) -> Option<Id> {
        self.pattern
    }

    pub fn graph_edges(&self) -> &[EdgeId] {
        &self.graph_edges
    }

    /// Graph edge through which this segment covers each grid step.
    pub fn grid_edge_lookup(&self) -> &IndexMap<GridEdge, EdgeId> {
        &self.grid_edge_lookup
    }

    /// Lateral offset of this segment on a grid axis it runs along.
    pub fn axis_offset(&self, axis: Axis) -> Option<f64> {
        self.axis_offsets.get(&axis).copied()
    }

    pub fn axis_offsets(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        self.axis_offsets.iter().map(|(axis, offset)| (*axis, *offset))
    }

    pub fn adjacent_edge(
        &self,
        graph: &NetworkGraph,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Option<EdgeId> {
        graph.adjacent_edge_in(&self.graph_edges, edge, vertex)
    }

    pub(crate) fn detach_edge(&mut self, edge: EdgeId) {
        self.graph_edges.retain(|e| *e != edge);
        self.grid_edge_lookup.retain(|_, e| *e != edge);
    }
}
