//! Bundle ordering and lateral offsets.
//!
//! Where lines that share an edge split apart at a vertex, the vertex gives
//! evidence of which line should be drawn on which side of the bundle. Each
//! such observation is a vote recorded in [`BundleComparisons`]. Bundles
//! are then ordered by the accumulated votes and spread symmetrically
//! around the edge centreline.
//!
//! The votes are a heuristic and need not form a total order, so sorting
//! goes through [`vote_sort`], a stable insertion sort that accepts any
//! comparison result. The output is deterministic for a given input order.

use std::{cmp::Ordering, collections::HashSet};

use indexmap::IndexMap;
use log::{debug, info, trace};

use metroline_core::{geometry::Axis, identifier::Id};

use crate::{
    error::{GraphError, Result},
    graph::{EdgeId, NetworkGraph, SegmentKind, VertexId},
};

/// Antisymmetric table of pairwise bundle votes.
///
/// # Examples
///
/// ```
/// # use metroline::layout::bundle::BundleComparisons;
/// # use metroline::identifier::Id;
/// let (red, blue) = (Id::new("red"), Id::new("blue"));
/// let mut votes = BundleComparisons::new();
/// votes.record(red, blue);
/// votes.record(red, blue);
///
/// assert_eq!(votes.get(red, blue), 2);
/// assert_eq!(votes.get(blue, red), -2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleComparisons {
    votes: IndexMap<(Id, Id), i64>,
}

impl BundleComparisons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one vote for `winner` over `loser`.
    pub fn record(&mut self, winner: Id, loser: Id) {
        *self.votes.entry((winner, loser)).or_insert(0) += 1;
        *self.votes.entry((loser, winner)).or_insert(0) -= 1;
    }

    /// Net votes for `a` over `b`; zero if the pair was never compared.
    pub fn get(&self, a: Id, b: Id) -> i64 {
        self.votes.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Orders `a` after `b` when `a` has won more votes against `b`.
    pub fn compare(&self, a: Id, b: Id) -> Ordering {
        self.get(a, b).cmp(&0)
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    /// Number of recorded ordered pairs.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((Id, Id), i64)> + '_ {
        self.votes.iter().map(|(pair, count)| (*pair, *count))
    }
}

/// Sorts `items` by accumulated votes with a stable insertion sort.
///
/// Equal or uncompared items keep their relative order.
pub fn vote_sort(items: &mut [Id], votes: &BundleComparisons) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && votes.compare(items[j - 1], items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// The members of an edge whose order is being voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BundleLevel {
    Pattern,
    Segment,
}

/// Decides which of two members goes on the `+y` side.
///
/// `y1` and `y2` are the far ends of the members' continuing edges and `dx`
/// is the x extent of the shared edge. Returns `Some(true)` when the first
/// member wins, or `None` when the geometry gives no evidence.
fn vote(dx: f64, y1: f64, y2: f64) -> Option<bool> {
    if dx == 0.0 || y1 == y2 {
        return None;
    }
    Some((dx > 0.0) == (y1 > y2))
}

impl NetworkGraph {
    /// Rebuilds the vote table from every divergence point of the graph.
    pub(crate) fn accumulate_votes(&mut self, level: BundleLevel) {
        let mut votes = BundleComparisons::new();

        for vertex in self.vertices.values() {
            if vertex.edges.len() <= 2 {
                continue;
            }
            for &edge_id in &vertex.edges {
                let Some(edge) = self.edges.get(&edge_id) else {
                    continue;
                };
                let members = match level {
                    BundleLevel::Pattern => &edge.patterns,
                    BundleLevel::Segment => &edge.segments,
                };
                if members.len() < 2 {
                    continue;
                }
                let Ok((from, to)) = self.endpoint_coords(edge_id) else {
                    continue;
                };
                let dx = to.x() - from.x();

                for (i, &p1) in members.iter().enumerate() {
                    for &p2 in &members[i + 1..] {
                        let adjacent1 = self.member_adjacent_edge(level, p1, edge_id, vertex.id);
                        let adjacent2 = self.member_adjacent_edge(level, p2, edge_id, vertex.id);
                        let (Some(adjacent1), Some(adjacent2)) = (adjacent1, adjacent2) else {
                            continue;
                        };
                        if adjacent1 == adjacent2 {
                            continue;
                        }
                        let (Some(y1), Some(y2)) = (
                            self.far_end_y(adjacent1, vertex.id),
                            self.far_end_y(adjacent2, vertex.id),
                        ) else {
                            continue;
                        };

                        match vote(dx, y1, y2) {
                            Some(true) => votes.record(p1, p2),
                            Some(false) => votes.record(p2, p1),
                            None => {}
                        }
                    }
                }
            }
        }

        trace!(pairs = votes.len(); "Bundle votes accumulated");
        self.bundle_comparisons = votes;
    }

    /// Assigns per-pattern offsets on horizontal edges of a 1-D layout.
    ///
    /// Edges are visited by decreasing pattern count. A lone pattern gets a
    /// zero offset; a bundle of `n` patterns is ordered by votes and the
    /// pattern at position `i` is offset by `(i - (n - 1) / 2) * spacing`.
    pub fn apply_1d_offsets(&mut self) {
        self.accumulate_votes(BundleLevel::Pattern);
        let spacing = self.config.line_spacing();

        let mut order: Vec<EdgeId> = self.edges.keys().copied().collect();
        order.sort_by_key(|id| {
            std::cmp::Reverse(self.edges.get(id).map_or(0, |edge| edge.patterns.len()))
        });

        let mut assignments = Vec::new();
        for edge_id in order {
            let Ok((from, to)) = self.endpoint_coords(edge_id) else {
                continue;
            };
            if from.y() != to.y() {
                continue;
            }
            let Some(edge) = self.edges.get(&edge_id) else {
                continue;
            };
            match edge.patterns.as_slice() {
                [] => {}
                [only] => assignments.push((*only, edge_id, 0.0, None, false)),
                patterns => {
                    let mut sorted = patterns.to_vec();
                    vote_sort(&mut sorted, &self.bundle_comparisons);
                    let centre = (sorted.len() - 1) as f64 / 2.0;
                    for (i, pattern) in sorted.into_iter().enumerate() {
                        let offset = (-(i as f64) + centre) * -spacing;
                        assignments.push((pattern, edge_id, offset, Some(i), true));
                    }
                }
            }
        }

        let assigned = assignments.len();
        for (pattern, edge, offset, index, bundled) in assignments {
            if let Some(pattern) = self.patterns.get_mut(&pattern) {
                pattern.set_edge_offset(edge, offset, index, bundled);
            }
        }
        debug!(assigned; "1-D offsets applied");
    }

    /// Assigns per-axis offsets to transit segments of a grid layout.
    ///
    /// Every edge is broken into grid steps, and every segment is recorded
    /// against the steps its edges cover. Steps on the same horizontal or
    /// vertical grid line form one bundle holding at most one segment per
    /// pattern. Each bundle is ordered by segment votes and spread by the
    /// line spacing, with the sign following the direction of the segment's
    /// first edge along the axis.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidCellSize`] unless `cell_size` is a
    /// positive finite number.
    pub fn apply_2d_offsets(&mut self, cell_size: f64) -> Result<()> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GraphError::InvalidCellSize(cell_size));
        }
        self.accumulate_votes(BundleLevel::Segment);

        let grid_edges: Vec<(EdgeId, Vec<_>)> = self
            .edges
            .keys()
            .map(|id| (*id, self.edge_grid_edges(*id, cell_size)))
            .collect();
        for (id, steps) in grid_edges {
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.grid_edges = steps;
            }
        }

        let mut grid_edge_segments: IndexMap<_, Vec<Id>> = IndexMap::new();
        for segment in self.segments.values_mut() {
            segment.grid_edge_lookup.clear();
            for edge_id in &segment.graph_edges {
                let Some(edge) = self.edges.get(edge_id) else {
                    continue;
                };
                for step in &edge.grid_edges {
                    let list = grid_edge_segments.entry(*step).or_default();
                    if !list.contains(&segment.id) {
                        list.push(segment.id);
                        segment.grid_edge_lookup.insert(*step, *edge_id);
                    }
                }
            }
        }

        let mut axis_bundles: IndexMap<Axis, Vec<Id>> = IndexMap::new();
        for (step, segments) in &grid_edge_segments {
            let Some(axis) = step.axis() else {
                continue;
            };
            let bundle = axis_bundles.entry(axis).or_default();
            for segment in segments {
                self.add_segment_to_axis(*segment, bundle);
            }
        }

        let spacing = self.config.line_spacing();
        let mut offsets = Vec::new();
        for (axis, bundle) in &axis_bundles {
            let mut sorted = bundle.clone();
            vote_sort(&mut sorted, &self.bundle_comparisons);
            let width = spacing * (sorted.len() as f64 - 1.0);

            for (s, segment) in sorted.into_iter().enumerate() {
                let Some(first) = self
                    .segments
                    .get(&segment)
                    .and_then(|seg| seg.graph_edges.first().copied())
                else {
                    continue;
                };
                let Ok((from, to)) = self.endpoint_coords(first) else {
                    continue;
                };
                let forward = match axis {
                    Axis::Vertical { .. } => to.y() - from.y() > 0.0,
                    Axis::Horizontal { .. } => to.x() - from.x() > 0.0,
                };
                let offset = -width / 2.0 + s as f64 * spacing;
                offsets.push((segment, *axis, if forward { offset } else { -offset }));
            }
        }

        for (segment, axis, offset) in offsets {
            if let Some(segment) = self.segments.get_mut(&segment) {
                segment.axis_offsets.insert(axis, offset);
            }
        }

        info!(
            grid_edges = grid_edge_segments.len(),
            axes = axis_bundles.len();
            "2-D offsets applied"
        );
        self.grid_edge_segments = grid_edge_segments;
        Ok(())
    }

    fn member_adjacent_edge(
        &self,
        level: BundleLevel,
        member: Id,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Option<EdgeId> {
        match level {
            BundleLevel::Pattern => self.patterns.get(&member)?.adjacent_edge(self, edge, vertex),
            BundleLevel::Segment => self.segments.get(&member)?.adjacent_edge(self, edge, vertex),
        }
    }

    fn far_end_y(&self, edge: EdgeId, vertex: VertexId) -> Option<f64> {
        let opposite = self.opposite_vertex(edge, vertex).ok()?;
        self.vertices.get(&opposite).map(|v| v.y)
    }

    /// Adds a transit segment to an axis bundle unless its pattern is
    /// already represented there.
    fn add_segment_to_axis(&self, segment: Id, bundle: &mut Vec<Id>) {
        let Some(found) = self.segments.get(&segment) else {
            return;
        };
        if found.kind != SegmentKind::Transit || bundle.contains(&segment) {
            return;
        }
        let patterns: HashSet<Id> = bundle
            .iter()
            .filter_map(|id| self.segments.get(id)?.pattern)
            .collect();
        if found.pattern.is_some_and(|pattern| patterns.contains(&pattern)) {
            return;
        }
        bundle.push(segment);
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use metroline_core::point::Point;

    use super::*;
    use crate::graph::RenderSegment;

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    #[test]
    fn test_votes_are_antisymmetric_and_accumulate() {
        let (a, b) = (Id::new("vote-a"), Id::new("vote-b"));
        let mut votes = BundleComparisons::new();

        votes.record(a, b);
        assert_eq!(votes.get(a, b), 1);
        assert_eq!(votes.get(b, a), -1);

        votes.record(a, b);
        votes.record(b, a);
        votes.record(a, b);
        assert_eq!(votes.get(a, b), 2);
        assert_eq!(votes.get(a, b), -votes.get(b, a));
        assert_eq!(votes.len(), 2);
    }

    #[test]
    fn test_vote_rule() {
        assert_eq!(vote(1.0, 2.0, 1.0), Some(true));
        assert_eq!(vote(1.0, 1.0, 2.0), Some(false));
        assert_eq!(vote(-1.0, 1.0, 2.0), Some(true));
        assert_eq!(vote(-1.0, 2.0, 1.0), Some(false));
        assert_eq!(vote(0.0, 2.0, 1.0), None);
        assert_eq!(vote(1.0, 1.0, 1.0), None);
    }

    #[test]
    fn test_vote_sort_orders_winners_last() {
        let mut items = ids(&["s-a", "s-b", "s-c"]);
        let mut votes = BundleComparisons::new();
        votes.record(Id::new("s-a"), Id::new("s-b"));

        vote_sort(&mut items, &votes);
        assert_eq!(items, ids(&["s-b", "s-a", "s-c"]));
    }

    #[test]
    fn test_vote_sort_tolerates_cycles() {
        let mut items = ids(&["c-x", "c-y", "c-z"]);
        let mut votes = BundleComparisons::new();
        votes.record(Id::new("c-x"), Id::new("c-y"));
        votes.record(Id::new("c-y"), Id::new("c-z"));
        votes.record(Id::new("c-z"), Id::new("c-x"));

        let mut again = items.clone();
        vote_sort(&mut items, &votes);
        vote_sort(&mut again, &votes);
        assert_eq!(items, again);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_1d_offsets_are_symmetric() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 3.0, 0.0);
        let edge = graph.add_edge(Vec::new(), a, b).unwrap();
        for name in ["p1", "p2", "p3"] {
            graph.add_pattern(name, vec![edge]).unwrap();
        }

        graph.apply_1d_offsets();

        let offsets: Vec<f64> = ["p1", "p2", "p3"]
            .iter()
            .map(|name| graph.pattern(Id::new(name)).unwrap().offset(edge).unwrap().offset())
            .collect();
        assert_approx_eq!(f64, offsets[0], -1.2);
        assert_approx_eq!(f64, offsets[1], 0.0);
        assert_approx_eq!(f64, offsets[2], 1.2);
        assert_approx_eq!(f64, offsets.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_1d_offsets_skip_sloped_edges() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 1.0, 1.0);
        let edge = graph.add_edge(Vec::new(), a, b).unwrap();
        graph.add_pattern("solo", vec![edge]).unwrap();

        graph.apply_1d_offsets();
        assert!(graph.pattern(Id::new("solo")).unwrap().offset(edge).is_none());
    }

    /// Two patterns share A-B and split at B: "up" continues to a vertex
    /// above the line, "down" to one below.
    fn diverging_graph() -> (NetworkGraph, EdgeId) {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 100.0, 0.0);
        let up = graph.add_vertex_at(Point::new("u", 0.0, 0.0), 200.0, 100.0);
        let down = graph.add_vertex_at(Point::new("d", 0.0, 0.0), 200.0, -100.0);
        let ab = graph.add_edge(Vec::new(), a, b).unwrap();
        let bu = graph.add_edge(Vec::new(), b, up).unwrap();
        let bd = graph.add_edge(Vec::new(), b, down).unwrap();

        graph.add_pattern("down", vec![ab, bd]).unwrap();
        graph.add_pattern("up", vec![ab, bu]).unwrap();
        for (segment, pattern, edges) in [("down-0", "down", vec![ab, bd]), ("up-0", "up", vec![ab, bu])] {
            graph
                .add_segment(
                    RenderSegment::new(segment, SegmentKind::Transit).with_pattern(pattern),
                    edges,
                )
                .unwrap();
        }
        (graph, ab)
    }

    #[test]
    fn test_divergence_votes_put_upper_line_on_top() {
        let (mut graph, ab) = diverging_graph();
        graph.apply_1d_offsets();

        let (up, down) = (Id::new("up"), Id::new("down"));
        assert_eq!(graph.bundle_comparisons().get(up, down), 1);

        let up_offset = graph.pattern(up).unwrap().offset(ab).unwrap().offset();
        let down_offset = graph.pattern(down).unwrap().offset(ab).unwrap().offset();
        assert_approx_eq!(f64, up_offset, 0.6);
        assert_approx_eq!(f64, down_offset, -0.6);
    }

    #[test]
    fn test_2d_offsets_bucket_segments_by_axis() {
        let (mut graph, ab) = diverging_graph();
        graph.apply_2d_offsets(100.0).unwrap();

        let step = graph.edge(ab).unwrap().grid_edges()[0];
        assert_eq!(graph.grid_edge_segments()[&step].len(), 2);

        let axis = Axis::Horizontal { y: 0 };
        let up = graph.segment(Id::new("up-0")).unwrap().axis_offset(axis).unwrap();
        let down = graph.segment(Id::new("down-0")).unwrap().axis_offset(axis).unwrap();
        assert_approx_eq!(f64, up, 0.6);
        assert_approx_eq!(f64, down, -0.6);
        assert_eq!(
            graph.segment(Id::new("up-0")).unwrap().grid_edge_lookup()[&step],
            ab
        );
    }

    fn transit(graph: &mut NetworkGraph, segment: &str, pattern: &str, edges: Vec<EdgeId>) {
        if graph.pattern(Id::new(pattern)).is_none() {
            graph.add_pattern(pattern, edges.clone()).unwrap();
        }
        graph
            .add_segment(
                RenderSegment::new(segment, SegmentKind::Transit).with_pattern(pattern),
                edges,
            )
            .unwrap();
    }

    fn axis_offset(graph: &NetworkGraph, segment: &str, axis: Axis) -> Option<f64> {
        graph.segment(Id::new(segment)).unwrap().axis_offset(axis)
    }

    #[test]
    fn test_2d_offset_flips_for_westbound_segment() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 100.0, 0.0);
        let eastbound = graph.add_edge(Vec::new(), a, b).unwrap();
        let westbound = graph.add_edge(Vec::new(), b, a).unwrap();
        transit(&mut graph, "east-0", "east", vec![eastbound]);
        transit(&mut graph, "west-0", "west", vec![westbound]);

        graph.apply_2d_offsets(100.0).unwrap();

        // Both share one grid step; the second slot is mirrored because its
        // segment runs right to left.
        let axis = Axis::Horizontal { y: 0 };
        assert_approx_eq!(f64, axis_offset(&graph, "east-0", axis).unwrap(), -0.6);
        assert_approx_eq!(f64, axis_offset(&graph, "west-0", axis).unwrap(), -0.6);
    }

    #[test]
    fn test_2d_offsets_on_vertical_axis() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 0.0, 100.0);
        let north = graph.add_edge(Vec::new(), a, b).unwrap();
        let south = graph.add_edge(Vec::new(), b, a).unwrap();
        transit(&mut graph, "n1-0", "n1", vec![north]);
        transit(&mut graph, "n2-0", "n2", vec![north]);
        transit(&mut graph, "s1-0", "s1", vec![south]);

        graph.apply_2d_offsets(100.0).unwrap();

        let axis = Axis::Vertical { x: 0 };
        assert_approx_eq!(f64, axis_offset(&graph, "n1-0", axis).unwrap(), -1.2);
        assert_approx_eq!(f64, axis_offset(&graph, "n2-0", axis).unwrap(), 0.0);
        assert_approx_eq!(f64, axis_offset(&graph, "s1-0", axis).unwrap(), -1.2);
        assert_eq!(axis_offset(&graph, "n1-0", Axis::Horizontal { y: 0 }), None);
    }

    #[test]
    fn test_2d_axis_keeps_one_segment_per_pattern() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 100.0, 0.0);
        let ab = graph.add_edge(Vec::new(), a, b).unwrap();
        transit(&mut graph, "red-0", "red", vec![ab]);
        transit(&mut graph, "red-1", "red", vec![ab]);
        transit(&mut graph, "blue-0", "blue", vec![ab]);

        graph.apply_2d_offsets(100.0).unwrap();

        let step = graph.edge(ab).unwrap().grid_edges()[0];
        assert_eq!(graph.grid_edge_segments()[&step].len(), 3);

        let axis = Axis::Horizontal { y: 0 };
        assert_approx_eq!(f64, axis_offset(&graph, "red-0", axis).unwrap(), -0.6);
        assert_approx_eq!(f64, axis_offset(&graph, "blue-0", axis).unwrap(), 0.6);
        assert_eq!(axis_offset(&graph, "red-1", axis), None);
    }

    #[test]
    fn test_2d_axis_leaves_out_walk_segments() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 100.0, 0.0);
        let ab = graph.add_edge(Vec::new(), a, b).unwrap();
        transit(&mut graph, "red-0", "red", vec![ab]);
        graph
            .add_segment(RenderSegment::new("walk-0", SegmentKind::Walk), vec![ab])
            .unwrap();
        transit(&mut graph, "blue-0", "blue", vec![ab]);

        graph.apply_2d_offsets(100.0).unwrap();

        // The walk shares the grid step but takes no slot in the bundle.
        let axis = Axis::Horizontal { y: 0 };
        assert_eq!(axis_offset(&graph, "walk-0", axis), None);
        assert_approx_eq!(f64, axis_offset(&graph, "red-0", axis).unwrap(), -0.6);
        assert_approx_eq!(f64, axis_offset(&graph, "blue-0", axis).unwrap(), 0.6);
    }

    #[test]
    fn test_2d_offsets_reject_bad_cell_size() {
        let (mut graph, _) = diverging_graph();
        assert_eq!(
            graph.apply_2d_offsets(0.0),
            Err(GraphError::InvalidCellSize(0.0))
        );
    }
}
