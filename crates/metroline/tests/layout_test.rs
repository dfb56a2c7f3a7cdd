//! Integration tests for the layout pipeline
//!
//! These tests drive the public API end to end on small networks laid out
//! around Berlin coordinates.

use float_cmp::assert_approx_eq;

use metroline::{
    GraphError, NetworkGraph, SchematicBuilder,
    config::{LayoutConfig, LayoutMode},
    geometry::Axis,
    graph::{EdgeId, RenderSegment, SegmentKind, VertexId},
    identifier::Id,
    point::Point,
};

/// Three stops in a row, then the red line turns north and the blue line
/// turns south.
fn forked_network() -> (NetworkGraph, [VertexId; 5]) {
    let mut graph = NetworkGraph::new();
    let a = graph.add_vertex(Point::new("a", 52.500, 13.300));
    let b = graph.add_vertex(Point::new("b", 52.500, 13.320));
    let c = graph.add_vertex(Point::new("c", 52.500, 13.340));
    let d = graph.add_vertex(Point::new("d", 52.515, 13.360));
    let e = graph.add_vertex(Point::new("e", 52.485, 13.360));

    let ab = graph.add_edge(Vec::new(), a, b).expect("a and b exist");
    let bc = graph.add_edge(Vec::new(), b, c).expect("b and c exist");
    let cd = graph.add_edge(Vec::new(), c, d).expect("c and d exist");
    let ce = graph.add_edge(Vec::new(), c, e).expect("c and e exist");

    graph.add_pattern("red", vec![ab, bc, cd]).unwrap();
    graph.add_pattern("blue", vec![ab, bc, ce]).unwrap();
    graph
        .add_segment(
            RenderSegment::new("red-0", SegmentKind::Transit).with_pattern("red"),
            vec![ab, bc, cd],
        )
        .unwrap();
    graph
        .add_segment(
            RenderSegment::new("blue-0", SegmentKind::Transit).with_pattern("blue"),
            vec![ab, bc, ce],
        )
        .unwrap();

    (graph, [a, b, c, d, e])
}

fn position(graph: &NetworkGraph, vertex: VertexId) -> (f64, f64) {
    let vertex = graph.vertex(vertex).expect("vertex exists");
    (vertex.x(), vertex.y())
}

#[test]
fn test_linear_layout_of_forked_network() {
    let (mut graph, [a, b, c, d, e]) = forked_network();
    let builder = SchematicBuilder::new(LayoutConfig::default().with_mode(LayoutMode::Linear));

    let summary = builder.layout(&mut graph).expect("layout succeeds");

    assert_eq!(summary.mode(), LayoutMode::Linear);
    assert_eq!(summary.merged(), 0);
    assert!(summary.warnings().is_empty());
    assert_eq!(position(&graph, a), (0.0, 0.0));
    assert_eq!(position(&graph, b), (1.0, 0.0));
    assert_eq!(position(&graph, c), (2.0, 0.0));
    assert_eq!(position(&graph, d), (3.0, 0.0));
    assert_eq!(position(&graph, e), (3.0, 1.0));

    // The shared edges carry a two-line bundle spread around the centreline.
    let ab = graph.edges_between(a, b)[0];
    let red = graph.pattern(Id::new("red")).unwrap().offset(ab).unwrap();
    let blue = graph.pattern(Id::new("blue")).unwrap().offset(ab).unwrap();
    assert!(red.is_bundled() && blue.is_bundled());
    assert_approx_eq!(f64, red.offset() + blue.offset(), 0.0);
    assert_approx_eq!(f64, red.offset().abs(), 0.6);

    for edge in graph.edges() {
        assert!(edge.geometry().len() >= 2, "edge {} has no geometry", edge.id());
    }
}

#[test]
fn test_grid_layout_snaps_to_cell_multiples() {
    let (mut graph, vertices) = forked_network();
    let summary = SchematicBuilder::default()
        .layout(&mut graph)
        .expect("layout succeeds");

    assert_eq!(summary.mode(), LayoutMode::Grid);
    assert!(summary.warnings().is_empty());
    assert_eq!(graph.cell_size(), Some(100.0));
    assert_eq!(graph.ordered_vertices().len(), 5);

    let mut cells = Vec::new();
    for vertex in vertices {
        let (x, y) = position(&graph, vertex);
        assert_approx_eq!(f64, (x / 100.0).round() * 100.0, x);
        assert_approx_eq!(f64, (y / 100.0).round() * 100.0, y);
        assert!(graph.vertex(vertex).unwrap().is_snapped());
        cells.push(((x / 100.0).round() as i64, (y / 100.0).round() as i64));
    }
    cells.sort_unstable();
    cells.dedup();
    assert_eq!(cells.len(), 5, "every vertex holds its own cell");
}

#[test]
fn test_grid_offsets_split_shared_axis() {
    let (mut graph, [_, _, c, _, _]) = forked_network();
    SchematicBuilder::default().layout(&mut graph).unwrap();

    // The median stop sits at the origin, so the shared run lies on row 0.
    assert_eq!(position(&graph, c), (0.0, 0.0));
    let axis = Axis::Horizontal { y: 0 };
    let red = graph.segment(Id::new("red-0")).unwrap().axis_offset(axis).unwrap();
    let blue = graph.segment(Id::new("blue-0")).unwrap().axis_offset(axis).unwrap();
    assert_approx_eq!(f64, red + blue, 0.0);
    assert_approx_eq!(f64, red.abs(), 0.6);
    assert!(!graph.grid_edge_segments().is_empty());
}

#[test]
fn test_bundle_votes_are_antisymmetric() {
    let (mut graph, _) = forked_network();
    SchematicBuilder::default().layout(&mut graph).unwrap();

    let votes = graph.bundle_comparisons();
    assert!(!votes.is_empty());
    for ((first, second), count) in votes.iter() {
        assert_eq!(votes.get(second, first), -count);
    }
}

#[test]
fn test_short_walk_transfer_is_collapsed() {
    let mut graph = NetworkGraph::new();
    let x = graph.add_vertex(Point::new("x", 52.500, 13.280));
    let w1 = graph.add_vertex(Point::new("w1", 52.500, 13.3000));
    let w2 = graph.add_vertex(Point::new("w2", 52.500, 13.3005));
    let y = graph.add_vertex(Point::new("y", 52.500, 13.320));
    let red = graph.add_edge(Vec::new(), x, w1).unwrap();
    let walk = graph.add_edge(Vec::new(), w1, w2).unwrap();
    let blue = graph.add_edge(Vec::new(), w2, y).unwrap();
    graph.add_pattern("red", vec![red]).unwrap();
    graph.add_pattern("blue", vec![blue]).unwrap();
    graph
        .add_segment(RenderSegment::new("walk-0", SegmentKind::Walk), vec![walk])
        .unwrap();

    let summary = SchematicBuilder::default().layout(&mut graph).unwrap();

    assert_eq!(summary.merged(), 1);
    assert_eq!(summary.vertices(), 3);
    assert_eq!(summary.edges(), 2);
    let merged = graph.vertex_for_point(Id::new("w1")).unwrap();
    assert_eq!(graph.vertex_for_point(Id::new("w2")), Some(merged));
    assert_eq!(graph.vertex(merged).unwrap().old_vertices().len(), 2);
    assert!(!graph.contains_edge(walk));
}

#[test]
fn test_disabled_collapse_keeps_transfer() {
    let mut graph = NetworkGraph::new();
    let w1 = graph.add_vertex(Point::new("w1", 52.500, 13.3000));
    let w2 = graph.add_vertex(Point::new("w2", 52.500, 13.3005));
    graph.add_edge(Vec::new(), w1, w2).unwrap();

    let config = LayoutConfig::default().with_collapse_transfers(false);
    let summary = SchematicBuilder::new(config).layout(&mut graph).unwrap();
    assert_eq!(summary.merged(), 0);
    assert_eq!(summary.vertices(), 2);
}

#[test]
fn test_reset_restores_original_positions() {
    let (mut graph, vertices) = forked_network();
    let before: Vec<_> = vertices.iter().map(|v| position(&graph, *v)).collect();

    SchematicBuilder::default().layout(&mut graph).unwrap();
    let after: Vec<_> = vertices.iter().map(|v| position(&graph, *v)).collect();
    assert_ne!(before, after);

    graph.reset_coordinates();
    let restored: Vec<_> = vertices.iter().map(|v| position(&graph, *v)).collect();
    assert_eq!(before, restored);
}

#[test]
fn test_add_edge_to_missing_vertex_leaves_graph_untouched() {
    let mut graph = NetworkGraph::new();
    let a = graph.add_vertex(Point::new("a", 52.5, 13.3));
    let ghost = VertexId::new(99);

    let result = graph.add_edge(Vec::new(), a, ghost);

    assert_eq!(result, Err(GraphError::MissingVertex(ghost)));
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.vertex(a).unwrap().edges().is_empty());
}

#[test]
fn test_equivalent_edge_lookup() {
    let mut graph = NetworkGraph::new();
    let a = graph.add_vertex(Point::new("a", 52.5, 13.3));
    let b = graph.add_vertex(Point::new("b", 52.5, 13.4));
    let stops = vec![Point::new("s", 52.5, 13.35)];
    let edge: EdgeId = graph.add_edge(stops, a, b).unwrap();

    let key = [Id::new("a"), Id::new("s"), Id::new("b")];
    assert_eq!(graph.get_equivalent_edge(&key, a, b), Some(edge));
    assert_eq!(graph.get_equivalent_edge(&key[..2], a, b), None);
    assert_eq!(graph.get_equivalent_edge(&key, b, a), None);
}

#[test]
fn test_layout_on_clone_leaves_original_alone() {
    let (graph, [a, ..]) = forked_network();
    let mut copy = graph.clone();
    SchematicBuilder::default().layout(&mut copy).unwrap();

    assert_ne!(position(&graph, a), position(&copy, a));
    assert!(graph.bundle_comparisons().is_empty());
    assert!(graph.warnings().is_empty());
}
