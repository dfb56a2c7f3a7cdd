//! Example: Laying out a small forked line
//!
//! This example builds a network by hand, runs the 1-D layout, and then
//! the grid layout on a copy of the same network, printing where every
//! stop ends up.

use metroline::{
    NetworkGraph, SchematicBuilder,
    config::{LayoutConfig, LayoutMode},
    graph::{RenderSegment, SegmentKind},
    point::Point,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = NetworkGraph::new();

    let west = graph.add_vertex(Point::new("west", 52.520, 13.380).with_name("Westkreuz"));
    let centre = graph.add_vertex(Point::new("centre", 52.521, 13.410).with_name("Mitte"));
    let north = graph.add_vertex(Point::new("north", 52.545, 13.440).with_name("Nordbahnhof"));
    let south = graph.add_vertex(Point::new("south", 52.500, 13.445).with_name("Ostkreuz"));

    let trunk = graph.add_edge(vec![Point::new("museum", 52.520, 13.395)], west, centre)?;
    let north_branch = graph.add_edge(Vec::new(), centre, north)?;
    let south_branch = graph.add_edge(vec![Point::new("park", 52.510, 13.430)], centre, south)?;

    graph.add_pattern("s1", vec![trunk, north_branch])?;
    graph.add_pattern("s2", vec![trunk, south_branch])?;
    graph.add_segment(
        RenderSegment::new("s1-0", SegmentKind::Transit).with_pattern("s1"),
        vec![trunk, north_branch],
    )?;
    graph.add_segment(
        RenderSegment::new("s2-0", SegmentKind::Transit).with_pattern("s2"),
        vec![trunk, south_branch],
    )?;

    let mut grid = graph.clone();

    let linear = SchematicBuilder::new(LayoutConfig::default().with_mode(LayoutMode::Linear));
    let summary = linear.layout(&mut graph)?;
    println!("1-D layout: {} vertices", summary.vertices());
    for vertex in graph.vertices() {
        let name = vertex.point().id().map(|id| id.to_string()).unwrap_or_default();
        println!("  {name:<8} ({}, {})", vertex.x(), vertex.y());
    }

    let summary = SchematicBuilder::default().layout(&mut grid)?;
    println!("\nGrid layout: {} warnings", summary.warnings().len());
    for edge in grid.edges() {
        let points: Vec<String> = edge
            .geometry()
            .iter()
            .map(|c| format!("({}, {})", c.x(), c.y()))
            .collect();
        println!("  {} -> {}: {}", edge.from(), edge.to(), points.join(" "));
    }

    Ok(())
}
