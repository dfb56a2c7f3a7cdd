//! Serializable snapshot of a laid-out network.

use serde::Serialize;

use metroline::{
    LayoutSummary, NetworkGraph,
    config::LayoutMode,
    graph::VertexId,
    point::VertexPoint,
};

use crate::error::CliError;

/// The layout written by the CLI.
#[derive(Debug, Serialize)]
pub struct LayoutFile {
    mode: LayoutMode,
    merged: usize,
    warnings: Vec<String>,
    vertices: Vec<VertexRecord>,
    edges: Vec<EdgeRecord>,
    offsets: Vec<OffsetRecord>,
    axis_offsets: Vec<AxisOffsetRecord>,
}

#[derive(Debug, Serialize)]
struct VertexRecord {
    id: String,
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct EdgeRecord {
    id: String,
    from: String,
    to: String,
    stops: Vec<String>,
    geometry: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
struct OffsetRecord {
    pattern: String,
    edge: String,
    offset: f64,
    bundled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_index: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AxisOffsetRecord {
    segment: String,
    axis: String,
    offset: f64,
}

impl LayoutFile {
    pub fn new(graph: &NetworkGraph, summary: &LayoutSummary) -> Self {
        let vertices = graph
            .vertices()
            .map(|vertex| VertexRecord {
                id: vertex_label(vertex.point()),
                x: vertex.x(),
                y: vertex.y(),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| EdgeRecord {
                id: edge.id().to_string(),
                from: endpoint_label(graph, edge.from()),
                to: endpoint_label(graph, edge.to()),
                stops: edge.stops().iter().map(|stop| stop.id().to_string()).collect(),
                geometry: edge.geometry().iter().map(|c| [c.x(), c.y()]).collect(),
            })
            .collect();

        let offsets = graph
            .patterns()
            .flat_map(|pattern| {
                pattern.offsets().map(move |(edge, offset)| OffsetRecord {
                    pattern: pattern.id().to_string(),
                    edge: edge.to_string(),
                    offset: offset.offset(),
                    bundled: offset.is_bundled(),
                    bundle_index: offset.bundle_index(),
                })
            })
            .collect();

        let axis_offsets = graph
            .segments()
            .flat_map(|segment| {
                segment.axis_offsets().map(move |(axis, offset)| AxisOffsetRecord {
                    segment: segment.id().to_string(),
                    axis: axis.to_string(),
                    offset,
                })
            })
            .collect();

        Self {
            mode: summary.mode(),
            merged: summary.merged(),
            warnings: summary.warnings().iter().map(ToString::to_string).collect(),
            vertices,
            edges,
            offsets,
            axis_offsets,
        }
    }

    /// Renders the layout as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Output`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string(self)?)
    }
}

/// A merged vertex is labelled with its member stops joined by `+`.
fn vertex_label(point: &VertexPoint) -> String {
    match point {
        VertexPoint::Single(point) => point.id().to_string(),
        VertexPoint::Multi(multi) => multi
            .points()
            .iter()
            .map(|point| point.id().to_string())
            .collect::<Vec<_>>()
            .join("+"),
    }
}

fn endpoint_label(graph: &NetworkGraph, vertex: VertexId) -> String {
    graph
        .vertex(vertex)
        .map(|found| vertex_label(found.point()))
        .unwrap_or_else(|| vertex.to_string())
}

#[cfg(test)]
mod tests {
    use metroline::{SchematicBuilder, point::Point};

    use super::*;

    #[test]
    fn test_layout_file_lists_graph() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex(Point::new("a", 52.50, 13.30));
        let b = graph.add_vertex(Point::new("b", 52.50, 13.32));
        let edge = graph.add_edge(Vec::new(), a, b).unwrap();
        graph.add_pattern("u1", vec![edge]).unwrap();
        let summary = SchematicBuilder::default().layout(&mut graph).unwrap();

        let file = LayoutFile::new(&graph, &summary);
        assert_eq!(file.vertices.len(), 2);
        assert_eq!(file.edges[0].from, "a");
        assert_eq!(file.edges[0].geometry.len(), 2);

        let text = file.to_toml().unwrap();
        assert!(text.contains("mode = \"grid\""));
        assert!(text.contains("[[vertices]]"));
    }

    #[test]
    fn test_merged_vertex_label() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_vertex_at(Point::new("a", 0.0, 0.0), 0.0, 0.0);
        let b = graph.add_vertex_at(Point::new("b", 0.0, 0.0), 5.0, 0.0);
        let merged = graph.merge_vertices(&[a, b]).unwrap();

        let label = vertex_label(graph.vertex(merged).unwrap().point());
        assert_eq!(label, "a+b");
    }
}
