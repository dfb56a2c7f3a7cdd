//! TOML network description and its conversion into a [`NetworkGraph`].
//!
//! ```toml
//! [[stops]]
//! id = "alex"
//! name = "Alexanderplatz"
//! lat = 52.5219
//! lon = 13.4132
//!
//! [[edges]]
//! id = "alex-jan"
//! from = "alex"
//! to = "jan"
//! stops = ["klo"]
//!
//! [[patterns]]
//! id = "u8"
//! edges = ["alex-jan"]
//! ```
//!
//! Only stops used as edge endpoints become vertices; the others lie along
//! edges. When no `[[segments]]` are listed, each pattern is drawn as one
//! transit segment over its edges.

use std::{
    collections::{HashMap, HashSet},
    iter,
};

use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;

use metroline::{
    NetworkGraph,
    graph::{EdgeId, RenderSegment, SegmentKind, VertexId},
    identifier::Id,
    point::{PlaceRole, Point, PointKind},
};

use crate::error::CliError;

/// A transit network as read from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    stops: Vec<StopEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
    #[serde(default)]
    patterns: Vec<PatternEntry>,
    #[serde(default)]
    segments: Vec<SegmentEntry>,
}

#[derive(Debug, Deserialize)]
struct StopEntry {
    id: String,
    name: Option<String>,
    lat: f64,
    lon: f64,
    #[serde(default)]
    kind: PointKind,
    role: Option<PlaceRole>,
}

#[derive(Debug, Deserialize)]
struct EdgeEntry {
    id: String,
    from: String,
    to: String,
    #[serde(default)]
    stops: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PatternEntry {
    id: String,
    edges: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SegmentEntry {
    id: String,
    #[serde(default)]
    kind: SegmentKind,
    pattern: Option<String>,
    edges: Vec<String>,
}

impl StopEntry {
    fn to_point(&self) -> Point {
        let mut point = Point::new(self.id.as_str(), self.lat, self.lon).with_kind(self.kind);
        if let Some(name) = &self.name {
            point = point.with_name(name.as_str());
        }
        if let Some(role) = self.role {
            point = point.with_role(role);
        }
        point
    }
}

impl NetworkFile {
    /// Parses a network description.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Input`] for malformed TOML or missing fields.
    pub fn parse(source: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(source)?)
    }

    /// Builds the network graph.
    ///
    /// Edges whose endpoints and stops repeat an earlier edge are merged
    /// into it.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Network`] for duplicate identifiers or references
    /// to unknown stops, edges, or patterns.
    pub fn build_graph(&self) -> Result<NetworkGraph, CliError> {
        let mut stops: IndexMap<&str, Point> = IndexMap::new();
        for stop in &self.stops {
            if stops.insert(stop.id.as_str(), stop.to_point()).is_some() {
                return Err(CliError::Network(format!("duplicate stop `{}`", stop.id)));
            }
        }

        let endpoints: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|edge| [edge.from.as_str(), edge.to.as_str()])
            .collect();

        let mut graph = NetworkGraph::new();
        let mut vertices: HashMap<&str, VertexId> = HashMap::new();
        for (id, point) in &stops {
            if endpoints.contains(id) {
                vertices.insert(*id, graph.add_vertex(point.clone()));
            }
        }

        let mut edges: HashMap<&str, EdgeId> = HashMap::new();
        let mut reused = 0;
        for entry in &self.edges {
            if edges.contains_key(entry.id.as_str()) {
                return Err(CliError::Network(format!("duplicate edge `{}`", entry.id)));
            }
            let from = endpoint(&vertices, &entry.from, &entry.id)?;
            let to = endpoint(&vertices, &entry.to, &entry.id)?;

            let point_array: Vec<Id> = iter::once(&entry.from)
                .chain(&entry.stops)
                .chain(iter::once(&entry.to))
                .map(|stop| Id::new(stop))
                .collect();

            let edge = match graph.get_equivalent_edge(&point_array, from, to) {
                Some(existing) => {
                    debug!(edge = entry.id.as_str(), existing:% = existing; "Reusing equivalent edge");
                    reused += 1;
                    existing
                }
                None => {
                    let on_edge = entry
                        .stops
                        .iter()
                        .map(|stop| {
                            stops.get(stop.as_str()).cloned().ok_or_else(|| {
                                CliError::Network(format!(
                                    "edge `{}` passes unknown stop `{stop}`",
                                    entry.id
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    graph.add_edge(on_edge, from, to)?
                }
            };
            edges.insert(entry.id.as_str(), edge);
        }

        for pattern in &self.patterns {
            let pattern_edges = resolve_edges(&edges, &pattern.edges, &pattern.id)?;
            graph.add_pattern(Id::new(&pattern.id), pattern_edges)?;
        }

        if self.segments.is_empty() {
            for pattern in &self.patterns {
                let segment = RenderSegment::new(
                    Id::new(&format!("{}-transit", pattern.id)),
                    SegmentKind::Transit,
                )
                .with_pattern(Id::new(&pattern.id));
                let segment_edges = resolve_edges(&edges, &pattern.edges, &pattern.id)?;
                graph.add_segment(segment, segment_edges)?;
            }
        } else {
            for entry in &self.segments {
                let mut segment = RenderSegment::new(Id::new(&entry.id), entry.kind);
                if let Some(pattern) = &entry.pattern {
                    segment = segment.with_pattern(Id::new(pattern));
                }
                let segment_edges = resolve_edges(&edges, &entry.edges, &entry.id)?;
                graph.add_segment(segment, segment_edges)?;
            }
        }

        info!(
            stops = stops.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            reused,
            patterns = self.patterns.len();
            "Network loaded"
        );
        Ok(graph)
    }
}

fn endpoint(vertices: &HashMap<&str, VertexId>, stop: &str, edge: &str) -> Result<VertexId, CliError> {
    vertices
        .get(stop)
        .copied()
        .ok_or_else(|| CliError::Network(format!("edge `{edge}` ends at unknown stop `{stop}`")))
}

fn resolve_edges(
    edges: &HashMap<&str, EdgeId>,
    names: &[String],
    owner: &str,
) -> Result<Vec<EdgeId>, CliError> {
    names
        .iter()
        .map(|name| {
            edges
                .get(name.as_str())
                .copied()
                .ok_or_else(|| CliError::Network(format!("`{owner}` refers to unknown edge `{name}`")))
        })
        .collect()
}
