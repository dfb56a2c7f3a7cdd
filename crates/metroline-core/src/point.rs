//! Geographic points attached to graph vertices and edges.
//!
//! A [`Point`] is a stop, place or turn point taken from source data. Graph
//! vertices carry a [`VertexPoint`], which is either a single point or a
//! [`MultiPoint`] produced when several vertices are merged into one.

use std::fmt;

use serde::Deserialize;

use crate::identifier::Id;

/// The kind of location a [`Point`] represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// A transit stop served by one or more patterns.
    #[default]
    Stop,
    /// A non-transit place such as a journey origin or destination.
    Place,
    /// A geometric turn point with no passenger meaning.
    Turn,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Stop => write!(f, "stop"),
            PointKind::Place => write!(f, "place"),
            PointKind::Turn => write!(f, "turn"),
        }
    }
}

/// Role of a place within a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceRole {
    /// The journey starts here.
    From,
    /// The journey ends here.
    To,
}

/// A single geographic location.
///
/// # Examples
///
/// ```
/// # use metroline_core::point::{PlaceRole, Point, PointKind};
/// let home = Point::new("home", 42.35, -71.06)
///     .with_kind(PointKind::Place)
///     .with_role(PlaceRole::From);
///
/// assert!(home.contains_from_point());
/// assert!(!home.contains_to_point());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: Id,
    name: Option<String>,
    lat: f64,
    lon: f64,
    kind: PointKind,
    role: Option<PlaceRole>,
}

impl Point {
    /// Creates a stop point with the given identifier and position.
    pub fn new(id: impl Into<Id>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            lat,
            lon,
            kind: PointKind::Stop,
            role: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: PointKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_role(mut self, role: PlaceRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn kind(&self) -> PointKind {
        self.kind
    }

    pub fn role(&self) -> Option<PlaceRole> {
        self.role
    }

    /// Returns `true` if this point is a journey origin.
    pub fn contains_from_point(&self) -> bool {
        self.role == Some(PlaceRole::From)
    }

    /// Returns `true` if this point is a journey destination.
    pub fn contains_to_point(&self) -> bool {
        self.role == Some(PlaceRole::To)
    }
}

/// An aggregate of points that were merged into a single vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiPoint {
    points: Vec<Point>,
}

impl MultiPoint {
    /// Creates an empty multipoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex point, flattening nested multipoints.
    pub fn add_point(&mut self, point: VertexPoint) {
        match point {
            VertexPoint::Single(point) => self.points.push(point),
            VertexPoint::Multi(multi) => self.points.extend(multi.points),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Checks whether a member point has the given identifier.
    pub fn contains(&self, id: Id) -> bool {
        self.points.iter().any(|point| point.id() == id)
    }

    fn mean(&self, f: impl Fn(&Point) -> f64) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(f).sum::<f64>() / self.points.len() as f64
    }
}

/// The point carried by a graph vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexPoint {
    Single(Point),
    Multi(MultiPoint),
}

impl VertexPoint {
    /// Latitude; the member mean for a multipoint.
    pub fn lat(&self) -> f64 {
        match self {
            VertexPoint::Single(point) => point.lat(),
            VertexPoint::Multi(multi) => multi.mean(Point::lat),
        }
    }

    /// Longitude; the member mean for a multipoint.
    pub fn lon(&self) -> f64 {
        match self {
            VertexPoint::Single(point) => point.lon(),
            VertexPoint::Multi(multi) => multi.mean(Point::lon),
        }
    }

    pub fn contains_from_point(&self) -> bool {
        match self {
            VertexPoint::Single(point) => point.contains_from_point(),
            VertexPoint::Multi(multi) => multi.points().iter().any(Point::contains_from_point),
        }
    }

    pub fn contains_to_point(&self) -> bool {
        match self {
            VertexPoint::Single(point) => point.contains_to_point(),
            VertexPoint::Multi(multi) => multi.points().iter().any(Point::contains_to_point),
        }
    }

    /// Kind of the point. A multipoint reports the kind of its first member.
    pub fn kind(&self) -> PointKind {
        match self {
            VertexPoint::Single(point) => point.kind(),
            VertexPoint::Multi(multi) => multi
                .points()
                .first()
                .map(Point::kind)
                .unwrap_or_default(),
        }
    }

    /// Identifier of a single point; `None` for a multipoint.
    pub fn id(&self) -> Option<Id> {
        match self {
            VertexPoint::Single(point) => Some(point.id()),
            VertexPoint::Multi(_) => None,
        }
    }

    /// Checks whether this point is, or contains, the point with the given identifier.
    pub fn contains(&self, id: Id) -> bool {
        match self {
            VertexPoint::Single(point) => point.id() == id,
            VertexPoint::Multi(multi) => multi.contains(id),
        }
    }

    /// Returns the multipoint, if this is one.
    pub fn as_multi(&self) -> Option<&MultiPoint> {
        match self {
            VertexPoint::Multi(multi) => Some(multi),
            VertexPoint::Single(_) => None,
        }
    }
}

impl From<Point> for VertexPoint {
    fn from(point: Point) -> Self {
        VertexPoint::Single(point)
    }
}

impl From<MultiPoint> for VertexPoint {
    fn from(multi: MultiPoint) -> Self {
        VertexPoint::Multi(multi)
    }
}
