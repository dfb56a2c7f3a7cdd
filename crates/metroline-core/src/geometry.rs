//! Planar geometry used by the schematic layout passes.
//!
//! # Overview
//!
//! - [`Coord`] - A position in the layout plane
//! - [`Vector`] - A direction or displacement in the layout plane
//! - [`GridCoord`] - An integer cell index on the rendering grid
//! - [`GridEdge`] - A unit step between two neighbouring grid cells
//! - [`Axis`] - A horizontal or vertical grid line
//! - [`median`] - Median of a sequence of values
//! - [`lat_lon_to_spherical_mercator`] - Geographic to planar projection
//!
//! # Coordinate System
//!
//! Vertices start out in spherical-mercator meters (X east, Y north). The
//! 1-D linearizer rewrites them into diagram units where the trunk runs
//! along the X axis starting at the origin, and grid snapping rewrites them
//! into exact multiples of the grid cell size.

use std::f64::consts::PI;

/// Equatorial earth radius in meters used by the spherical-mercator projection.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// A position in the layout plane.
///
/// # Examples
///
/// ```
/// # use metroline_core::geometry::Coord;
/// let a = Coord::new(0.0, 0.0);
/// let b = Coord::new(3.0, 4.0);
///
/// assert_eq!(a.distance(b), 5.0);
/// assert_eq!(b.sub(a).length(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coord {
    x: f64,
    y: f64,
}

impl Coord {
    /// Creates a new coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate
    pub fn y(self) -> f64 {
        self.y
    }

    /// Moves this coordinate by the given vector
    pub fn translate(self, vector: Vector) -> Self {
        Self {
            x: self.x + vector.x,
            y: self.y + vector.y,
        }
    }

    /// Returns the displacement from `other` to this coordinate
    pub fn sub(self, other: Coord) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another coordinate
    pub fn distance(self, other: Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rounds both components to the nearest multiple of `cell_size`.
    pub fn quantize(self, cell_size: f64) -> Self {
        GridCoord::from_coord(self, cell_size).to_coord(cell_size)
    }
}

/// A direction or displacement in the layout plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    x: f64,
    y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    /// Euclidean length of the vector
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the unit vector pointing the same way.
    ///
    /// A zero vector has no direction and is returned unchanged.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        Self {
            x: self.x / len,
            y: self.y / len,
        }
    }

    /// Multiplies both components by `factor`
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Rotates the vector a quarter turn: `(x, y) -> (y, -x)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use metroline_core::geometry::Vector;
    /// let east = Vector::new(1.0, 0.0);
    /// assert_eq!(east.perpendicular(), Vector::new(0.0, -1.0));
    /// ```
    pub fn perpendicular(self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product
    pub fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Checks whether two vectors lie on the same line (either orientation).
    pub fn is_parallel(self, other: Vector) -> bool {
        let scale = self.length() * other.length();
        scale == 0.0 || (self.cross(other) / scale).abs() < 1e-9
    }
}

/// Integer cell index on the rendering grid.
///
/// Grid coordinates are expressed in cells, not in layout units; multiply by
/// the cell size to get back to the layout plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    x: i64,
    y: i64,
}

impl GridCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> i64 {
        self.x
    }

    pub fn y(self) -> i64 {
        self.y
    }

    /// Returns the cell nearest to `coord`. Halfway positions go to the
    /// cell on the positive side.
    pub fn from_coord(coord: Coord, cell_size: f64) -> Self {
        Self {
            x: round_half_up(coord.x / cell_size),
            y: round_half_up(coord.y / cell_size),
        }
    }

    /// Returns the layout-plane position of this cell.
    pub fn to_coord(self, cell_size: f64) -> Coord {
        Coord::new(self.x as f64 * cell_size, self.y as f64 * cell_size)
    }

    /// Returns the cell displaced by `(dx, dy)` cells.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the cells visited walking from this cell to `target`, both
    /// ends included.
    ///
    /// The walk moves diagonally while both axes still differ and then
    /// straight along the remaining axis, so every step is between
    /// neighbouring cells.
    ///
    /// # Examples
    ///
    /// ```
    /// # use metroline_core::geometry::GridCoord;
    /// let path = GridCoord::new(0, 0).path_to(GridCoord::new(3, 1));
    /// assert_eq!(
    ///     path,
    ///     vec![
    ///         GridCoord::new(0, 0),
    ///         GridCoord::new(1, 1),
    ///         GridCoord::new(2, 1),
    ///         GridCoord::new(3, 1),
    ///     ]
    /// );
    /// ```
    pub fn path_to(self, target: GridCoord) -> Vec<GridCoord> {
        let steps = (target.x - self.x).abs().max((target.y - self.y).abs());
        let mut path = Vec::with_capacity(steps as usize + 1);
        let mut current = self;
        path.push(current);
        while current != target {
            current = current.offset(
                (target.x - current.x).signum(),
                (target.y - current.y).signum(),
            );
            path.push(current);
        }
        path
    }
}

/// A unit step of the rendering grid between two neighbouring cells.
///
/// The endpoints are kept in canonical (sorted) order, so the same step
/// walked in either direction yields the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridEdge {
    a: GridCoord,
    b: GridCoord,
}

impl GridEdge {
    pub fn new(a: GridCoord, b: GridCoord) -> Self {
        if b < a { Self { a: b, b: a } } else { Self { a, b } }
    }

    pub fn a(self) -> GridCoord {
        self.a
    }

    pub fn b(self) -> GridCoord {
        self.b
    }

    /// Returns the grid line this step lies on, or `None` for diagonal steps.
    pub fn axis(self) -> Option<Axis> {
        if self.a.x == self.b.x {
            Some(Axis::Vertical { x: self.a.x })
        } else if self.a.y == self.b.y {
            Some(Axis::Horizontal { y: self.a.y })
        } else {
            None
        }
    }
}

impl std::fmt::Display for GridEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}_{}", self.a.x, self.a.y, self.b.x, self.b.y)
    }
}

/// A full horizontal or vertical line of the rendering grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The line of cells sharing column `x`.
    Vertical { x: i64 },
    /// The line of cells sharing row `y`.
    Horizontal { y: i64 },
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertical { x } => write!(f, "x_{x}"),
            Self::Horizontal { y } => write!(f, "y_{y}"),
        }
    }
}

/// Computes the median of a sequence of values.
///
/// For an even number of values the mean of the two middle values is
/// returned. Returns `None` when the sequence is empty.
///
/// # Examples
///
/// ```
/// # use metroline_core::geometry::median;
/// assert_eq!(median([3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median([4.0, 1.0, 2.0, 3.0]), Some(2.5));
/// assert_eq!(median(std::iter::empty()), None);
/// ```
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let half = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[half])
    } else {
        Some((values[half - 1] + values[half]) / 2.0)
    }
}

/// Projects latitude/longitude degrees to spherical-mercator meters.
pub fn lat_lon_to_spherical_mercator(lat: f64, lon: f64) -> Coord {
    let x = EARTH_RADIUS * lon * PI / 180.0;
    let y = EARTH_RADIUS * (PI / 4.0 + lat * PI / 360.0).tan().ln();
    Coord::new(x, y)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_coord_distance_and_sub() {
        let a = Coord::new(1.0, 1.0);
        let b = Coord::new(4.0, 5.0);

        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.sub(a), Vector::new(3.0, 4.0));
        assert_eq!(a.translate(Vector::new(3.0, 4.0)), b);
    }

    #[test]
    fn test_vector_normalize() {
        let v = Vector::new(0.0, -7.0).normalize();
        assert_eq!(v, Vector::new(0.0, -1.0));

        let zero = Vector::default().normalize();
        assert_eq!(zero, Vector::default());
    }

    #[test]
    fn test_vector_parallel() {
        let east = Vector::new(2.0, 0.0);
        assert!(east.is_parallel(Vector::new(-5.0, 0.0)));
        assert!(!east.is_parallel(Vector::new(1.0, 1.0)));
        assert!(east.is_parallel(east.perpendicular().perpendicular()));
    }

    #[test]
    fn test_grid_coord_roundtrip() {
        let cell = GridCoord::from_coord(Coord::new(149.0, -251.0), 100.0);
        assert_eq!(cell, GridCoord::new(1, -3));
        assert_eq!(cell.to_coord(100.0), Coord::new(100.0, -300.0));
        assert_eq!(cell.offset(-1, 2), GridCoord::new(0, -1));
    }

    #[test]
    fn test_grid_coord_halves_round_up() {
        assert_eq!(GridCoord::from_coord(Coord::new(-50.0, 50.0), 100.0), GridCoord::new(0, 1));
        assert_eq!(GridCoord::from_coord(Coord::new(-150.0, 250.0), 100.0), GridCoord::new(-1, 3));
        assert_eq!(Coord::new(-50.0, -49.0).quantize(100.0), Coord::new(0.0, 0.0));
    }

    #[test]
    fn test_path_to_straight_and_empty() {
        let start = GridCoord::new(2, 2);
        assert_eq!(start.path_to(start), vec![start]);

        let path = start.path_to(GridCoord::new(2, -1));
        assert_eq!(path.len(), 4);
        assert!(path.iter().all(|cell| cell.x() == 2));
    }

    #[test]
    fn test_grid_edge_is_canonical() {
        let a = GridCoord::new(1, 0);
        let b = GridCoord::new(0, 0);
        assert_eq!(GridEdge::new(a, b), GridEdge::new(b, a));
        assert_eq!(GridEdge::new(a, b).a(), b);
        assert_eq!(GridEdge::new(a, b).to_string(), "0_0_1_0");
    }

    #[test]
    fn test_grid_edge_axis() {
        let horizontal = GridEdge::new(GridCoord::new(0, 4), GridCoord::new(1, 4));
        let vertical = GridEdge::new(GridCoord::new(-2, 0), GridCoord::new(-2, 1));
        let diagonal = GridEdge::new(GridCoord::new(0, 0), GridCoord::new(1, 1));

        assert_eq!(horizontal.axis(), Some(Axis::Horizontal { y: 4 }));
        assert_eq!(vertical.axis(), Some(Axis::Vertical { x: -2 }));
        assert_eq!(diagonal.axis(), None);
        assert_eq!(Axis::Vertical { x: -2 }.to_string(), "x_-2");
    }

    #[test]
    fn test_quantize() {
        let q = Coord::new(260.0, 40.0).quantize(100.0);
        assert_eq!(q, Coord::new(300.0, 0.0));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median([5.0]), Some(5.0));
        assert_eq!(median([9.0, -1.0, 4.0]), Some(4.0));
        assert_eq!(median([1.0, 2.0, 10.0, 20.0]), Some(6.0));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn test_mercator_origin() {
        let origin = lat_lon_to_spherical_mercator(0.0, 0.0);
        assert_approx_eq!(f64, origin.x(), 0.0);
        assert_approx_eq!(f64, origin.y(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mercator_longitude_scale() {
        let p = lat_lon_to_spherical_mercator(0.0, 180.0);
        assert_approx_eq!(f64, p.x(), EARTH_RADIUS * PI, epsilon = 1e-6);

        let north = lat_lon_to_spherical_mercator(45.0, 0.0);
        let south = lat_lon_to_spherical_mercator(-45.0, 0.0);
        assert_approx_eq!(f64, north.y(), -south.y(), epsilon = 1e-6);
        assert!(north.y() > 0.0);
    }
}
