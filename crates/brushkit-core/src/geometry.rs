//! Physical geometry in machine space
//!
//! All coordinates are millimeters with the machine's Y axis pointing up.

use serde::{Deserialize, Serialize};

/// A point in machine space (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A stroke: a polyline the brush traces in one continuous gesture.
///
/// Holds at least two points and never two identical consecutive points.
/// A path has no inherent direction until a consumer commits to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    /// Build a path, collapsing consecutive duplicate points.
    ///
    /// Returns `None` when fewer than two distinct points remain.
    pub fn new(mut points: Vec<Point>) -> Option<Self> {
        points.dedup();
        if points.len() < 2 {
            return None;
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Whether the path ends where it starts
    pub fn is_closed(&self) -> bool {
        self.first() == self.last()
    }

    /// The same stroke traversed end to start
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    /// Total polyline length (mm)
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}

/// Unordered strokes extracted for a single layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSet {
    paths: Vec<Path>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: Path) {
        self.paths.push(path);
    }

    /// Push a point run if it forms a valid path; returns whether it was kept
    pub fn push_points(&mut self, points: Vec<Point>) -> bool {
        match Path::new(points) {
            Some(path) => {
                self.paths.push(path);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    pub fn into_vec(self) -> Vec<Path> {
        self.paths
    }

    /// Sum of all stroke lengths (mm)
    pub fn total_length(&self) -> f64 {
        self.paths.iter().map(Path::length).sum()
    }
}

impl From<Vec<Path>> for PathSet {
    fn from(paths: Vec<Path>) -> Self {
        Self { paths }
    }
}

impl FromIterator<Path> for PathSet {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl Extend<Path> for PathSet {
    fn extend<I: IntoIterator<Item = Path>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

impl IntoIterator for PathSet {
    type Item = Path;
    type IntoIter = std::vec::IntoIter<Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}
