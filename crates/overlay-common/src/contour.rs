//! Vector contour geometry handed from the tracer to the sinks.

use crate::color::Color;

/// A point in 2D space (output canvas units)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A connected run of contour vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    /// The last point connects back to the first.
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length along the polyline, including the closing edge.
    pub fn length(&self) -> f32 {
        let open: f32 = self
            .points
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + last.distance(first),
            _ => open,
        }
    }
}

/// All isolines traced for one threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPath {
    pub threshold: f32,
    /// Stroke color picked from the contour ramp.
    pub stroke: Color,
    pub polylines: Vec<Polyline>,
}

impl ContourPath {
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Polyline::len).sum()
    }
}

/// Contour paths in ascending threshold order, one per threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourSet {
    paths: Vec<ContourPath>,
}

impl ContourSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from paths, sorting by threshold and keeping the first
    /// path for any repeated threshold.
    pub fn from_paths(mut paths: Vec<ContourPath>) -> Self {
        paths.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        paths.dedup_by(|later, earlier| later.threshold == earlier.threshold);
        Self { paths }
    }

    pub fn paths(&self) -> &[ContourPath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn thresholds(&self) -> Vec<f32> {
        self.paths.iter().map(|p| p.threshold).collect()
    }

    /// Total vertex count across every path.
    pub fn point_count(&self) -> usize {
        self.paths.iter().map(ContourPath::point_count).sum()
    }
}
