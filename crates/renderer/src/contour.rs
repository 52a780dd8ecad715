//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! Samples sit on integer grid coordinates: value `(x, y)` of the field is
//! the corner at `(x, y)`. Every 2x2 block of samples forms a cell; each
//! cell emits zero, one or two segments whose endpoints are linearly
//! interpolated along the cell edges. Segments from neighbouring cells share
//! edges, which is how they are joined into polylines.

use std::collections::{HashMap, VecDeque};

use overlay_common::{
    ContourPath, ContourSet, OverlayError, OverlayResult, Point, Polyline, ScalarField,
};
use rayon::prelude::*;

use crate::gradient::ColorRamp;

/// Identifies one edge of the sample grid.
///
/// Horizontal edges run from `(x, y)` to `(x + 1, y)`; vertical edges run
/// from `(x, y)` to `(x, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeId {
    Horizontal { x: u32, y: u32 },
    Vertical { x: u32, y: u32 },
}

/// A line segment crossing one marching squares cell
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub start_edge: EdgeId,
    pub end_edge: EdgeId,
}

/// Knobs for contour tracing beyond the thresholds themselves.
#[derive(Debug, Clone, Default)]
pub struct TraceOptions {
    /// Number of Chaikin smoothing passes (0 = no smoothing)
    pub smoothing_passes: u32,
    /// Ramp used to pick each path's stroke color
    pub ramp: ColorRamp,
}

/// Upper bound on contour levels per frame; each level is a full grid pass.
pub const MAX_LEVEL_COUNT: usize = 256;

/// Evenly spaced levels strictly inside `(min_value, max_value)`.
///
/// `count` levels split the range into `count + 1` equal bands, so neither
/// extreme is itself a level.
pub fn generate_levels(min_value: f32, max_value: f32, count: usize) -> Vec<f32> {
    if count == 0 || !min_value.is_finite() || !max_value.is_finite() || max_value <= min_value {
        return vec![];
    }

    let count = count.min(MAX_LEVEL_COUNT);
    let step = (max_value - min_value) / (count as f32 + 1.0);
    (1..=count).map(|i| min_value + step * i as f32).collect()
}

/// Every multiple of `interval` within `[min_value, max_value]`, at most
/// [`MAX_LEVEL_COUNT`] of them starting from the low end.
pub fn levels_by_interval(min_value: f32, max_value: f32, interval: f32) -> Vec<f32> {
    if interval <= 0.0 || !interval.is_finite() || max_value <= min_value {
        return vec![];
    }

    // Start from first multiple of interval above min_value
    let first = (min_value / interval).ceil() as i64;
    let tolerance = interval * 1e-4;

    let mut levels = Vec::new();
    let mut k = first;
    loop {
        let level = k as f32 * interval;
        if level > max_value + tolerance || levels.len() == MAX_LEVEL_COUNT {
            break;
        }
        levels.push(level);
        k += 1;
    }

    levels
}

/// Trace isolines of `field` at each threshold with default options.
///
/// See [`trace_with_options`].
pub fn trace(
    field: &ScalarField,
    output_width: u32,
    output_height: u32,
    thresholds: &[f32],
) -> OverlayResult<ContourSet> {
    trace_with_options(
        field,
        output_width,
        output_height,
        thresholds,
        &TraceOptions::default(),
    )
}

/// Trace isolines of `field` at each threshold.
///
/// The field must already be sampled at the output canvas resolution; a
/// mismatch is reported rather than resampled. Thresholds are sorted and
/// deduplicated, non-finite ones are dropped, and thresholds that produce no
/// lines are omitted from the result. A constant field yields an empty set.
///
/// Coordinates are multiplied by `output_width / output_height` and clamped
/// to the canvas.
pub fn trace_with_options(
    field: &ScalarField,
    output_width: u32,
    output_height: u32,
    thresholds: &[f32],
    options: &TraceOptions,
) -> OverlayResult<ContourSet> {
    if field.width() != output_width || field.height() != output_height {
        return Err(OverlayError::DimensionMismatch {
            field_width: field.width(),
            field_height: field.height(),
            output_width,
            output_height,
        });
    }

    let levels = normalize_thresholds(thresholds);
    if levels.is_empty() || field.is_constant() {
        return Ok(ContourSet::empty());
    }

    let width = field.width() as usize;
    let height = field.height() as usize;
    let scale = output_width as f32 / output_height as f32;
    let bounds = (output_width as f32, output_height as f32);

    let paths: Vec<ContourPath> = levels
        .par_iter()
        .filter_map(|&level| {
            let segments = march_squares(field.values(), width, height, level);
            if segments.is_empty() {
                return None;
            }

            let polylines: Vec<Polyline> = connect_segments(segments)
                .into_iter()
                .map(|line| smooth_polyline(&line, options.smoothing_passes))
                .map(|line| scale_polyline(line, scale, bounds))
                .collect();

            Some(ContourPath {
                threshold: level,
                stroke: options.ramp.color_at(level),
                polylines,
            })
        })
        .collect();

    let set = ContourSet::from_paths(paths);

    tracing::debug!(
        width = width,
        height = height,
        num_levels = levels.len(),
        num_paths = set.len(),
        total_points = set.point_count(),
        "Traced contours"
    );

    Ok(set)
}

fn normalize_thresholds(thresholds: &[f32]) -> Vec<f32> {
    let mut levels: Vec<f32> = thresholds.iter().copied().filter(|t| t.is_finite()).collect();
    levels.sort_by(f32::total_cmp);
    levels.dedup();
    levels
}

/// Marching squares over row-major `data` at a single level.
///
/// Corners with `value >= level` count as inside. Cells touching a NaN are
/// skipped.
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level { cell_index |= 1; }
            if tr >= level { cell_index |= 2; }
            if br >= level { cell_index |= 4; }
            if bl >= level { cell_index |= 8; }

            if cell_index == 0 || cell_index == 15 {
                continue;
            }

            let cell = Cell {
                x: x as u32,
                y: y as u32,
                tl,
                tr,
                br,
                bl,
                level,
            };
            cell.push_segments(cell_index, &mut segments);
        }
    }

    segments
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

struct Cell {
    x: u32,
    y: u32,
    tl: f32,
    tr: f32,
    br: f32,
    bl: f32,
    level: f32,
}

impl Cell {
    fn push_segments(&self, cell_index: u8, out: &mut Vec<Segment>) {
        use Side::*;

        let center_inside = (self.tl + self.tr + self.br + self.bl) / 4.0 >= self.level;

        match cell_index {
            1 | 14 => out.push(self.segment(Left, Top)),
            2 | 13 => out.push(self.segment(Top, Right)),
            3 | 12 => out.push(self.segment(Left, Right)),
            4 | 11 => out.push(self.segment(Right, Bottom)),
            6 | 9 => out.push(self.segment(Top, Bottom)),
            7 | 8 => out.push(self.segment(Left, Bottom)),
            // Saddles: the center sample decides which diagonal is connected
            5 if center_inside => {
                out.push(self.segment(Top, Right));
                out.push(self.segment(Left, Bottom));
            }
            5 => {
                out.push(self.segment(Left, Top));
                out.push(self.segment(Right, Bottom));
            }
            10 if center_inside => {
                out.push(self.segment(Left, Top));
                out.push(self.segment(Right, Bottom));
            }
            10 => {
                out.push(self.segment(Top, Right));
                out.push(self.segment(Left, Bottom));
            }
            _ => {}
        }
    }

    fn segment(&self, from: Side, to: Side) -> Segment {
        let (start_edge, start) = self.crossing(from);
        let (end_edge, end) = self.crossing(to);
        Segment {
            start,
            end,
            start_edge,
            end_edge,
        }
    }

    /// Where the level crosses one side of this cell.
    fn crossing(&self, side: Side) -> (EdgeId, Point) {
        let (x, y) = (self.x as f32, self.y as f32);
        match side {
            Side::Top => (
                EdgeId::Horizontal { x: self.x, y: self.y },
                interpolate_edge(x, y, x + 1.0, y, self.tl, self.tr, self.level),
            ),
            Side::Bottom => (
                EdgeId::Horizontal { x: self.x, y: self.y + 1 },
                interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, self.bl, self.br, self.level),
            ),
            Side::Left => (
                EdgeId::Vertical { x: self.x, y: self.y },
                interpolate_edge(x, y, x, y + 1.0, self.tl, self.bl, self.level),
            ),
            Side::Right => (
                EdgeId::Vertical { x: self.x + 1, y: self.y },
                interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, self.tr, self.br, self.level),
            ),
        }
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    val1: f32,
    val2: f32,
    level: f32,
) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);

    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Connect line segments into continuous polylines.
///
/// Two segments connect when they cross the same grid edge. A chain that
/// returns to its starting edge becomes a closed polyline; chains that run
/// into the grid border stay open.
pub fn connect_segments(segments: Vec<Segment>) -> Vec<Polyline> {
    if segments.is_empty() {
        return vec![];
    }

    let mut by_edge: HashMap<EdgeId, Vec<usize>> = HashMap::with_capacity(segments.len() * 2);
    for (i, seg) in segments.iter().enumerate() {
        by_edge.entry(seg.start_edge).or_default().push(i);
        by_edge.entry(seg.end_edge).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;

        let first = &segments[start_idx];
        let mut points = VecDeque::from([first.start, first.end]);
        let head_edge = first.start_edge;
        let mut tail_edge = first.end_edge;
        let mut closed = false;

        // Walk forward from the end edge
        while let Some((next, edge, point)) = next_segment(&segments, &by_edge, &used, tail_edge) {
            used[next] = true;
            tail_edge = edge;
            if edge == head_edge {
                closed = true;
                break;
            }
            points.push_back(point);
        }

        // Then backward from the start edge
        if !closed {
            let mut head = head_edge;
            while let Some((next, edge, point)) = next_segment(&segments, &by_edge, &used, head) {
                used[next] = true;
                head = edge;
                points.push_front(point);
            }
        }

        if points.len() >= 2 {
            polylines.push(Polyline::new(points.into_iter().collect(), closed));
        }
    }

    polylines
}

/// The unused segment touching `edge`, with its far edge and far point.
fn next_segment(
    segments: &[Segment],
    by_edge: &HashMap<EdgeId, Vec<usize>>,
    used: &[bool],
    edge: EdgeId,
) -> Option<(usize, EdgeId, Point)> {
    let candidates = by_edge.get(&edge)?;
    let idx = candidates.iter().copied().find(|&i| !used[i])?;
    let seg = &segments[idx];
    if seg.start_edge == edge {
        Some((idx, seg.end_edge, seg.end))
    } else {
        Some((idx, seg.start_edge, seg.start))
    }
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_polyline(line: &Polyline, iterations: u32) -> Polyline {
    if iterations == 0 || line.points.len() < 3 {
        return line.clone();
    }

    let mut points = line.points.clone();

    for _ in 0..iterations {
        let mut new_points = Vec::with_capacity(points.len() * 2);

        for i in 0..points.len() {
            let p1 = points[i];
            let p2 = if line.closed {
                points[(i + 1) % points.len()]
            } else if i + 1 < points.len() {
                points[i + 1]
            } else {
                break;
            };

            // 25% and 75% along the segment
            new_points.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            new_points.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }

        // Open lines keep their endpoints on the grid border
        if !line.closed {
            if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                new_points.insert(0, first);
                new_points.push(last);
            }
        }

        points = new_points;
    }

    Polyline::new(points, line.closed)
}

fn scale_polyline(mut line: Polyline, scale: f32, (max_x, max_y): (f32, f32)) -> Polyline {
    for p in &mut line.points {
        p.x = (p.x * scale).clamp(0.0, max_x);
        p.y = (p.y * scale).clamp(0.0, max_y);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_levels() {
        let levels = generate_levels(0.0, 1.0, 3);
        assert_eq!(levels, vec![0.25, 0.5, 0.75]);
        assert!(generate_levels(0.5, 0.5, 3).is_empty());
        assert!(generate_levels(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_levels_by_interval() {
        let levels = levels_by_interval(0.0, 20.0, 5.0);
        assert_eq!(levels, vec![0.0, 5.0, 10.0, 15.0, 20.0]);

        let levels = levels_by_interval(2.0, 18.0, 5.0);
        assert_eq!(levels, vec![5.0, 10.0, 15.0]);
    }

    #[test]
    fn test_level_generation_is_capped() {
        let levels = levels_by_interval(0.0, 1.0, 1e-9);
        assert_eq!(levels.len(), MAX_LEVEL_COUNT);
        assert_eq!(levels[0], 0.0);

        assert_eq!(generate_levels(0.0, 1.0, 1_000_000).len(), MAX_LEVEL_COUNT);
    }

    #[test]
    fn test_interpolate_edge() {
        let p = interpolate_edge(0.0, 0.0, 1.0, 0.0, 0.0, 10.0, 5.0);
        assert!((p.x - 0.5).abs() < 0.01);
        assert!((p.y - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_march_squares_flat() {
        let data = vec![5.0; 9];
        let segments = march_squares(&data, 3, 3, 5.0);
        assert_eq!(segments.len(), 0);
    }

    #[test]
    fn test_peak_closes_into_ring() {
        let data = vec![
            0.0, 0.0, 0.0,
            0.0, 10.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let segments = march_squares(&data, 3, 3, 5.0);
        assert_eq!(segments.len(), 4);

        let lines = connect_segments(segments);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 4);
    }

    #[test]
    fn test_normalize_thresholds() {
        let levels = normalize_thresholds(&[0.5, f32::NAN, 0.2, 0.5, f32::INFINITY]);
        assert_eq!(levels, vec![0.2, 0.5]);
    }
}
