//! Tests for contour line (isoline) tracing.

use overlay_common::{OverlayError, ScalarField};
use overlay_renderer::contour::{
    connect_segments, generate_levels, levels_by_interval, march_squares, smooth_polyline, trace,
    trace_with_options, TraceOptions,
};
use overlay_renderer::gradient::ColorRamp;
use test_utils::{
    assert_point_approx_eq, create_constant_field, create_peak_field, create_red_ramp_mask,
};

// ============================================================================
// Level generation
// ============================================================================

#[test]
fn test_generate_levels_excludes_extremes() {
    let levels = generate_levels(0.0, 1.0, 4);
    assert_eq!(levels.len(), 4);
    assert!(levels.iter().all(|&l| l > 0.0 && l < 1.0));
    assert!(levels.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_generate_levels_degenerate_range() {
    assert!(generate_levels(0.3, 0.3, 10).is_empty());
    assert!(generate_levels(0.8, 0.2, 10).is_empty());
    assert!(generate_levels(f32::NAN, 1.0, 10).is_empty());
}

#[test]
fn test_levels_by_interval_negative_range() {
    let levels = levels_by_interval(-20.0, 20.0, 10.0);
    assert_eq!(levels, vec![-20.0, -10.0, 0.0, 10.0, 20.0]);
}

#[test]
fn test_levels_by_interval_invalid_interval() {
    assert!(levels_by_interval(0.0, 1.0, 0.0).is_empty());
    assert!(levels_by_interval(0.0, 1.0, -0.5).is_empty());
}

// ============================================================================
// Marching squares cases
// ============================================================================

#[test]
fn test_single_corner_cell() {
    let data = vec![1.0, 0.0, 0.0, 0.0];
    let segments = march_squares(&data, 2, 2, 0.5);
    assert_eq!(segments.len(), 1);

    let seg = &segments[0];
    assert_point_approx_eq!(seg.start, (0.0, 0.5), 1e-5);
    assert_point_approx_eq!(seg.end, (0.5, 0.0), 1e-5);
}

#[test]
fn test_saddle_with_inside_center_connects_around_low_corners() {
    // tl and br high, center average 0.5 counts as inside
    let data = vec![1.0, 0.0, 0.0, 1.0];
    let segments = march_squares(&data, 2, 2, 0.5);
    assert_eq!(segments.len(), 2);

    assert_point_approx_eq!(segments[0].start, (0.5, 0.0), 1e-5);
    assert_point_approx_eq!(segments[0].end, (1.0, 0.5), 1e-5);
    assert_point_approx_eq!(segments[1].start, (0.0, 0.5), 1e-5);
    assert_point_approx_eq!(segments[1].end, (0.5, 1.0), 1e-5);
}

#[test]
fn test_saddle_with_outside_center_isolates_high_corners() {
    let data = vec![1.0, 0.0, 0.0, 1.0];
    let segments = march_squares(&data, 2, 2, 0.6);
    assert_eq!(segments.len(), 2);

    // Cut off the top-left corner first
    assert_point_approx_eq!(segments[0].start, (0.0, 0.4), 1e-5);
    assert_point_approx_eq!(segments[0].end, (0.4, 0.0), 1e-5);
}

#[test]
fn test_corner_equal_to_level_is_inside() {
    let data = vec![0.5, 0.0, 0.0, 0.0];
    let segments = march_squares(&data, 2, 2, 0.5);
    assert_eq!(segments.len(), 1);
}

#[test]
fn test_nan_cells_are_skipped() {
    let data = vec![1.0, f32::NAN, 0.0, 0.0];
    assert!(march_squares(&data, 2, 2, 0.5).is_empty());
}

#[test]
fn test_grid_too_small() {
    assert!(march_squares(&[1.0, 0.0], 2, 1, 0.5).is_empty());
    assert!(connect_segments(vec![]).is_empty());
}

#[test]
fn test_border_crossing_line_stays_open() {
    // Vertical boundary crossing the whole grid
    let data = vec![
        0.0, 1.0, 1.0,
        0.0, 1.0, 1.0,
        0.0, 1.0, 1.0,
    ];
    let lines = connect_segments(march_squares(&data, 3, 3, 0.5));
    assert_eq!(lines.len(), 1);
    assert!(!lines[0].closed);
    assert_eq!(lines[0].points.len(), 3);
    assert!(lines[0].points.iter().all(|p| (p.x - 0.5).abs() < 1e-5));
}

// ============================================================================
// trace
// ============================================================================

#[test]
fn test_trace_constant_field_is_empty() {
    let field = create_constant_field(8, 8, 0.4);
    let set = trace(&field, 8, 8, &[0.1, 0.4, 0.8]).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_trace_max_below_lowest_threshold_is_empty() {
    let field = create_peak_field(9, 9, 4.0);
    let set = trace(&field, 9, 9, &[1.5, 2.0]).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_trace_dimension_mismatch() {
    let field = create_peak_field(9, 9, 4.0);
    let err = trace(&field, 320, 320, &[0.5]).unwrap_err();
    match err {
        OverlayError::DimensionMismatch {
            field_width,
            output_width,
            ..
        } => {
            assert_eq!(field_width, 9);
            assert_eq!(output_width, 320);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trace_peak_gives_closed_rings_in_order() {
    let field = create_peak_field(9, 9, 4.0);
    let set = trace(&field, 9, 9, &[0.75, 0.25, 0.5, 0.5]).unwrap();

    assert_eq!(set.thresholds(), vec![0.25, 0.5, 0.75]);
    let ramp = ColorRamp::default();
    for path in set.paths() {
        assert_eq!(path.polylines.len(), 1);
        assert!(path.polylines[0].closed);
        assert_eq!(path.stroke, ramp.color_at(path.threshold));
    }
}

#[test]
fn test_trace_rings_shrink_with_threshold() {
    let field = create_peak_field(17, 17, 8.0);
    let set = trace(&field, 17, 17, &[0.2, 0.6]).unwrap();

    let lengths: Vec<f32> = set
        .paths()
        .iter()
        .map(|p| p.polylines[0].length())
        .collect();
    assert!(lengths[0] > lengths[1]);
}

#[test]
fn test_trace_coordinates_within_canvas() {
    // 6x3 ramp: output aspect 2:1, coordinates are post-scaled and clamped
    let raster = create_red_ramp_mask(6, 3);
    let field = overlay_renderer::field::extract(&raster);
    let set = trace(&field, 6, 3, &[0.3, 0.7]).unwrap();

    assert!(!set.is_empty());
    for path in set.paths() {
        for line in &path.polylines {
            for p in &line.points {
                assert!(p.x >= 0.0 && p.x <= 6.0, "x out of range: {}", p.x);
                assert!(p.y >= 0.0 && p.y <= 3.0, "y out of range: {}", p.y);
            }
        }
    }
}

#[test]
fn test_trace_square_canvas_keeps_grid_coordinates() {
    let data = vec![
        0.0, 1.0, 1.0,
        0.0, 1.0, 1.0,
        0.0, 1.0, 1.0,
    ];
    let field = ScalarField::new(3, 3, data).unwrap();
    let set = trace(&field, 3, 3, &[0.5]).unwrap();

    let line = &set.paths()[0].polylines[0];
    assert!(line.points.iter().all(|p| (p.x - 0.5).abs() < 1e-5));
}

#[test]
fn test_trace_with_smoothing_adds_points() {
    let field = create_peak_field(9, 9, 4.0);
    let plain = trace(&field, 9, 9, &[0.5]).unwrap();
    let smoothed = trace_with_options(
        &field,
        9,
        9,
        &[0.5],
        &TraceOptions {
            smoothing_passes: 2,
            ..TraceOptions::default()
        },
    )
    .unwrap();

    assert!(smoothed.point_count() > plain.point_count());
    assert!(smoothed.paths()[0].polylines[0].closed);
}

#[test]
fn test_trace_no_thresholds() {
    let field = create_peak_field(9, 9, 4.0);
    assert!(trace(&field, 9, 9, &[]).unwrap().is_empty());
    assert!(trace(&field, 9, 9, &[f32::NAN]).unwrap().is_empty());
}

// ============================================================================
// Smoothing
// ============================================================================

#[test]
fn test_smoothing_keeps_open_endpoints() {
    let field = ScalarField::new(
        3,
        3,
        vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    )
    .unwrap();
    let lines = connect_segments(march_squares(field.values(), 3, 3, 0.5));
    let line = &lines[0];
    assert!(!line.closed);

    let smoothed = smooth_polyline(line, 1);
    assert_eq!(smoothed.points.first(), line.points.first());
    assert_eq!(smoothed.points.last(), line.points.last());
}
