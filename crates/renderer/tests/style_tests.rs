//! Tests for contour style configuration.

use overlay_common::Color;
use overlay_renderer::style::{ContourStyle, ThresholdSpec, DEFAULT_LEVEL_COUNT};
use test_utils::{create_constant_field, create_peak_field};

#[test]
fn test_default_thresholds_are_ten_interior_levels() {
    let field = create_peak_field(9, 9, 4.0);
    let levels = ThresholdSpec::default().resolve(&field);

    assert_eq!(levels.len(), DEFAULT_LEVEL_COUNT);
    assert!(levels.iter().all(|&l| l > 0.0 && l < 1.0));
}

#[test]
fn test_explicit_thresholds_pass_through() {
    let thresholds = ThresholdSpec::Explicit {
        levels: vec![0.1, 0.4, 0.8],
    };
    let field = create_constant_field(4, 4, 0.0);
    assert_eq!(thresholds.resolve(&field), vec![0.1, 0.4, 0.8]);
}

#[test]
fn test_interval_thresholds() {
    let thresholds = ThresholdSpec::Interval { interval: 0.25 };
    let field = create_peak_field(9, 9, 4.0);
    assert_eq!(thresholds.resolve(&field), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn test_style_from_json_with_count() {
    let style = ContourStyle::from_json(
        r#"{
            "thresholds": { "mode": "count", "count": 3 },
            "stroke_width": 2.0,
            "smoothing_passes": 1
        }"#,
    )
    .unwrap();

    assert_eq!(style.thresholds, ThresholdSpec::Count { count: 3 });
    assert_eq!(style.stroke_width, 2.0);

    let options = style.trace_options().unwrap();
    assert_eq!(options.smoothing_passes, 1);
    assert_eq!(options.ramp.color_at(0.8), Color::RED);
}

#[test]
fn test_style_rejects_bad_ramp() {
    let result = ContourStyle::from_json(
        r##"{
            "ramp": [
                { "threshold": 0.5, "color": "#ff0000" },
                { "threshold": 0.2, "color": "#00ff00" }
            ]
        }"##,
    );
    assert!(result.is_err());
}

#[test]
fn test_style_rejects_bad_color() {
    let result = ContourStyle::from_json(
        r#"{ "ramp": [ { "threshold": 0.5, "color": "not-a-color" } ] }"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_style_rejects_zero_stroke() {
    assert!(ContourStyle::from_json(r#"{ "stroke_width": 0.0 }"#).is_err());
}
