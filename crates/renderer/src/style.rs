//! Style configuration for overlay rendering.

use std::path::Path;

use overlay_common::{Color, OverlayError, OverlayResult, ScalarField};
use serde::{Deserialize, Serialize};

pub use crate::contour::MAX_LEVEL_COUNT;

use crate::contour::{generate_levels, levels_by_interval, TraceOptions};
use crate::gradient::{ColorRamp, ColorStop};

/// Default contour stroke width in canvas units
pub const DEFAULT_STROKE_WIDTH: f32 = 1.2;

/// Default number of auto-generated contour levels
pub const DEFAULT_LEVEL_COUNT: usize = 10;

/// How contour thresholds are chosen for a frame.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdSpec {
    /// Fixed levels, used as given
    Explicit { levels: Vec<f32> },
    /// `count` evenly spaced levels inside the field's value range
    Count { count: usize },
    /// Multiples of `interval` inside the field's value range
    Interval { interval: f32 },
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        ThresholdSpec::Count {
            count: DEFAULT_LEVEL_COUNT,
        }
    }
}

impl ThresholdSpec {
    /// Resolve concrete thresholds for `field`.
    pub fn resolve(&self, field: &ScalarField) -> Vec<f32> {
        match self {
            ThresholdSpec::Explicit { levels } => levels.clone(),
            ThresholdSpec::Count { count } => match field.min_max() {
                Some((min, max)) => generate_levels(min, max, *count),
                None => vec![],
            },
            ThresholdSpec::Interval { interval } => match field.min_max() {
                Some((min, max)) => levels_by_interval(min, max, *interval),
                None => vec![],
            },
        }
    }
}

/// A single ramp stop as written in configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RampStopConfig {
    pub threshold: f32,
    pub color: Color,
}

/// Contour rendering options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContourStyle {
    pub thresholds: ThresholdSpec,
    pub stroke_width: f32,
    pub smoothing_passes: u32,
    pub ramp: Vec<RampStopConfig>,
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            thresholds: ThresholdSpec::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            smoothing_passes: 0,
            ramp: ColorRamp::default()
                .stops()
                .iter()
                .map(|s| RampStopConfig {
                    threshold: s.threshold,
                    color: s.color,
                })
                .collect(),
        }
    }
}

impl ContourStyle {
    /// Load contour style from a JSON string
    pub fn from_json(json_str: &str) -> OverlayResult<Self> {
        let style: Self = serde_json::from_str(json_str)?;
        style.validate()?;
        Ok(style)
    }

    /// Load contour style from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build the color ramp described by this style.
    pub fn color_ramp(&self) -> OverlayResult<ColorRamp> {
        ColorRamp::new(
            self.ramp
                .iter()
                .map(|s| ColorStop::new(s.threshold, s.color))
                .collect(),
        )
    }

    /// Tracing options (ramp + smoothing) for this style.
    pub fn trace_options(&self) -> OverlayResult<TraceOptions> {
        Ok(TraceOptions {
            smoothing_passes: self.smoothing_passes,
            ramp: self.color_ramp()?,
        })
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.stroke_width > 0.0 && self.stroke_width.is_finite()) {
            return Err(OverlayError::InvalidConfig(format!(
                "stroke width must be positive, got {}",
                self.stroke_width
            )));
        }
        match &self.thresholds {
            ThresholdSpec::Interval { interval } if !(*interval > 0.0) => {
                return Err(OverlayError::InvalidConfig(format!(
                    "threshold interval must be positive, got {}",
                    interval
                )));
            }
            // Sampled fields span at most [0, 1]
            ThresholdSpec::Interval { interval } if *interval < 1.0 / MAX_LEVEL_COUNT as f32 => {
                return Err(OverlayError::InvalidConfig(format!(
                    "threshold interval {} yields more than {} levels",
                    interval, MAX_LEVEL_COUNT
                )));
            }
            ThresholdSpec::Explicit { levels } if levels.iter().any(|l| !l.is_finite()) => {
                return Err(OverlayError::InvalidConfig(
                    "explicit thresholds must be finite".to_string(),
                ));
            }
            ThresholdSpec::Explicit { levels } if levels.len() > MAX_LEVEL_COUNT => {
                return Err(OverlayError::InvalidConfig(format!(
                    "{} explicit thresholds exceed the limit of {}",
                    levels.len(),
                    MAX_LEVEL_COUNT
                )));
            }
            ThresholdSpec::Count { count } if *count > MAX_LEVEL_COUNT => {
                return Err(OverlayError::InvalidConfig(format!(
                    "level count {} exceeds the limit of {}",
                    count, MAX_LEVEL_COUNT
                )));
            }
            _ => {}
        }
        self.color_ramp().map(|_| ())
    }
}
