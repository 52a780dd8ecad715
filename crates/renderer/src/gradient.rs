//! Piecewise-linear color ramps for stroking contour levels.

use overlay_common::{Color, OverlayError, OverlayResult};

/// Threshold at which a ramp changes color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub threshold: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(threshold: f32, color: Color) -> Self {
        Self { threshold, color }
    }
}

/// Monotonic color ramp.
///
/// Values below the first stop take the first color, values above the last
/// stop take the last color, and values in between are interpolated
/// linearly between the two surrounding stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl Default for ColorRamp {
    /// Contour ramp of the mask viewer: transparent at 0.1, green at 0.4, red at 0.8.
    fn default() -> Self {
        Self {
            stops: vec![
                ColorStop::new(0.1, Color::TRANSPARENT),
                ColorStop::new(0.4, Color::GREEN),
                ColorStop::new(0.8, Color::RED),
            ],
        }
    }
}

impl ColorRamp {
    /// Build a ramp; thresholds must be finite and strictly increasing.
    pub fn new(stops: Vec<ColorStop>) -> OverlayResult<Self> {
        if stops.is_empty() {
            return Err(OverlayError::InvalidRamp(
                "ramp needs at least one color stop".to_string(),
            ));
        }
        if let Some(stop) = stops.iter().find(|s| !s.threshold.is_finite()) {
            return Err(OverlayError::InvalidRamp(format!(
                "threshold {} is not finite",
                stop.threshold
            )));
        }
        for pair in stops.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(OverlayError::InvalidRamp(format!(
                    "thresholds must be strictly increasing ({} follows {})",
                    pair[1].threshold, pair[0].threshold
                )));
            }
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Domain covered by the stops.
    pub fn domain(&self) -> (f32, f32) {
        // Non-empty by construction
        let first = self.stops[0].threshold;
        let last = self.stops[self.stops.len() - 1].threshold;
        (first, last)
    }

    /// Color for `value`.
    pub fn color_at(&self, value: f32) -> Color {
        let first = &self.stops[0];
        let last = &self.stops[self.stops.len() - 1];

        if value.is_nan() || value <= first.threshold {
            return first.color;
        }
        if value >= last.threshold {
            return last.color;
        }

        // First stop strictly above value; the previous one is at or below it
        let upper = self
            .stops
            .iter()
            .position(|s| s.threshold > value)
            .unwrap_or(self.stops.len() - 1);
        let low = &self.stops[upper - 1];
        let high = &self.stops[upper];

        if value == low.threshold {
            return low.color;
        }

        let t = (value - low.threshold) / (high.threshold - low.threshold);
        interpolate_color(low.color, high.color, t)
    }
}

/// Linear color interpolation.
///
/// A fully transparent endpoint borrows the other endpoint's RGB, so fading
/// in from transparent changes only alpha and never darkens the color.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let rgb1 = if color1.is_transparent() { color2 } else { color1 };
    let rgb2 = if color2.is_transparent() { color1 } else { color2 };

    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::rgba(
        mix(rgb1.r, rgb2.r),
        mix(rgb1.g, rgb2.g),
        mix(rgb1.b, rgb2.b),
        mix(color1.a, color2.a),
    )
}
