//! Shared test utilities for the mask overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic mask rasters and scalar fields
//! - Fixed fixtures for the recoloring rules
//! - An in-memory raster loader with per-key latency
//! - A sink that records every call made to it
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_disc_mask, InMemoryLoader, RecordingSink};
//! ```

pub mod fixtures;
pub mod generators;
pub mod loader;
pub mod sink;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use loader::InMemoryLoader;
pub use sink::{RecordingSink, SinkEvent};

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of canvas points.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_point_approx_eq;
///
/// assert_point_approx_eq!(point, (1.5, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_point_approx_eq {
    ($point:expr, ($x:expr, $y:expr), $epsilon:expr) => {{
        let point = $point;
        $crate::assert_approx_eq!(point.x, $x, $epsilon);
        $crate::assert_approx_eq!(point.y, $y, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    use overlay_common::Point;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_point_approx_eq_passes() {
        assert_point_approx_eq!(Point::new(1.0001, 2.0001), (1.0, 2.0), 0.001);
    }
}
