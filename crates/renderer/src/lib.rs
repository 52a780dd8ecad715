//! Pixel-level processing for segmentation mask overlays.
//!
//! - Fill recoloring of mask pixels (`remap`)
//! - Scalar field sampling (`field`)
//! - Contour lines via marching squares (`contour`)
//! - Color ramps for contour strokes (`gradient`)
//! - Stroking contour sets onto a canvas (`canvas`)
//! - PNG encoding of overlay rasters (`png`)

pub mod canvas;
pub mod contour;
pub mod field;
pub mod gradient;
pub mod png;
pub mod remap;
pub mod style;

pub use contour::{trace, trace_with_options, TraceOptions};
pub use field::{extract, extract_with, SampleChannel};
pub use gradient::{ColorRamp, ColorStop};
pub use remap::{apply_alpha_multiplier, remap};
pub use style::{ContourStyle, ThresholdSpec};
