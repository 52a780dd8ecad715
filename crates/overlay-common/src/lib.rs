//! Common types and interfaces shared by the mask overlay crates.

pub mod color;
pub mod contour;
pub mod error;
pub mod frame;
pub mod loader;
pub mod raster;
pub mod sink;

pub use color::Color;
pub use contour::{ContourPath, ContourSet, Point, Polyline};
pub use error::{OverlayError, OverlayResult};
pub use frame::{OverlayFrame, OverlayVisibility};
pub use loader::RasterLoader;
pub use raster::{RasterImage, ScalarField};
pub use sink::OverlaySink;
