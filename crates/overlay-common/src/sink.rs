//! Drawing boundary that receives finished overlays.

use crate::contour::ContourSet;
use crate::error::OverlayResult;
use crate::raster::RasterImage;

/// Receives overlay layers for display.
///
/// Callers always `clear` before drawing a new frame, so an implementation
/// never has to merge stale and fresh content.
pub trait OverlaySink: Send {
    /// Remove whatever overlay is currently shown.
    fn clear(&mut self) -> OverlayResult<()>;

    /// Show the recolored mask, with every pixel's alpha scaled by `alpha_multiplier`.
    fn draw_fill(&mut self, frame_index: u32, buffer: &RasterImage, alpha_multiplier: f32)
        -> OverlayResult<()>;

    /// Stroke every contour path on an `output_width` x `output_height` canvas.
    fn draw_contours(
        &mut self,
        frame_index: u32,
        contours: &ContourSet,
        output_width: u32,
        output_height: u32,
        stroke_width: f32,
    ) -> OverlayResult<()>;
}
