//! Overlay sink that writes each presented layer to a PNG file.

use std::path::{Path, PathBuf};

use overlay_common::{ContourSet, OverlayResult, OverlaySink, RasterImage};
use overlay_renderer::canvas::render_contours;
use overlay_renderer::png::encode_raster;
use overlay_renderer::remap::apply_alpha_multiplier;
use tracing::{debug, trace};

/// Writes `frame_<index>_fill.png` and `frame_<index>_contours.png`.
///
/// The fill snapshot is the recolored mask with the alpha multiplier
/// applied, exactly as it would be composited. `clear` forgets what is
/// currently shown; files already written stay on disk.
#[derive(Debug)]
pub struct SnapshotSink {
    dir: PathBuf,
    shown: Vec<PathBuf>,
}

impl SnapshotSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> OverlayResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            shown: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files presented since the last clear.
    pub fn shown(&self) -> &[PathBuf] {
        &self.shown
    }

    fn write(&mut self, name: String, raster: &RasterImage) -> OverlayResult<()> {
        let png = encode_raster(raster)?;
        let path = self.dir.join(name);
        std::fs::write(&path, &png)?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote overlay snapshot");
        self.shown.push(path);
        Ok(())
    }
}

impl OverlaySink for SnapshotSink {
    fn clear(&mut self) -> OverlayResult<()> {
        trace!(count = self.shown.len(), "Clearing overlay");
        self.shown.clear();
        Ok(())
    }

    fn draw_fill(
        &mut self,
        frame_index: u32,
        buffer: &RasterImage,
        alpha_multiplier: f32,
    ) -> OverlayResult<()> {
        let composited = apply_alpha_multiplier(buffer, alpha_multiplier)?;
        self.write(format!("frame_{}_fill.png", frame_index), &composited)
    }

    fn draw_contours(
        &mut self,
        frame_index: u32,
        contours: &ContourSet,
        output_width: u32,
        output_height: u32,
        stroke_width: f32,
    ) -> OverlayResult<()> {
        let canvas = render_contours(contours, output_width, output_height, stroke_width)?;
        self.write(format!("frame_{}_contours.png", frame_index), &canvas)
    }
}
