//! Rasterizing contour sets with tiny-skia.

use overlay_common::{ContourSet, OverlayError, OverlayResult, Polyline, RasterImage};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Stroke every path of `contours` onto a transparent canvas.
///
/// Paths are drawn in ascending threshold order with their own stroke color,
/// round caps and joins, and no fill. The result is straight (not
/// premultiplied) RGBA.
pub fn render_contours(
    contours: &ContourSet,
    width: u32,
    height: u32,
    stroke_width: f32,
) -> OverlayResult<RasterImage> {
    if width == 0 || height == 0 {
        return Ok(RasterImage::transparent(width, height));
    }

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        OverlayError::Encode(format!("cannot allocate {}x{} canvas", width, height))
    })?;

    let mut stroke = Stroke::default();
    stroke.width = stroke_width;
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Round;

    for path in contours.paths() {
        if path.stroke.is_transparent() {
            continue;
        }

        let mut paint = Paint::default();
        paint.set_color_rgba8(path.stroke.r, path.stroke.g, path.stroke.b, path.stroke.a);
        paint.anti_alias = true;

        for polyline in &path.polylines {
            if let Some(skia_path) = build_path(polyline) {
                pixmap.stroke_path(&skia_path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RasterImage::new(width, height, pixels)
}

fn build_path(polyline: &Polyline) -> Option<tiny_skia::Path> {
    let (first, rest) = polyline.points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    if polyline.closed {
        pb.close();
    }
    pb.finish()
}
