//! Fill-overlay recoloring for segmentation masks.
//!
//! Each pixel is classified by the sum of its original R, G and B channels:
//!
//! | sum        | output                               |
//! |------------|--------------------------------------|
//! | `< 10`     | alpha forced to 0, RGB kept          |
//! | `765`      | RGB `(191, 0, 255)`, alpha kept      |
//! | `381`      | RGB `(230, 230, 0)`, alpha kept      |
//! | otherwise  | unchanged                            |
//!
//! Neither replacement color sums to 765 or 381, so remapping is idempotent.
//! The display-time alpha multiplier is applied separately by
//! [`apply_alpha_multiplier`].

use overlay_common::{Color, OverlayError, OverlayResult, RasterImage};
use rayon::prelude::*;

/// Channel sum below which a pixel is treated as background.
pub const SUPPRESS_BELOW: u16 = 10;

/// Channel sum of a pure white pixel.
pub const WHITE_SUM: u16 = 765;

/// Channel sum of the mid-grey (127, 127, 127) label.
pub const MID_GREY_SUM: u16 = 381;

/// Alpha multiplier the viewer applies to the fill overlay.
pub const DEFAULT_ALPHA_MULTIPLIER: f32 = 0.7;

/// Minimum pixels to benefit from per-scanline parallelism
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Recolor a single RGBA pixel.
#[inline]
pub fn remap_pixel(pixel: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = pixel;
    let sum = r as u16 + g as u16 + b as u16;

    if sum < SUPPRESS_BELOW {
        [r, g, b, 0]
    } else if sum == WHITE_SUM {
        [Color::MAGENTA.r, Color::MAGENTA.g, Color::MAGENTA.b, a]
    } else if sum == MID_GREY_SUM {
        [Color::YELLOW.r, Color::YELLOW.g, Color::YELLOW.b, a]
    } else {
        pixel
    }
}

/// Produce the recolored fill overlay for a mask raster.
///
/// The input is left untouched; a new buffer of the same size is returned.
pub fn remap(raster: &RasterImage) -> RasterImage {
    let src = raster.pixels();
    let mut out = vec![0u8; src.len()];

    if raster.pixel_count() >= PARALLEL_THRESHOLD {
        let row_bytes = raster.row_bytes();
        out.par_chunks_mut(row_bytes)
            .zip(src.par_chunks(row_bytes))
            .for_each(|(dst_row, src_row)| remap_row(src_row, dst_row));
    } else {
        remap_row(src, &mut out);
    }

    tracing::trace!(
        width = raster.width(),
        height = raster.height(),
        "Remapped mask raster"
    );

    raster.with_same_shape(out)
}

fn remap_row(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&remap_pixel([s[0], s[1], s[2], s[3]]));
    }
}

/// Scale every pixel's alpha by `multiplier`, producing the buffer as it is
/// actually seen on screen.
///
/// Suppressed pixels have alpha 0 and therefore stay fully transparent.
pub fn apply_alpha_multiplier(raster: &RasterImage, multiplier: f32) -> OverlayResult<RasterImage> {
    if !(0.0..=1.0).contains(&multiplier) {
        return Err(OverlayError::InvalidConfig(format!(
            "alpha multiplier must be within [0, 1], got {}",
            multiplier
        )));
    }

    let mut out = raster.pixels().to_vec();
    out.par_chunks_mut(4).for_each(|px| {
        px[3] = scale_alpha(px[3], multiplier);
    });

    Ok(raster.with_same_shape(out))
}

#[inline]
fn scale_alpha(alpha: u8, multiplier: f32) -> u8 {
    if alpha == 0 {
        return 0;
    }
    (alpha as f32 * multiplier).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_pixel_classes() {
        assert_eq!(remap_pixel([3, 3, 3, 200]), [3, 3, 3, 0]);
        assert_eq!(remap_pixel([255, 255, 255, 90]), [191, 0, 255, 90]);
        assert_eq!(remap_pixel([127, 127, 127, 255]), [230, 230, 0, 255]);
        assert_eq!(remap_pixel([10, 10, 10, 255]), [10, 10, 10, 255]);
    }

    #[test]
    fn test_sum_boundary() {
        // 9 is suppressed, 10 is not
        assert_eq!(remap_pixel([9, 0, 0, 255])[3], 0);
        assert_eq!(remap_pixel([10, 0, 0, 255]), [10, 0, 0, 255]);
    }

    #[test]
    fn test_non_grey_sum_381_is_recolored() {
        // Classification is by sum, not by R=G=B
        assert_eq!(remap_pixel([255, 126, 0, 40]), [230, 230, 0, 40]);
    }

    #[test]
    fn test_replacement_colors_are_fixed_points() {
        assert_eq!(remap_pixel([191, 0, 255, 7]), [191, 0, 255, 7]);
        assert_eq!(remap_pixel([230, 230, 0, 7]), [230, 230, 0, 7]);
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(scale_alpha(0, 0.7), 0);
        assert_eq!(scale_alpha(200, 0.7), 140);
        assert_eq!(scale_alpha(255, 1.0), 255);
        assert_eq!(scale_alpha(100, 1.0), 100);
        assert_eq!(scale_alpha(100, 0.0), 0);
    }
}
