//! Scalar field extraction from mask rasters.
//!
//! Masks are greyscale (R = G = B), so the red channel alone carries the
//! intensity. Luminance sampling exists for non-greyscale sources but is
//! never the default.

use overlay_common::{RasterImage, ScalarField};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Which channel(s) of the raster feed the scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleChannel {
    /// `R / 255`
    #[default]
    Red,
    /// Rec. 601 luma `(0.299 R + 0.587 G + 0.114 B) / 255`
    Luminance,
}

/// Sample the red channel of every pixel into a normalized field.
pub fn extract(raster: &RasterImage) -> ScalarField {
    extract_with(raster, SampleChannel::Red)
}

/// Sample a raster into a normalized field using the given channel policy.
pub fn extract_with(raster: &RasterImage, channel: SampleChannel) -> ScalarField {
    let values: Vec<f32> = raster
        .pixels()
        .par_chunks_exact(4)
        .map(|px| sample(px, channel))
        .collect();

    ScalarField::sampled_from(raster, values)
}

#[inline]
fn sample(px: &[u8], channel: SampleChannel) -> f32 {
    match channel {
        SampleChannel::Red => px[0] as f32 / 255.0,
        SampleChannel::Luminance => {
            let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
            (luma / 255.0).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_channel_only() {
        let raster = RasterImage::new(2, 1, vec![255, 0, 0, 255, 0, 255, 255, 255]).unwrap();
        let field = extract(&raster);
        assert_eq!(field.values(), &[1.0, 0.0]);
    }

    #[test]
    fn test_luminance_of_grey_matches_red() {
        let raster = RasterImage::new(1, 1, vec![102, 102, 102, 255]).unwrap();
        let red = extract(&raster).values()[0];
        let luma = extract_with(&raster, SampleChannel::Luminance).values()[0];
        assert!((red - luma).abs() < 1e-4);
    }
}
