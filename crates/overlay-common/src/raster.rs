//! Raster buffers and the scalar fields derived from them.

use crate::error::{OverlayError, OverlayResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// A decoded RGBA8 image, row-major, top-to-bottom.
///
/// The pixel buffer length is checked on construction and there is no
/// mutable access afterwards, so `pixels.len() == width * height * 4` holds
/// for every value of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a decoded pixel buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> OverlayResult<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(OverlayError::MalformedRaster {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels (not bytes).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGBA value at (x, y), if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.pixels[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Bytes of one scanline.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// A new raster with this raster's dimensions and the given pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels` is not exactly as long as this raster's buffer.
    pub fn with_same_shape(&self, pixels: Vec<u8>) -> RasterImage {
        assert_eq!(
            pixels.len(),
            self.pixels.len(),
            "derived raster must keep the source dimensions"
        );
        RasterImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Normalized intensities sampled from a raster, one per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ScalarField {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> OverlayResult<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(OverlayError::MalformedRaster {
                width,
                height,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// A field with one value per pixel of `raster`.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly one entry per pixel.
    pub fn sampled_from(raster: &RasterImage, values: Vec<f32>) -> ScalarField {
        assert_eq!(
            values.len(),
            raster.pixel_count(),
            "field must hold one value per raster pixel"
        );
        ScalarField {
            width: raster.width(),
            height: raster.height(),
            values,
        }
    }

    /// Value at (x, y), if in bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Minimum and maximum over the finite values, or `None` when there are none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    /// True when every value is identical (or the field is empty).
    pub fn is_constant(&self) -> bool {
        match self.min_max() {
            Some((min, max)) => max <= min,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_rejects_bad_length() {
        let err = RasterImage::new(2, 2, vec![0u8; 15]).unwrap_err();
        match err {
            OverlayError::MalformedRaster {
                expected, actual, ..
            } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raster_pixel_access() {
        let raster = RasterImage::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(raster.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(raster.pixel(2, 0), None);
        assert_eq!(raster.row_bytes(), 8);
    }

    #[test]
    fn test_zero_sized_raster_is_valid() {
        let raster = RasterImage::new(0, 0, vec![]).unwrap();
        assert_eq!(raster.pixel_count(), 0);
    }

    #[test]
    #[should_panic(expected = "source dimensions")]
    fn test_with_same_shape_checks_length() {
        let raster = RasterImage::transparent(2, 2);
        let _ = raster.with_same_shape(vec![0u8; 4]);
    }

    #[test]
    fn test_field_min_max() {
        let field = ScalarField::new(2, 2, vec![0.25, 0.75, 0.5, 0.0]).unwrap();
        assert_eq!(field.min_max(), Some((0.0, 0.75)));
        assert!(!field.is_constant());
        assert_eq!(field.get(1, 1), Some(0.0));
    }

    #[test]
    fn test_field_constant() {
        let field = ScalarField::new(3, 1, vec![0.4; 3]).unwrap();
        assert!(field.is_constant());
    }
}
