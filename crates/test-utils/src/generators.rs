//! Test data generators for creating synthetic mask rasters and fields.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

use overlay_common::{RasterImage, ScalarField};

/// Creates a mask with a solid disc on a black background.
///
/// Pixels whose center lies within `radius` of the image center are painted
/// with `color`; everything else is opaque black.
///
/// # Example
///
/// ```
/// use test_utils::create_disc_mask;
///
/// let mask = create_disc_mask(16, 16, 4.0, [255, 255, 255, 255]);
/// assert_eq!(mask.pixel(8, 8), Some([255, 255, 255, 255]));
/// assert_eq!(mask.pixel(0, 0), Some([0, 0, 0, 255]));
/// ```
pub fn create_disc_mask(width: u32, height: u32, radius: f32, color: [u8; 4]) -> RasterImage {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if (dx * dx + dy * dy).sqrt() <= radius {
                pixels.extend_from_slice(&color);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }
    RasterImage::new(width, height, pixels).expect("generated buffer matches dimensions")
}

/// Creates a mask filled with a single RGBA value.
pub fn create_solid_mask(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
    let pixels = color
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    RasterImage::new(width, height, pixels).expect("generated buffer matches dimensions")
}

/// Creates a mask with a horizontal red ramp from 0 at the left edge to 255
/// at the right edge.
///
/// Green and blue are zero and alpha is opaque, so the red-channel field
/// rises linearly with `x`.
pub fn create_red_ramp_mask(width: u32, height: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    let span = width.saturating_sub(1).max(1) as f32;
    for _ in 0..height {
        for x in 0..width {
            let r = (x as f32 / span * 255.0).round() as u8;
            pixels.extend_from_slice(&[r, 0, 0, 255]);
        }
    }
    RasterImage::new(width, height, pixels).expect("generated buffer matches dimensions")
}

/// Creates a mask where every pixel gets a deterministic pseudo-random
/// color drawn from the recoloring classes (background, white, mid-grey,
/// and arbitrary labels).
pub fn create_mixed_mask(width: u32, height: u32, seed: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let hash = simple_hash(x, y, seed);
            let px = match hash % 5 {
                0 => [(hash % 4) as u8, 1, 2, 255],
                1 => [255, 255, 255, (hash >> 8) as u8],
                2 => [127, 127, 127, 255],
                _ => [(hash >> 4) as u8, (hash >> 12) as u8, (hash >> 20) as u8, 255],
            };
            pixels.extend_from_slice(&px);
        }
    }
    RasterImage::new(width, height, pixels).expect("generated buffer matches dimensions")
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a radial field peaking at 1.0 in the center and falling to 0.0
/// at `radius` and beyond.
pub fn create_peak_field(width: u32, height: u32, radius: f32) -> ScalarField {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;

    let mut values = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            values.push((1.0 - d / radius).max(0.0));
        }
    }
    ScalarField::new(width, height, values).expect("generated values match dimensions")
}

/// Creates a field filled with a constant value.
pub fn create_constant_field(width: u32, height: u32, value: f32) -> ScalarField {
    ScalarField::new(width, height, vec![value; width as usize * height as usize])
        .expect("generated values match dimensions")
}
