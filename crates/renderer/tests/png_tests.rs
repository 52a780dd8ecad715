//! Tests for PNG encoding of overlay rasters.
//!
//! Encoded output is decoded again with the `image` crate to check that
//! both the indexed and RGBA paths are valid PNGs with the original pixels.

use overlay_common::RasterImage;
use overlay_renderer::png::{encode_raster, encode_rgba};
use overlay_renderer::remap::remap;
use test_utils::{create_disc_mask, create_mixed_mask};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png)
        .expect("valid PNG")
        .to_rgba8()
}

/// Color type byte from the IHDR chunk
fn color_type(png: &[u8]) -> u8 {
    png[25]
}

#[test]
fn test_signature_and_ihdr() {
    let png = encode_raster(&RasterImage::transparent(4, 3)).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(&png[16..20], &4u32.to_be_bytes());
    assert_eq!(&png[20..24], &3u32.to_be_bytes());
}

#[test]
fn test_recolored_mask_uses_indexed_png() {
    let mask = remap(&create_disc_mask(64, 64, 20.0, [255, 255, 255, 255]));
    let png = encode_raster(&mask).unwrap();

    assert_eq!(color_type(&png), 3);

    let decoded = decode(&png);
    assert_eq!(decoded.as_raw().as_slice(), mask.pixels());
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let mask = create_mixed_mask(96, 96, 11);
    let png = encode_raster(&mask).unwrap();

    assert_eq!(color_type(&png), 6);

    let decoded = decode(&png);
    assert_eq!(decoded.dimensions(), (96, 96));
    assert_eq!(decoded.as_raw().as_slice(), mask.pixels());
}

#[test]
fn test_rgba_round_trip_small() {
    let raster = RasterImage::new(2, 1, vec![1, 2, 3, 4, 250, 251, 252, 253]).unwrap();
    let decoded = decode(&encode_rgba(&raster).unwrap());
    assert_eq!(decoded.as_raw().as_slice(), raster.pixels());
}

#[test]
fn test_indexed_smaller_than_rgba_for_masks() {
    let mask = remap(&create_disc_mask(128, 128, 40.0, [127, 127, 127, 255]));
    let indexed = encode_raster(&mask).unwrap();
    let rgba = encode_rgba(&mask).unwrap();
    assert!(indexed.len() < rgba.len());
}
