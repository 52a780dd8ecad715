//! PNG encoding for overlay rasters.
//!
//! Mask overlays use a handful of colors, so the encoder first tries an
//! indexed PNG (color type 3, one byte per pixel, `tRNS` for alpha) and
//! falls back to RGBA (color type 6) when more than 256 colors are present.

use std::collections::HashMap;
use std::io::Write;

use overlay_common::{OverlayError, OverlayResult, RasterImage};
use rayon::prelude::*;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel color counting
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

type Palette = Vec<[u8; 4]>;

/// Encode a raster, picking indexed or RGBA output automatically.
pub fn encode_raster(raster: &RasterImage) -> OverlayResult<Vec<u8>> {
    match extract_palette(raster.pixels()) {
        Some((palette, indices)) => encode_indexed(raster.width(), raster.height(), &palette, &indices),
        None => encode_rgba(raster),
    }
}

/// Encode a raster as an RGBA PNG (color type 6).
pub fn encode_rgba(raster: &RasterImage) -> OverlayResult<Vec<u8>> {
    let mut png = Vec::with_capacity(raster.pixels().len() / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(raster.width(), raster.height(), 6));

    let idat = deflate_scanlines(raster.pixels(), raster.row_bytes(), raster.height() as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode palette indices as an indexed PNG (color type 3).
fn encode_indexed(width: u32, height: u32, palette: &[[u8; 4]], indices: &[u8]) -> OverlayResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only if any entry is not fully opaque
    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width as usize, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn ihdr(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Build a palette and per-pixel indices, or `None` if there are too many colors.
fn extract_palette(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let num_pixels = pixels.len() / 4;

    // Large images: bail out early in parallel when a chunk alone overflows
    if num_pixels >= PARALLEL_THRESHOLD {
        let chunk_size = (num_pixels / rayon::current_num_threads()).max(256) * 4;
        let overflow = pixels.par_chunks(chunk_size).any(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack_color(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    return true;
                }
            }
            false
        });
        if overflow {
            return None;
        }
    }

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(num_pixels);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Prefix each scanline with filter byte 0 and zlib-compress the result.
fn deflate_scanlines(data: &[u8], row_len: usize, rows: usize) -> OverlayResult<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(rows * (1 + row_len));
    for y in 0..rows {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(&data[y * row_len..(y + 1) * row_len]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .and_then(|_| encoder.finish())
        .map_err(|e| OverlayError::Encode(format!("IDAT compression failed: {}", e)))
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
