//! Fixed pixel values and rasters that exercise the recoloring rules.

use overlay_common::RasterImage;

/// Representative mask pixels.
pub mod pixels {
    /// Pure white label, recolored to magenta
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// Mid-grey label (sum 381), recolored to yellow
    pub const MID_GREY: [u8; 4] = [127, 127, 127, 255];

    /// Near-black background (sum 9), suppressed
    pub const NEAR_BLACK: [u8; 4] = [3, 3, 3, 255];

    /// Dark but visible (sum exactly 10), passes through
    pub const DARK_VISIBLE: [u8; 4] = [4, 3, 3, 255];

    /// Arbitrary label color, passes through
    pub const TEAL: [u8; 4] = [0, 128, 128, 255];

    /// Magenta replacement color as written by the remapper
    pub const MAGENTA_OUT: [u8; 3] = [191, 0, 255];

    /// Yellow replacement color as written by the remapper
    pub const YELLOW_OUT: [u8; 3] = [230, 230, 0];
}

/// Frame keys and sizes used across the viewer tests.
pub mod frames {
    /// Default key prefix of the viewer
    pub const KEY_PREFIX: &str = "overlay_";

    /// Default canvas edge in pixels
    pub const CANVAS_SIZE: u32 = 320;

    /// Small canvas for fast tests
    pub const SMALL_SIZE: u32 = 16;
}

/// The 2x2 mask `[[white, black], [grey, white]]`.
pub fn two_by_two_mask() -> RasterImage {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&pixels::WHITE);
    data.extend_from_slice(&[0, 0, 0, 255]);
    data.extend_from_slice(&pixels::MID_GREY);
    data.extend_from_slice(&pixels::WHITE);
    RasterImage::new(2, 2, data).expect("2x2 mask has 16 bytes")
}
