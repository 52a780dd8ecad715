//! The per-frame overlay product and its visibility policy.

use serde::{Deserialize, Serialize};

use crate::contour::ContourSet;
use crate::raster::RasterImage;

/// Everything drawn over one image-stack frame.
///
/// Built once per frame-advance and never modified; a newer frame replaces
/// it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub frame_index: u32,
    pub recolored: RasterImage,
    pub contours: ContourSet,
}

/// Which overlay layer is shown. The variants are mutually exclusive, so
/// enabling one layer disables the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayVisibility {
    #[default]
    Fill,
    Contours,
    Hidden,
}

impl OverlayVisibility {
    pub fn fill_visible(&self) -> bool {
        matches!(self, OverlayVisibility::Fill)
    }

    pub fn contours_visible(&self) -> bool {
        matches!(self, OverlayVisibility::Contours)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Contours => "contours",
            Self::Hidden => "hidden",
        }
    }
}

impl std::str::FromStr for OverlayVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fill" => Ok(Self::Fill),
            "contours" | "contour" => Ok(Self::Contours),
            "hidden" | "none" => Ok(Self::Hidden),
            other => Err(format!("unknown overlay visibility '{}'", other)),
        }
    }
}
