//! Source of decoded mask rasters.

use async_trait::async_trait;

use crate::error::OverlayResult;
use crate::raster::RasterImage;

/// Fetches the mask raster for a resource key such as `overlay_12`.
///
/// Transport and decoding are the implementor's concern; failures should be
/// reported as [`OverlayError::ResourceLoadFailure`](crate::OverlayError::ResourceLoadFailure).
#[async_trait]
pub trait RasterLoader: Send + Sync {
    async fn load(&self, key: &str) -> OverlayResult<RasterImage>;
}
