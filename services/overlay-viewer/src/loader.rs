//! Loads frame masks from PNG files on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use overlay_common::{OverlayError, OverlayResult, RasterImage, RasterLoader};
use tracing::debug;

/// Reads `<dir>/<key>.png` and decodes it to RGBA8.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.png", key))
    }
}

#[async_trait]
impl RasterLoader for DirectoryLoader {
    async fn load(&self, key: &str) -> OverlayResult<RasterImage> {
        let path = self.path_for(key);

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| OverlayError::load_failure(key, format!("{}: {}", path.display(), e)))?;

        let owned_key = key.to_string();
        let decoded = tokio::task::spawn_blocking(move || decode_rgba(&owned_key, &bytes))
            .await
            .map_err(|e| OverlayError::load_failure(key, e))??;

        debug!(
            key,
            width = decoded.width(),
            height = decoded.height(),
            "Decoded mask"
        );

        Ok(decoded)
    }
}

fn decode_rgba(key: &str, bytes: &[u8]) -> OverlayResult<RasterImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| OverlayError::load_failure(key, format!("decode failed: {}", e)))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    RasterImage::new(width, height, image.into_raw())
}
