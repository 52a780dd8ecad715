//! In-memory raster loader with configurable per-key latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use overlay_common::{OverlayError, OverlayResult, RasterImage, RasterLoader};

#[derive(Clone)]
enum Entry {
    Raster(RasterImage),
    Failure(String),
}

/// Serves rasters from a map keyed by resource key.
///
/// Unknown keys fail with [`OverlayError::ResourceLoadFailure`]. Delays let a
/// test make an earlier request finish after a later one.
#[derive(Clone, Default)]
pub struct InMemoryLoader {
    entries: HashMap<String, Entry>,
    delays: HashMap<String, Duration>,
    loads: Arc<AtomicUsize>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `raster` for `key`.
    pub fn with_raster(mut self, key: impl Into<String>, raster: RasterImage) -> Self {
        self.entries.insert(key.into(), Entry::Raster(raster));
        self
    }

    /// Fail loads of `key` with `message`.
    pub fn with_failure(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.entries.insert(key.into(), Entry::Failure(message.into()));
        self
    }

    /// Sleep for `delay` before answering loads of `key`.
    pub fn with_delay(mut self, key: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(key.into(), delay);
        self
    }

    /// Number of `load` calls so far, across clones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RasterLoader for InMemoryLoader {
    async fn load(&self, key: &str) -> OverlayResult<RasterImage> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }

        match self.entries.get(key) {
            Some(Entry::Raster(raster)) => Ok(raster.clone()),
            Some(Entry::Failure(message)) => Err(OverlayError::load_failure(key, message.clone())),
            None => Err(OverlayError::load_failure(key, "no such resource")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_known_key() {
        let loader = InMemoryLoader::new().with_raster("overlay_0", RasterImage::transparent(2, 2));
        let raster = loader.load("overlay_0").await.unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_key_fails() {
        let loader = InMemoryLoader::new();
        let err = loader.load("overlay_9").await.unwrap_err();
        assert!(matches!(err, OverlayError::ResourceLoadFailure { .. }));
    }

    #[test]
    fn test_configured_failure() {
        let loader = InMemoryLoader::new().with_failure("overlay_1", "timed out");
        let err = tokio_test::block_on(loader.load("overlay_1")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load resource 'overlay_1': timed out");
    }

    #[tokio::test]
    async fn test_delay_is_applied() {
        let loader = InMemoryLoader::new()
            .with_raster("slow", RasterImage::transparent(1, 1))
            .with_delay("slow", Duration::from_millis(20));

        let start = tokio::time::Instant::now();
        loader.load("slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
