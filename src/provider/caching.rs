//! The caching tile provider: the renderer's single entry point.
//!
//! Hides the cache-miss / async-fetch / cache-fill cycle behind one
//! [`tile`](CachingTileProvider::tile) call. Per chunk index the
//! request moves through three states:
//!
//! - **Uncached**: cache miss enqueues an async read and returns
//!   `Unavailable` immediately; the renderer falls back to a coarser
//!   ancestor tile or a placeholder.
//! - **Pending**: a read is in flight; repeated requests return
//!   `Unavailable` without re-enqueueing.
//! - **Ready**: cache hit returns `Cached` with the decoded data.
//!
//! Completions are drained in batches every
//! `frames_until_request_flush` frames rather than every frame; most
//! tiles take several frames to decode, so batching amortizes the
//! bookkeeping. Render-thread only.

use std::collections::HashSet;
use std::sync::Arc;

use super::async_provider::AsyncTileDataProvider;
use super::types::{ProviderError, Tile, TileProvider};
use crate::cache::{CacheStats, TileCache};
use crate::config::LayerConfig;
use crate::dataset::{TileDataset, TileDepthTransform};
use crate::geodetic::ChunkIndex;

/// Orchestrates the tile cache and the async read pipeline for one
/// dataset layer.
pub struct CachingTileProvider {
    async_provider: AsyncTileDataProvider,
    cache: TileCache,
    /// Indices requested but not yet drained into the cache.
    pending: HashSet<ChunkIndex>,
    /// Indices whose last read failed; logged once, retried on the
    /// next request.
    failed: HashSet<ChunkIndex>,
    depth_transform: TileDepthTransform,
    maximum_level: i32,
    frames_until_flush: u32,
    frames_since_flush: u32,
}

impl CachingTileProvider {
    /// Create a provider over an opened dataset.
    pub fn new(dataset: Arc<TileDataset>, config: &LayerConfig) -> Self {
        let depth_transform = dataset.depth_transform();
        let maximum_level = dataset.maximum_level();
        let async_provider = AsyncTileDataProvider::new(
            dataset,
            config.worker_threads,
            config.max_in_flight(),
        );

        Self {
            async_provider,
            cache: TileCache::new(config.cache_size.max(1)),
            pending: HashSet::new(),
            failed: HashSet::new(),
            depth_transform,
            maximum_level,
            frames_until_flush: config.frames_until_request_flush.max(1),
            frames_since_flush: 0,
        }
    }

    /// Drain completed reads into the cache immediately, regardless of
    /// the frame cadence. Exposed for tests and for hosts that want a
    /// synchronous settle point.
    pub fn flush(&mut self) {
        self.frames_since_flush = 0;
        for result in self.async_provider.poll() {
            let index = result.chunk_index;
            self.pending.remove(&index);

            if let (true, Some(data)) = (result.is_usable(), result.data) {
                self.cache
                    .insert(index, Tile::cached(Arc::new(data), self.depth_transform));
                self.failed.remove(&index);
            } else {
                // Log persistent failures once, not per retry
                if self.failed.insert(index) {
                    tracing::warn!(
                        index = %index,
                        severity = ?result.severity,
                        "tile read failed, will retry on next request"
                    );
                }
            }
        }
    }

    /// Number of requests awaiting completion or drain.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cache counters for diagnostics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of tiles resident in the cache.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl TileProvider for CachingTileProvider {
    fn tile(&mut self, index: ChunkIndex) -> Tile {
        if (index.level as i32) > self.maximum_level {
            return Tile::out_of_range();
        }

        if let Some(tile) = self.cache.get(&index) {
            return tile.clone();
        }

        // Miss: enqueue unless a read is already pending for this
        // index. Pending covers the window from enqueue to drain, so
        // at most one read is ever in flight per index.
        if !self.pending.contains(&index) {
            match self.async_provider.enqueue(index) {
                Ok(_) => {
                    self.pending.insert(index);
                }
                Err(ProviderError::QueueFull) => {
                    tracing::trace!(index = %index, "tile request deferred, queue full");
                }
                Err(error) => {
                    tracing::warn!(index = %index, %error, "tile request dropped");
                }
            }
        }

        Tile::unavailable()
    }

    fn update(&mut self) {
        self.frames_since_flush += 1;
        if self.frames_since_flush >= self.frames_until_flush {
            self.flush();
        }
    }

    fn maximum_level(&self) -> Option<i32> {
        Some(self.maximum_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemoryRasterSource;
    use crate::geodetic::LEFT_HEMISPHERE;
    use crate::provider::TileStatus;
    use std::thread;
    use std::time::{Duration, Instant};

    fn provider(config: LayerConfig) -> CachingTileProvider {
        let source = MemoryRasterSource::new(64, 32).with_overview_count(2);
        let dataset = Arc::new(TileDataset::open(Arc::new(source), &config).unwrap());
        CachingTileProvider::new(dataset, &config)
    }

    fn settle(provider: &mut CachingTileProvider, index: ChunkIndex) -> Tile {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            provider.flush();
            let tile = provider.tile(index);
            if tile.status() == TileStatus::Cached {
                return tile;
            }
            assert!(Instant::now() < deadline, "tile never became available");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn test_config() -> LayerConfig {
        LayerConfig::default()
            .with_minimum_pixel_size(16)
            .with_worker_threads(2)
            .with_cache_size(8)
            .with_frames_until_request_flush(3)
    }

    #[test]
    fn miss_then_pending_then_ready() {
        let mut provider = provider(test_config());

        // Uncached: first request kicks off the read
        let first = provider.tile(LEFT_HEMISPHERE);
        assert_eq!(first.status(), TileStatus::Unavailable);
        assert_eq!(provider.pending_count(), 1);

        // Pending: repeat requests do not re-enqueue
        let second = provider.tile(LEFT_HEMISPHERE);
        assert_eq!(second.status(), TileStatus::Unavailable);
        assert_eq!(provider.pending_count(), 1);

        // Ready after the read completes and a drain runs
        let tile = settle(&mut provider, LEFT_HEMISPHERE);
        assert!(tile.is_renderable());
        assert_eq!(provider.pending_count(), 0);
        assert!(tile.data().is_some());
    }

    #[test]
    fn update_drains_on_frame_cadence() {
        let mut provider = provider(test_config());
        let _ = provider.tile(LEFT_HEMISPHERE);

        // Two update ticks: below the cadence of 3, nothing drains no
        // matter how fast the worker finishes the read
        provider.update();
        provider.update();
        assert_eq!(provider.cached_count(), 0);

        // Further ticks cross the cadence and eventually drain the
        // completed read
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            provider.update();
            if provider.cached_count() == 1 {
                break;
            }
            assert!(Instant::now() < deadline, "completion never drained");
            thread::sleep(Duration::from_millis(1));
        }
        assert!(provider.tile(LEFT_HEMISPHERE).is_renderable());
    }

    #[test]
    fn requests_past_maximum_level_are_out_of_range() {
        // 64x32 with 2 overviews, min pixel 16: coarsest is 32 wide,
        // difference = 4 - 5 = -1, maximum level = 2 - 1 + 1 = 2.
        let mut provider = provider(test_config());

        let too_deep = provider.tile(ChunkIndex::new(0, 0, 9));
        assert_eq!(too_deep.status(), TileStatus::OutOfRange);
        assert_eq!(provider.pending_count(), 0);
    }
}
