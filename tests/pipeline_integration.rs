//! Integration tests for the tile read pipeline.
//!
//! These tests drive the real stack end to end: an in-memory raster
//! source behind a `TileDataset`, read asynchronously through a
//! `CachingTileProvider`. They verify:
//! - Duplicate requests cause exactly one underlying read
//! - A panicking decode is isolated to its tile and the pool survives
//! - Failed reads are retried and can recover
//! - Cached tiles carry correctly assembled pixel data

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use globestream::config::LayerConfig;
use globestream::dataset::{
    GeoTransform, MemoryRasterSource, PixelRegion, RasterReadError, RasterSource, ReadSeverity,
    SampleType, TileDataset,
};
use globestream::geodetic::{ChunkIndex, LEFT_HEMISPHERE, RIGHT_HEMISPHERE};
use globestream::provider::{CachingTileProvider, Tile, TileProvider, TileStatus};

// =============================================================================
// Test Helpers
// =============================================================================

/// Forwards to an in-memory raster, counting reads and optionally
/// holding them at a gate until the test releases them.
struct InstrumentedSource {
    inner: MemoryRasterSource,
    gate: Arc<(Mutex<bool>, Condvar)>,
    reads: Arc<AtomicUsize>,
    /// Reads that fail with this severity before the counter exceeds
    /// `failures`.
    failures: usize,
    severity: ReadSeverity,
    panic_always: bool,
}

struct Instruments {
    gate: Arc<(Mutex<bool>, Condvar)>,
    reads: Arc<AtomicUsize>,
}

impl Instruments {
    fn open_gate(&self) {
        *self.gate.0.lock().unwrap() = true;
        self.gate.1.notify_all();
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl InstrumentedSource {
    fn new(gated: bool) -> (Self, Instruments) {
        let gate = Arc::new((Mutex::new(!gated), Condvar::new()));
        let reads = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner: MemoryRasterSource::new(64, 32),
            gate: Arc::clone(&gate),
            reads: Arc::clone(&reads),
            failures: 0,
            severity: ReadSeverity::Failure,
            panic_always: false,
        };
        (source, Instruments { gate, reads })
    }

    fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    fn panicking(mut self) -> Self {
        self.panic_always = true;
        self
    }
}

impl RasterSource for InstrumentedSource {
    fn raster_size(&self) -> (usize, usize) {
        self.inner.raster_size()
    }

    fn band_count(&self) -> usize {
        self.inner.band_count()
    }

    fn sample_type(&self) -> SampleType {
        self.inner.sample_type()
    }

    fn overview_count(&self) -> usize {
        self.inner.overview_count()
    }

    fn overview_size(&self, overview: usize) -> (usize, usize) {
        self.inner.overview_size(overview)
    }

    fn geo_transform(&self) -> GeoTransform {
        self.inner.geo_transform()
    }

    fn read_region(
        &self,
        band: usize,
        overview: usize,
        region: PixelRegion,
    ) -> Result<Vec<u8>, RasterReadError> {
        let read_number = self.reads.fetch_add(1, Ordering::SeqCst);

        let (lock, condvar) = &*self.gate;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = condvar.wait(open).unwrap();
        }
        drop(open);

        if self.panic_always {
            panic!("decode blew up");
        }
        if read_number < self.failures {
            return Err(RasterReadError {
                severity: self.severity,
                message: "transient read failure".to_string(),
            });
        }
        self.inner.read_region(band, overview, region)
    }
}

fn provider_over(source: InstrumentedSource) -> CachingTileProvider {
    let config = LayerConfig::default()
        .with_minimum_pixel_size(16)
        .with_worker_threads(2)
        .with_cache_size(16)
        .with_frames_until_request_flush(1);
    let dataset = Arc::new(TileDataset::open(Arc::new(source), &config).unwrap());
    CachingTileProvider::new(dataset, &config)
}

/// Request and flush until the tile is cached, or fail after a
/// generous deadline.
fn settle(provider: &mut CachingTileProvider, index: ChunkIndex) -> Tile {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        provider.flush();
        let tile = provider.tile(index);
        if tile.status() == TileStatus::Cached {
            return tile;
        }
        assert!(Instant::now() < deadline, "tile for {index} never arrived");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Flush until no request is pending.
fn drain_pending(provider: &mut CachingTileProvider) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while provider.pending_count() > 0 {
        provider.flush();
        assert!(Instant::now() < deadline, "pending requests never drained");
        thread::sleep(Duration::from_millis(1));
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[test]
fn test_duplicate_requests_read_the_source_once() {
    let (source, instruments) = InstrumentedSource::new(true);
    let mut provider = provider_over(source);

    // Hammer the same index while the read is held at the gate
    for _ in 0..10 {
        let tile = provider.tile(LEFT_HEMISPHERE);
        assert_eq!(tile.status(), TileStatus::Unavailable);
        provider.update();
    }
    assert_eq!(provider.pending_count(), 1);

    instruments.open_gate();
    let tile = settle(&mut provider, LEFT_HEMISPHERE);

    assert!(tile.is_renderable());
    // One band, so exactly one region read for the whole burst
    assert_eq!(instruments.reads(), 1);
}

#[test]
fn test_panicking_decode_is_isolated() {
    let (source, _instruments) = InstrumentedSource::new(false);
    let mut provider = provider_over(source.panicking());

    // The read panics on a worker; the result must come back as a
    // failed tile, not take down the pool
    let tile = provider.tile(LEFT_HEMISPHERE);
    assert_eq!(tile.status(), TileStatus::Unavailable);
    drain_pending(&mut provider);

    assert_eq!(provider.cached_count(), 0);
    assert_eq!(provider.tile(LEFT_HEMISPHERE).status(), TileStatus::Unavailable);

    // The pool still services other requests after the panic
    let second = provider.tile(RIGHT_HEMISPHERE);
    assert_eq!(second.status(), TileStatus::Unavailable);
    drain_pending(&mut provider);
    assert_eq!(provider.cached_count(), 0);
}

#[test]
fn test_failed_read_is_retried_and_recovers() {
    let (source, instruments) = InstrumentedSource::new(false);
    let mut provider = provider_over(source.failing_first(1));

    // First attempt fails and is not cached
    let tile = provider.tile(LEFT_HEMISPHERE);
    assert_eq!(tile.status(), TileStatus::Unavailable);
    drain_pending(&mut provider);
    assert_eq!(provider.cached_count(), 0);

    // The next request enqueues a fresh read, which succeeds
    let tile = settle(&mut provider, LEFT_HEMISPHERE);
    assert!(tile.is_renderable());
    assert!(instruments.reads() >= 2);
}

#[test]
fn test_cached_tile_carries_assembled_pixels() {
    let (source, _instruments) = InstrumentedSource::new(false);
    let mut provider = provider_over(source);

    let tile = settle(&mut provider, LEFT_HEMISPHERE);
    let data = tile.data().expect("cached tile has data");

    assert_eq!(data.chunk_index, LEFT_HEMISPHERE);
    assert!(data.width > 0 && data.height > 0);
    assert_eq!(data.pixels.len(), data.width * data.height);
    assert!(tile.depth_transform().is_some());

    // Second lookup is a pure cache hit
    let again = provider.tile(LEFT_HEMISPHERE);
    assert_eq!(again.status(), TileStatus::Cached);
    assert!(provider.cache_stats().hits >= 2);
}

#[test]
fn test_requests_beyond_dataset_depth_are_rejected_without_reads() {
    let (source, instruments) = InstrumentedSource::new(false);
    let mut provider = provider_over(source);

    // 64 wide, no overviews, minimum pixel size 16: nothing deeper
    // than level 2 can exist
    let tile = provider.tile(ChunkIndex::new(0, 0, 7));
    assert_eq!(tile.status(), TileStatus::OutOfRange);
    assert_eq!(provider.pending_count(), 0);
    assert_eq!(instruments.reads(), 0);
}
