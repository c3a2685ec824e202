//! Configuration types for globestream components.
//!
//! Each config struct groups the parameters of one subsystem and is
//! consumed at construction time only; none of these are consulted on
//! the per-frame hot path.

/// Configuration for one tile layer: dataset interpretation, worker
/// pool, cache, and request-drain cadence.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Smallest tile side length in pixels the dataset is read at.
    ///
    /// Must be a power of two; aligns the dataset's overview pyramid
    /// with the quadtree levels.
    pub minimum_pixel_size: u32,
    /// Number of worker threads decoding tiles (default: available
    /// parallelism, capped at 8).
    pub worker_threads: usize,
    /// Maximum number of tiles resident in the cache.
    ///
    /// Chosen from the expected working set: simultaneously visible
    /// chunks times a safety factor.
    pub cache_size: usize,
    /// Frames between drains of the async completion queue.
    ///
    /// Most tiles take several frames to decode, so draining every
    /// frame is wasted bookkeeping; batching amortizes it.
    pub frames_until_request_flush: u32,
    /// Hard cap on in-flight reads, expressed as a multiple of the
    /// worker thread count.
    pub in_flight_multiplier: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            minimum_pixel_size: 512,
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            cache_size: 512,
            frames_until_request_flush: 60,
            in_flight_multiplier: 4,
        }
    }
}

impl LayerConfig {
    /// Set the minimum pixel size (must be a power of two).
    pub fn with_minimum_pixel_size(mut self, size: u32) -> Self {
        self.minimum_pixel_size = size;
        self
    }

    /// Set the number of worker threads.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Set the tile cache capacity.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set the number of frames between completion-queue drains.
    pub fn with_frames_until_request_flush(mut self, frames: u32) -> Self {
        self.frames_until_request_flush = frames;
        self
    }

    /// Set the in-flight read cap multiplier.
    pub fn with_in_flight_multiplier(mut self, multiplier: usize) -> Self {
        self.in_flight_multiplier = multiplier;
        self
    }

    /// The hard cap on simultaneously in-flight tile reads.
    pub fn max_in_flight(&self) -> usize {
        self.worker_threads.max(1) * self.in_flight_multiplier.max(1)
    }
}

/// Configuration for the chunked LOD globe traversal.
#[derive(Debug, Clone)]
pub struct GlobeConfig {
    /// Shallowest quadtree level a chunk may merge up to.
    pub min_split_depth: u8,
    /// Deepest quadtree level a chunk may split down to.
    ///
    /// Safety cap against runaway recursion; the distance-based LOD
    /// rule keeps the resident tree vastly smaller in practice.
    pub max_split_depth: u8,
    /// Merge chunks that fail visibility culling, bounding memory and
    /// tile-fetch pressure for off-screen parts of the globe.
    pub merge_invisible: bool,
    /// Emit deeper (smaller, farther) chunks before shallower ones so
    /// the GPU can early-reject overdraw behind nearer large patches.
    pub render_small_chunks_first: bool,
    /// Cap the desired level at the deepest level the dataset has real
    /// data for, instead of splitting into synthesized upsamples.
    pub limit_level_by_available_data: bool,
    /// Upper bound on surface height above the ellipsoid, in meters.
    /// Used by both cullers.
    pub max_height: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            min_split_depth: 2,
            max_split_depth: 22,
            merge_invisible: true,
            render_small_chunks_first: true,
            limit_level_by_available_data: false,
            max_height: 8800.0,
        }
    }
}

impl GlobeConfig {
    /// Set the minimum split depth.
    pub fn with_min_split_depth(mut self, depth: u8) -> Self {
        self.min_split_depth = depth;
        self
    }

    /// Set the maximum split depth.
    pub fn with_max_split_depth(mut self, depth: u8) -> Self {
        self.max_split_depth = depth;
        self
    }

    /// Enable or disable merging of invisible chunks.
    pub fn with_merge_invisible(mut self, merge: bool) -> Self {
        self.merge_invisible = merge;
        self
    }

    /// Enable or disable deepest-first render ordering.
    pub fn with_render_small_chunks_first(mut self, enabled: bool) -> Self {
        self.render_small_chunks_first = enabled;
        self
    }

    /// Enable or disable the data-availability level clamp.
    pub fn with_limit_level_by_available_data(mut self, enabled: bool) -> Self {
        self.limit_level_by_available_data = enabled;
        self
    }

    /// Set the maximum surface height bound in meters.
    pub fn with_max_height(mut self, height: f64) -> Self {
        self.max_height = height;
        self
    }
}
