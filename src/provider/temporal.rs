//! Time-varying tile datasets.
//!
//! A temporal layer is a family of datasets indexed by time, for
//! example one weather raster per three-hour forecast step. The
//! simulation clock is continuous; [`TimeQuantizer`] snaps it to the
//! layer's resolution so that every instant inside one step maps to
//! the same [`TimeKey`] and therefore the same dataset.
//!
//! Each key gets its own [`CachingTileProvider`] bucket, complete with
//! tile cache and worker pool. Buckets are expensive, so they live in
//! a small bounded LRU: scrubbing back and forth across a few recent
//! time steps is free, while a long scrub evicts the oldest buckets
//! and re-opens them on return.

use std::sync::Arc;

use thiserror::Error;

use super::caching::CachingTileProvider;
use super::types::{Tile, TileProvider};
use crate::cache::LruCache;
use crate::config::LayerConfig;
use crate::dataset::{DatasetError, TileDataset};
use crate::geodetic::ChunkIndex;

/// Buckets kept resident before the least recently used one is
/// closed.
pub const DEFAULT_MAX_BUCKETS: usize = 8;

/// A quantized time step, in units of the layer's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeKey(pub i64);

/// Malformed time resolution strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    #[error("empty time resolution")]
    Empty,

    #[error("time resolution '{0}' has no numeric count")]
    MissingCount(String),

    #[error("time resolution count must be positive: '{0}'")]
    ZeroCount(String),

    #[error("unknown time unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: char },
}

/// Snaps a continuous simulation time to discrete steps.
///
/// The resolution is given as a count and a unit, like `"3h"` or
/// `"2d"`. Supported units are seconds (`s`), minutes (`m`), hours
/// (`h`), days (`d`) and years (`y`, as 365 days).
///
/// # Example
///
/// ```
/// use globestream::provider::TimeQuantizer;
///
/// let quantizer = TimeQuantizer::from_resolution("1h").unwrap();
/// assert_eq!(quantizer.quantize(3599.0), quantizer.quantize(0.0));
/// assert_ne!(quantizer.quantize(3600.0), quantizer.quantize(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeQuantizer {
    resolution_seconds: f64,
}

impl TimeQuantizer {
    /// Parse a resolution string like `"10s"`, `"30m"`, `"3h"`,
    /// `"2d"` or `"1y"`.
    pub fn from_resolution(resolution: &str) -> Result<Self, TimeFormatError> {
        let trimmed = resolution.trim();
        if trimmed.is_empty() {
            return Err(TimeFormatError::Empty);
        }

        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let rest = &trimmed[digits.len()..];

        let count: u64 = digits
            .parse()
            .map_err(|_| TimeFormatError::MissingCount(trimmed.to_string()))?;
        if count == 0 {
            return Err(TimeFormatError::ZeroCount(trimmed.to_string()));
        }

        let mut units = rest.chars();
        let unit = match (units.next(), units.next()) {
            (Some(unit), None) => unit,
            (first, _) => {
                return Err(TimeFormatError::UnknownUnit {
                    input: trimmed.to_string(),
                    unit: first.unwrap_or(' '),
                })
            }
        };

        let unit_seconds = match unit {
            's' => 1.0,
            'm' => 60.0,
            'h' => 3_600.0,
            'd' => 86_400.0,
            'y' => 31_536_000.0,
            other => {
                return Err(TimeFormatError::UnknownUnit {
                    input: trimmed.to_string(),
                    unit: other,
                })
            }
        };

        Ok(Self {
            resolution_seconds: count as f64 * unit_seconds,
        })
    }

    /// The step length in seconds.
    pub fn resolution_seconds(&self) -> f64 {
        self.resolution_seconds
    }

    /// The step containing `seconds` (seconds since the epoch the
    /// layer counts from). Floors, so negative times quantize toward
    /// earlier steps.
    pub fn quantize(&self, seconds: f64) -> TimeKey {
        TimeKey((seconds / self.resolution_seconds).floor() as i64)
    }
}

/// Opens the dataset backing one time step.
///
/// Implementations typically format the key into a path or URL and
/// open the raster found there.
pub trait TemporalDatasetSource {
    /// Open the dataset for `key`.
    ///
    /// # Errors
    ///
    /// [`DatasetError`] when no dataset exists for the step or it
    /// fails validation.
    fn open_at(&self, key: TimeKey) -> Result<Arc<TileDataset>, DatasetError>;
}

/// Tile provider over a time-indexed family of datasets.
///
/// [`set_time`](Self::set_time) selects the bucket all subsequent
/// [`tile`](TileProvider::tile) calls are served from. Render-thread
/// only.
pub struct TemporalTileProvider {
    source: Box<dyn TemporalDatasetSource>,
    quantizer: TimeQuantizer,
    buckets: LruCache<TimeKey, CachingTileProvider>,
    active: Option<TimeKey>,
    config: LayerConfig,
}

impl TemporalTileProvider {
    /// Create a provider with the default bucket budget.
    pub fn new(
        source: Box<dyn TemporalDatasetSource>,
        quantizer: TimeQuantizer,
        config: LayerConfig,
    ) -> Self {
        Self::with_max_buckets(source, quantizer, config, DEFAULT_MAX_BUCKETS)
    }

    /// Create a provider keeping at most `max_buckets` time steps
    /// resident.
    pub fn with_max_buckets(
        source: Box<dyn TemporalDatasetSource>,
        quantizer: TimeQuantizer,
        config: LayerConfig,
        max_buckets: usize,
    ) -> Self {
        Self {
            source,
            quantizer,
            buckets: LruCache::new(max_buckets.max(1)),
            active: None,
            config,
        }
    }

    /// Point the provider at the time step containing `seconds`.
    ///
    /// Re-selecting a resident step is free. A new step opens its
    /// dataset and may evict the least recently used bucket, dropping
    /// that bucket's cache and worker pool.
    ///
    /// # Errors
    ///
    /// [`DatasetError`] from opening the step's dataset; the
    /// previously active bucket stays selected.
    pub fn set_time(&mut self, seconds: f64) -> Result<(), DatasetError> {
        let key = self.quantizer.quantize(seconds);
        if self.active == Some(key) {
            return Ok(());
        }

        if self.buckets.get(&key).is_none() {
            let dataset = self.source.open_at(key)?;
            let bucket = CachingTileProvider::new(dataset, &self.config);
            if let Some((evicted, _)) = self.buckets.put(key, bucket) {
                tracing::debug!(evicted = evicted.0, opened = key.0, "time bucket evicted");
            } else {
                tracing::debug!(opened = key.0, "time bucket opened");
            }
        }

        self.active = Some(key);
        Ok(())
    }

    /// The currently selected time step, if any.
    pub fn active_key(&self) -> Option<TimeKey> {
        self.active
    }

    /// Number of resident time buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl TileProvider for TemporalTileProvider {
    fn tile(&mut self, index: ChunkIndex) -> Tile {
        let Some(key) = self.active else {
            return Tile::unavailable();
        };
        match self.buckets.get_mut(&key) {
            Some(bucket) => bucket.tile(index),
            None => Tile::unavailable(),
        }
    }

    fn update(&mut self) {
        // Tick every resident bucket so reads issued before a time
        // switch still drain into their caches.
        for bucket in self.buckets.values_mut() {
            bucket.update();
        }
    }

    fn maximum_level(&self) -> Option<i32> {
        let key = self.active?;
        self.buckets.peek(&key).and_then(|b| b.maximum_level())
    }
}
