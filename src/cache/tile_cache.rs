//! The tile cache: bounded LRU of decoded, ready tiles.

use super::lru::LruCache;
use crate::geodetic::ChunkIndex;
use crate::provider::Tile;

/// Hit/miss/eviction counters for one tile cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    /// Lookups that found a resident tile.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Tiles evicted to make room.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit ratio in `[0, 1]`; zero when no lookups happened.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded cache of ready tiles keyed by chunk index.
///
/// Capacity is fixed at construction; inserting at capacity evicts
/// the least-recently-used tile. An evicted tile must be re-fetched
/// through the async provider on its next request. Render-thread
/// only.
pub struct TileCache {
    entries: LruCache<ChunkIndex, Tile>,
    stats: CacheStats,
}

impl TileCache {
    /// Create a cache holding at most `capacity` tiles.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a tile, promoting it to most recently used.
    pub fn get(&mut self, index: &ChunkIndex) -> Option<&Tile> {
        match self.entries.get(index) {
            Some(tile) => {
                self.stats.hits += 1;
                Some(tile)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Whether a tile is resident. Does not affect recency or stats.
    pub fn contains(&self, index: &ChunkIndex) -> bool {
        self.entries.contains(index)
    }

    /// Insert a tile, evicting the least-recently-used one if at
    /// capacity.
    pub fn insert(&mut self, index: ChunkIndex, tile: Tile) {
        if let Some((evicted_index, _)) = self.entries.put(index, tile) {
            self.stats.evictions += 1;
            tracing::trace!(evicted = %evicted_index, inserted = %index, "tile cache eviction");
        }
    }

    /// Number of resident tiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(x: u32, y: u32, level: u8) -> ChunkIndex {
        ChunkIndex::new(x, y, level)
    }

    #[test]
    fn insert_then_get() {
        let mut cache = TileCache::new(4);
        cache.insert(index(0, 0, 1), Tile::unavailable());

        assert!(cache.get(&index(0, 0, 1)).is_some());
        assert!(cache.get(&index(1, 0, 1)).is_none());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn bounded_with_lru_eviction() {
        let mut cache = TileCache::new(3);
        let a = index(0, 0, 2);
        let b = index(1, 0, 2);
        let c = index(2, 0, 2);
        let d = index(3, 0, 2);

        cache.insert(a, Tile::unavailable());
        cache.insert(b, Tile::unavailable());
        cache.insert(c, Tile::unavailable());
        assert_eq!(cache.len(), 3);

        // Touch a, making b the LRU victim
        assert!(cache.get(&a).is_some());
        cache.insert(d, Tile::unavailable());

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert!(cache.contains(&d));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn hit_ratio() {
        let mut cache = TileCache::new(2);
        cache.insert(index(0, 0, 1), Tile::unavailable());

        let _ = cache.get(&index(0, 0, 1));
        let _ = cache.get(&index(0, 0, 1));
        let _ = cache.get(&index(5, 0, 4));

        let stats = cache.stats();
        assert!((stats.hit_ratio() - 2.0 / 3.0).abs() < 1e-12);
    }
}
