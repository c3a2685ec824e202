//! Bounded caching for decoded tiles.
//!
//! [`LruCache`] is the generic eviction machinery; [`TileCache`] is
//! the chunk-index-keyed cache the providers use. The temporal
//! provider reuses [`LruCache`] for its time-bucket map.

mod lru;
mod tile_cache;

pub use lru::LruCache;
pub use tile_cache::{CacheStats, TileCache};
