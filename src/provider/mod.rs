//! Tile provisioning: from chunk index to renderable tile.
//!
//! The provider layer connects the globe traversal to the dataset
//! machinery. [`CachingTileProvider`] answers every request instantly
//! from its cache or kicks off an async read via
//! [`AsyncTileDataProvider`]; [`TemporalTileProvider`] multiplexes
//! caching providers across time steps. The renderer talks to all of
//! them through the [`TileProvider`] trait.

mod async_provider;
mod caching;
mod temporal;
mod types;

pub use async_provider::AsyncTileDataProvider;
pub use caching::CachingTileProvider;
pub use temporal::{
    TemporalDatasetSource, TemporalTileProvider, TimeFormatError, TimeKey, TimeQuantizer,
    DEFAULT_MAX_BUCKETS,
};
pub use types::{GpuTextureHandle, ProviderError, Tile, TileProvider, TileStatus, TileUploader};
