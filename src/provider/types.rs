//! Tile provider types and the GPU upload boundary.

use std::sync::Arc;

use thiserror::Error;

use crate::dataset::{RawTileData, TileDepthTransform};
use crate::geodetic::ChunkIndex;

/// Availability of a tile at the moment of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    /// Not in the cache; a read may be in flight. Render a coarser
    /// ancestor or a placeholder and ask again next frame.
    Unavailable,
    /// Resident in the cache and ready for upload.
    Cached,
    /// The request lies outside what the dataset can ever supply
    /// (deeper than its maximum level).
    OutOfRange,
}

/// A cache-resident, GPU-uploadable tile.
///
/// Carries decoded pixels only in the [`TileStatus::Cached`] state.
/// Cloning is cheap: pixel data is shared.
#[derive(Debug, Clone)]
pub struct Tile {
    status: TileStatus,
    data: Option<Arc<RawTileData>>,
    depth_transform: Option<TileDepthTransform>,
}

impl Tile {
    /// A tile that is not (yet) available.
    pub fn unavailable() -> Self {
        Self {
            status: TileStatus::Unavailable,
            data: None,
            depth_transform: None,
        }
    }

    /// A tile the dataset can never supply.
    pub fn out_of_range() -> Self {
        Self {
            status: TileStatus::OutOfRange,
            data: None,
            depth_transform: None,
        }
    }

    /// A ready tile with decoded pixels.
    pub fn cached(data: Arc<RawTileData>, depth_transform: TileDepthTransform) -> Self {
        Self {
            status: TileStatus::Cached,
            data: Some(data),
            depth_transform: Some(depth_transform),
        }
    }

    /// The tile's availability status.
    pub fn status(&self) -> TileStatus {
        self.status
    }

    /// Decoded pixels, present iff `status()` is `Cached`.
    pub fn data(&self) -> Option<&Arc<RawTileData>> {
        self.data.as_ref()
    }

    /// Depth transform for interpreting the pixels.
    pub fn depth_transform(&self) -> Option<TileDepthTransform> {
        self.depth_transform
    }

    /// Whether the tile can be uploaded and drawn.
    pub fn is_renderable(&self) -> bool {
        self.status == TileStatus::Cached
    }
}

/// Opaque handle to a texture resident on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureHandle(pub u64);

/// The GPU texture upload boundary.
///
/// Consumed by the renderer after a tile transitions to `Cached`; the
/// OpenGL (or other) implementation lives outside this crate.
pub trait TileUploader {
    /// Upload decoded pixels, returning the resident texture handle.
    fn upload_tile(&mut self, tile: &RawTileData) -> GpuTextureHandle;
}

/// Errors from the async tile request path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The in-flight read cap is reached; retry on a later frame.
    #[error("tile read queue is full")]
    QueueFull,

    /// The worker pool has shut down and accepts no more work.
    #[error("tile worker pool has shut down")]
    PoolShutDown,
}

/// A source of tiles the renderer can draw from.
///
/// Implemented by [`crate::provider::CachingTileProvider`] directly
/// and by [`crate::provider::TemporalTileProvider`] via its active
/// time bucket. Render-thread only: implementations are free to keep
/// single-threaded interior state.
pub trait TileProvider {
    /// The tile for a chunk, by status. A miss triggers an async
    /// fetch; the call itself never blocks.
    fn tile(&mut self, index: ChunkIndex) -> Tile;

    /// Per-frame tick: drain completed async reads into the cache on
    /// the provider's own cadence.
    fn update(&mut self);

    /// The deepest level this provider can ever supply, if known.
    fn maximum_level(&self) -> Option<i32> {
        None
    }
}
