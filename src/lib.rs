//! globestream - Quadtree LOD globe tile streaming and caching.
//!
//! This library implements the tile streaming core of an interactive
//! planetary renderer: a quadtree of levels-of-detail (LOD) over two
//! hemisphere root chunks, where each visible chunk's imagery/height
//! data is lazily read from a raster dataset, decoded on a worker
//! thread pool, and cached in a bounded LRU cache so the render thread
//! never blocks on I/O.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Render thread                          │
//! │   ChunkedLodGlobe::render  (split/merge, culling, draws)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ tile(index)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CachingTileProvider                        │
//! │   TileCache (bounded LRU)  +  pending-request tracking      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ enqueue / poll
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 AsyncTileDataProvider                       │
//! │   Worker thread pool, mpsc work/completion channels         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ read_tile_data (blocking)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TileDataset                           │
//! │   Region math, overview selection, band assembly, Y-flip    │
//! │              (over the RasterSource boundary)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use globestream::config::{GlobeConfig, LayerConfig};
//! use globestream::dataset::TileDataset;
//! use globestream::geodetic::Ellipsoid;
//! use globestream::lod::{ChunkLevelEvaluator, ChunkedLodGlobe, RenderContext};
//! use globestream::provider::CachingTileProvider;
//! use std::sync::Arc;
//!
//! let layer_config = LayerConfig::default().with_cache_size(1024);
//! let dataset = Arc::new(TileDataset::open(raster_source, &layer_config)?);
//! let mut provider = CachingTileProvider::new(dataset, &layer_config);
//!
//! let mut globe = ChunkedLodGlobe::new(
//!     GlobeConfig::default(),
//!     Ellipsoid::wgs84(),
//!     vec![ChunkLevelEvaluator::Distance { scale_factor: 200.0 }],
//! );
//!
//! // Per frame:
//! let ctx = RenderContext::new(camera_position, view_projection)
//!     .with_simulation_time(simulation_time);
//! for draw in globe.render(&ctx, &mut provider) {
//!     // upload draw.tile via a TileUploader and issue the patch draw call
//! }
//! ```
//!
//! The GPU upload interface, the raster decode library, and the scene
//! graph around the globe are external collaborators; they appear here
//! only as trait boundaries ([`provider::TileUploader`],
//! [`dataset::RasterSource`]).

pub mod cache;
pub mod config;
pub mod dataset;
pub mod geodetic;
pub mod lod;
pub mod provider;

/// Version of the globestream library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
