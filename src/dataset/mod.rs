//! Tile dataset layer: raster sources, region math, and decoding.
//!
//! This module owns the synchronous half of the tile pipeline. A
//! [`TileDataset`] sits on top of an opaque [`RasterSource`] (the
//! GDAL-shaped boundary) and turns chunk indices into decoded
//! [`RawTileData`] buffers plus the [`TileDepthTransform`] metadata
//! needed to interpret them.

mod error;
mod format;
mod memory;
mod raster;
mod tile_dataset;
mod types;

pub use error::DatasetError;
pub use format::{TextureChannels, TextureFormat};
pub use memory::MemoryRasterSource;
pub use raster::{
    GeoTransform, PixelRegion, RasterReadError, RasterSource, ReadSeverity, SampleType,
};
pub use tile_dataset::TileDataset;
pub use types::{RawTileData, TileDepthTransform, TileIoResult};
