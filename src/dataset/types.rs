//! Data carriers flowing out of tile reads.

use super::format::TextureFormat;
use super::raster::ReadSeverity;
use crate::geodetic::ChunkIndex;

/// Scale and offset mapping raw samples to physical depth units.
///
/// `depth = sample * depth_scale + depth_offset`. Computed once at
/// dataset open time from the dataset-reported scale/offset and the
/// sample type's integer-range multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDepthTransform {
    /// Multiplier applied to raw samples.
    pub depth_scale: f64,
    /// Offset added after scaling.
    pub depth_offset: f64,
}

impl TileDepthTransform {
    /// The identity transform.
    pub const IDENTITY: TileDepthTransform = TileDepthTransform {
        depth_scale: 1.0,
        depth_offset: 0.0,
    };
}

/// A decoded pixel buffer for one chunk.
///
/// Rows are bottom-to-top (already Y-flipped from the raster's
/// top-to-bottom convention), channels interleaved per pixel. Owned by
/// the cache until uploaded or evicted.
#[derive(Debug, Clone)]
pub struct RawTileData {
    /// The chunk this tile belongs to.
    pub chunk_index: ChunkIndex,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Pixel format of `pixels`.
    pub format: TextureFormat,
    /// Interleaved pixel data, `width * height * bytes_per_pixel`.
    pub pixels: Vec<u8>,
}

impl RawTileData {
    /// Size of one row in bytes.
    pub fn row_stride(&self) -> usize {
        self.width * self.format.bytes_per_pixel()
    }

    /// Total size of the pixel buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// The unit of async read completion: the decoded tile (absent on
/// failure) plus the worst severity seen while assembling it.
#[derive(Debug, Clone)]
pub struct TileIoResult {
    /// The chunk the read was for.
    pub chunk_index: ChunkIndex,
    /// Worst severity recorded across all band reads.
    pub severity: ReadSeverity,
    /// The decoded tile; `None` on fatal failure.
    pub data: Option<RawTileData>,
}

impl TileIoResult {
    /// A result carrying decoded data.
    pub fn with_data(chunk_index: ChunkIndex, severity: ReadSeverity, data: RawTileData) -> Self {
        Self {
            chunk_index,
            severity,
            data: Some(data),
        }
    }

    /// A failed result with no data.
    pub fn failed(chunk_index: ChunkIndex, severity: ReadSeverity) -> Self {
        Self {
            chunk_index,
            severity,
            data: None,
        }
    }

    /// Whether the tile is usable for caching and upload.
    ///
    /// Warnings keep the tile; failures and worse discard it.
    pub fn is_usable(&self) -> bool {
        self.data.is_some() && self.severity <= ReadSeverity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::format::{TextureChannels, TextureFormat};
    use crate::dataset::raster::SampleType;

    fn tiny_tile(index: ChunkIndex) -> RawTileData {
        let format = TextureFormat {
            channels: TextureChannels::Red,
            sample_type: SampleType::U8,
        };
        RawTileData {
            chunk_index: index,
            width: 2,
            height: 2,
            format,
            pixels: vec![0; 4],
        }
    }

    #[test]
    fn row_stride_and_size() {
        let tile = tiny_tile(ChunkIndex::new(0, 0, 1));
        assert_eq!(tile.row_stride(), 2);
        assert_eq!(tile.size_bytes(), 4);
    }

    #[test]
    fn usability_by_severity() {
        let index = ChunkIndex::new(0, 0, 1);

        let clean = TileIoResult::with_data(index, ReadSeverity::None, tiny_tile(index));
        assert!(clean.is_usable());

        let warned = TileIoResult::with_data(index, ReadSeverity::Warning, tiny_tile(index));
        assert!(warned.is_usable());

        let failed = TileIoResult::with_data(index, ReadSeverity::Failure, tiny_tile(index));
        assert!(!failed.is_usable());

        let fatal = TileIoResult::failed(index, ReadSeverity::Fatal);
        assert!(!fatal.is_usable());
    }
}
