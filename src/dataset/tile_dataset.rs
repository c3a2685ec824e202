//! Tile dataset: chunk index to decoded pixels.
//!
//! [`TileDataset`] translates a [`ChunkIndex`] into a concrete pixel
//! region of an opened raster source, performs the blocking read over
//! the [`RasterSource`] boundary, and returns the raw decoded pixels
//! plus the metadata needed to interpret them.
//!
//! All reads are synchronous and stateless per call; the only state is
//! the open source handle and the values derived from it at open time.
//! [`read_tile_data`](TileDataset::read_tile_data) runs on worker
//! threads in the steady state and must never be called on the render
//! thread there.

use std::sync::Arc;

use super::error::DatasetError;
use super::format::TextureFormat;
use super::raster::{PixelRegion, RasterSource, ReadSeverity};
use super::types::{RawTileData, TileDepthTransform, TileIoResult};
use crate::config::LayerConfig;
use crate::geodetic::{ChunkIndex, Geodetic2, GeodeticPatch};

/// An opened raster dataset aligned with the quadtree.
pub struct TileDataset {
    source: Arc<dyn RasterSource>,
    minimum_pixel_size: u32,
    tile_level_difference: i32,
    depth_transform: TileDepthTransform,
    format: TextureFormat,
}

impl TileDataset {
    /// Open a dataset over a raster source.
    ///
    /// Validates the source and precomputes the depth transform and
    /// the alignment between the source's resolution pyramid and the
    /// quadtree levels. Failure here is fatal to constructing the
    /// provider: the layer is not added.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::InvalidMinimumPixelSize`] if the configured
    ///   minimum pixel size is not a power of two
    /// - [`DatasetError::NoOverviews`] if the source has no levels
    /// - [`DatasetError::NonInvertibleTransform`] if the source's
    ///   geo-transform cannot be inverted
    pub fn open(
        source: Arc<dyn RasterSource>,
        config: &LayerConfig,
    ) -> Result<Self, DatasetError> {
        let minimum_pixel_size = config.minimum_pixel_size;
        if minimum_pixel_size < 2 || !minimum_pixel_size.is_power_of_two() {
            return Err(DatasetError::InvalidMinimumPixelSize(minimum_pixel_size));
        }
        if source.overview_count() == 0 {
            return Err(DatasetError::NoOverviews);
        }
        if !source.geo_transform().is_invertible() {
            return Err(DatasetError::NonInvertibleTransform);
        }

        let sample_type = source.sample_type();
        let (scale, offset) = source.scale_offset();
        let depth_transform = TileDepthTransform {
            depth_scale: scale * sample_type.depth_multiplier(),
            depth_offset: offset,
        };

        // Align the dataset pyramid with quadtree levels: how many
        // levels the coarsest overview sits above one tile's worth of
        // pixels.
        let (coarsest_w, coarsest_h) = source.overview_size(source.overview_count() - 1);
        let coarsest_size = coarsest_w.max(coarsest_h).max(1);
        let tile_level_difference =
            ((minimum_pixel_size as f64).log2() - (coarsest_size as f64).log2()).round() as i32;

        let format = TextureFormat::for_raster(source.band_count(), sample_type);

        tracing::debug!(
            overviews = source.overview_count(),
            coarsest_size,
            tile_level_difference,
            ?format,
            "tile dataset opened"
        );

        Ok(Self {
            source,
            minimum_pixel_size,
            tile_level_difference,
            depth_transform,
            format,
        })
    }

    /// The deepest quadtree level for which real data exists.
    ///
    /// Deeper chunks can only be synthesized by upsampling, so the LOD
    /// traversal may clamp its desired level here.
    pub fn maximum_level(&self) -> i32 {
        self.source.overview_count() as i32 - 1 - self.tile_level_difference
    }

    /// The pyramid alignment offset computed at open time.
    pub fn tile_level_difference(&self) -> i32 {
        self.tile_level_difference
    }

    /// The depth transform for interpreting this dataset's samples.
    pub fn depth_transform(&self) -> TileDepthTransform {
        self.depth_transform
    }

    /// The texture format tiles from this dataset decode to.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Whether the underlying source supports concurrent reads on its
    /// single shared handle.
    pub fn concurrent_reads(&self) -> bool {
        self.source.concurrent_reads()
    }

    /// Map a geodetic position to full-resolution pixel coordinates.
    pub fn geodetic_to_pixel(&self, position: &Geodetic2) -> (f64, f64) {
        self.source.geo_transform().geodetic_to_pixel(position)
    }

    /// Read and decode the tile for a chunk index. BLOCKING.
    ///
    /// Computes the chunk's geodetic patch, maps its corners to pixel
    /// coordinates, picks the overview level best matching the
    /// requested span, reads each band into an interleaved buffer and
    /// Y-flips the result into bottom-to-top row order.
    ///
    /// Per-band problems are recorded as the worst severity seen while
    /// the remaining bands are still assembled; only a fatal severity
    /// aborts the tile. Never panics for data-dependent reasons.
    pub fn read_tile_data(&self, index: ChunkIndex) -> TileIoResult {
        let patch = GeodeticPatch::from_chunk_index(&index);
        let transform = self.source.geo_transform();

        let (x0, y0) =
            transform.geodetic_to_pixel(&Geodetic2::new(patch.max_lat(), patch.min_lon()));
        let (x1, y1) =
            transform.geodetic_to_pixel(&Geodetic2::new(patch.min_lat(), patch.max_lon()));

        let left = x0.min(x1);
        let top = y0.min(y1);
        let full_region = PixelRegion::new(
            left.floor() as i64,
            top.floor() as i64,
            (x0.max(x1).ceil() - left.floor()).max(0.0) as usize,
            (y0.max(y1).ceil() - top.floor()).max(0.0) as usize,
        );

        let overview = self.select_overview(full_region.width.max(full_region.height));
        let (overview_w, overview_h) = self.source.overview_size(overview);
        let (full_w, full_h) = self.source.raster_size();
        let scale_x = overview_w as f64 / full_w.max(1) as f64;
        let scale_y = overview_h as f64 / full_h.max(1) as f64;

        let region = PixelRegion::new(
            (full_region.x as f64 * scale_x).floor() as i64,
            (full_region.y as f64 * scale_y).floor() as i64,
            ((full_region.width as f64 * scale_x).ceil() as usize).max(1),
            ((full_region.height as f64 * scale_y).ceil() as usize).max(1),
        )
        .clamped_to(overview_w, overview_h);

        if region.is_empty() {
            tracing::debug!(index = %index, "chunk maps to no pixels in dataset");
            return TileIoResult::failed(index, ReadSeverity::Failure);
        }

        let bands = self.source.band_count();
        let sample_size = self.source.sample_type().size_bytes();
        let pixel_count = region.pixel_count();
        let expected_band_bytes = pixel_count * sample_size;
        let mut pixels = vec![0u8; pixel_count * bands * sample_size];
        let mut worst = ReadSeverity::None;

        for band in 0..bands {
            match self.source.read_region(band, overview, region) {
                Ok(band_bytes) => {
                    if band_bytes.len() != expected_band_bytes {
                        tracing::warn!(
                            index = %index,
                            band,
                            got = band_bytes.len(),
                            expected = expected_band_bytes,
                            "band read returned wrong size, leaving band blank"
                        );
                        worst = worst.max(ReadSeverity::Failure);
                        continue;
                    }
                    // Interleave: band-sequential samples into per-pixel slots
                    for pixel in 0..pixel_count {
                        let src = pixel * sample_size;
                        let dst = (pixel * bands + band) * sample_size;
                        pixels[dst..dst + sample_size]
                            .copy_from_slice(&band_bytes[src..src + sample_size]);
                    }
                }
                Err(error) => {
                    worst = worst.max(error.severity);
                    if error.severity >= ReadSeverity::Fatal {
                        tracing::warn!(index = %index, band, %error, "fatal band read, aborting tile");
                        return TileIoResult::failed(index, ReadSeverity::Fatal);
                    }
                    tracing::debug!(index = %index, band, %error, "band read failed");
                }
            }
        }

        // Raster convention is top-to-bottom; the renderer wants
        // bottom-to-top.
        let stride = region.width * bands * sample_size;
        for row in 0..region.height / 2 {
            let a = row * stride;
            let b = (region.height - 1 - row) * stride;
            for i in 0..stride {
                pixels.swap(a + i, b + i);
            }
        }

        TileIoResult::with_data(
            index,
            worst,
            RawTileData {
                chunk_index: index,
                width: region.width,
                height: region.height,
                format: self.format,
                pixels,
            },
        )
    }

    /// Pick the overview whose resolution best matches reading the
    /// given full-resolution span at the configured tile size.
    ///
    /// Compares the span as it would appear in each overview against
    /// the minimum pixel size; the result is inherently clamped to
    /// `[0, overview_count - 1]`.
    fn select_overview(&self, full_res_span: usize) -> usize {
        let (full_w, full_h) = self.source.raster_size();
        let full_size = full_w.max(full_h).max(1) as f64;
        let target = (self.minimum_pixel_size as f64).log2();
        let span = full_res_span.max(1) as f64;

        let mut best = 0;
        let mut best_score = f64::INFINITY;
        for overview in 0..self.source.overview_count() {
            let (w, h) = self.source.overview_size(overview);
            let factor = w.max(h).max(1) as f64 / full_size;
            let score = ((span * factor).log2() - target).abs();
            if score < best_score {
                best_score = score;
                best = overview;
            }
        }
        best
    }
}
