//! In-memory synthetic raster source.
//!
//! [`MemoryRasterSource`] generates deterministic pixel values on the
//! fly and needs no file or decode library. It backs the test suites
//! and is handy for procedural placeholder layers.

use super::raster::{
    GeoTransform, PixelRegion, RasterReadError, RasterSource, SampleType,
};

/// A synthetic raster source with a configurable pyramid.
///
/// Sample values are `(x + y + band) mod 256` in the overview's own
/// pixel coordinates, repeated across the sample's bytes, which makes
/// decoded buffers easy to assert against.
#[derive(Debug, Clone)]
pub struct MemoryRasterSource {
    width: usize,
    height: usize,
    bands: usize,
    sample_type: SampleType,
    overview_count: usize,
    geo_transform: GeoTransform,
    scale: f64,
    offset: f64,
    concurrent: bool,
}

impl MemoryRasterSource {
    /// Create a source of the given full-resolution size with one
    /// band, u8 samples, one overview level, and a global north-up
    /// transform.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: 1,
            sample_type: SampleType::U8,
            overview_count: 1,
            geo_transform: GeoTransform::global(width, height),
            scale: 1.0,
            offset: 0.0,
            concurrent: true,
        }
    }

    /// Set the number of bands.
    pub fn with_bands(mut self, bands: usize) -> Self {
        self.bands = bands;
        self
    }

    /// Set the sample type.
    pub fn with_sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    /// Set the number of overview levels (each halves the previous).
    pub fn with_overview_count(mut self, count: usize) -> Self {
        self.overview_count = count;
        self
    }

    /// Replace the geo-transform.
    pub fn with_geo_transform(mut self, transform: GeoTransform) -> Self {
        self.geo_transform = transform;
        self
    }

    /// Set the reported scale and offset.
    pub fn with_scale_offset(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Mark the source as unsafe for concurrent reads, forcing the
    /// pipeline to serialize reads on it.
    pub fn with_serialized_reads(mut self) -> Self {
        self.concurrent = false;
        self
    }
}

impl RasterSource for MemoryRasterSource {
    fn raster_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn band_count(&self) -> usize {
        self.bands
    }

    fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    fn overview_count(&self) -> usize {
        self.overview_count
    }

    fn overview_size(&self, overview: usize) -> (usize, usize) {
        ((self.width >> overview).max(1), (self.height >> overview).max(1))
    }

    fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    fn scale_offset(&self) -> (f64, f64) {
        (self.scale, self.offset)
    }

    fn concurrent_reads(&self) -> bool {
        self.concurrent
    }

    fn read_region(
        &self,
        band: usize,
        _overview: usize,
        region: PixelRegion,
    ) -> Result<Vec<u8>, RasterReadError> {
        let sample_size = self.sample_type.size_bytes();
        let mut bytes = Vec::with_capacity(region.pixel_count() * sample_size);
        for y in region.y..region.y + region.height as i64 {
            for x in region.x..region.x + region.width as i64 {
                let value = ((x + y + band as i64).rem_euclid(256)) as u8;
                bytes.extend(std::iter::repeat(value).take(sample_size));
            }
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_sizes_halve() {
        let source = MemoryRasterSource::new(1024, 512).with_overview_count(4);
        assert_eq!(source.overview_size(0), (1024, 512));
        assert_eq!(source.overview_size(1), (512, 256));
        assert_eq!(source.overview_size(3), (128, 64));
    }

    #[test]
    fn read_region_values_are_positional() {
        let source = MemoryRasterSource::new(8, 8);
        let bytes = source
            .read_region(0, 0, PixelRegion::new(2, 3, 2, 1))
            .unwrap();
        assert_eq!(bytes, vec![5, 6]);
    }

    #[test]
    fn read_region_respects_sample_size() {
        let source = MemoryRasterSource::new(8, 8).with_sample_type(SampleType::U16);
        let bytes = source
            .read_region(0, 0, PixelRegion::new(0, 0, 2, 2))
            .unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..2], &[0, 0]);
        assert_eq!(&bytes[2..4], &[1, 1]);
    }
}
