//! The raster data source boundary.
//!
//! [`RasterSource`] is the narrow, GDAL-shaped interface the tile
//! pipeline reads through: raster geometry queries, the affine
//! geo-transform, and blocking region reads. The decode library
//! itself lives behind this trait and is out of scope here.

use thiserror::Error;

use crate::geodetic::Geodetic2;

/// Sample type of one raster band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl SampleType {
    /// Size of one sample in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::I16 | SampleType::U16 => 2,
            SampleType::I32 | SampleType::U32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Whether this is a floating-point type.
    pub fn is_floating_point(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// The multiplier mapping the full integer range to physical
    /// units for the depth transform.
    ///
    /// Floating-point samples need no integer-range rescaling, so the
    /// multiplier is 1.0.
    pub fn depth_multiplier(&self) -> f64 {
        match self {
            SampleType::U8 => u8::MAX as f64,
            SampleType::I16 => i16::MAX as f64,
            SampleType::U16 => u16::MAX as f64,
            SampleType::I32 => i32::MAX as f64,
            SampleType::U32 => u32::MAX as f64,
            SampleType::F32 | SampleType::F64 => 1.0,
        }
    }
}

/// The affine transform relating pixel coordinates to geodetic
/// coordinates.
///
/// Coefficient layout follows the usual raster convention:
///
/// ```text
/// lon = c[0] + px * c[1] + py * c[2]
/// lat = c[3] + px * c[4] + py * c[5]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// The six affine coefficients.
    pub coefficients: [f64; 6],
}

impl GeoTransform {
    /// Create a transform from raw coefficients.
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    /// A north-up transform covering the whole globe with the given
    /// full-resolution raster size.
    pub fn global(width: usize, height: usize) -> Self {
        Self::new([
            -180.0,
            360.0 / width as f64,
            0.0,
            90.0,
            0.0,
            -180.0 / height as f64,
        ])
    }

    /// Determinant of the 2x2 linear part.
    pub fn determinant(&self) -> f64 {
        let c = &self.coefficients;
        c[1] * c[5] - c[2] * c[4]
    }

    /// Whether the linear part is invertible.
    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() > 1e-15
    }

    /// Map pixel coordinates to a geodetic position.
    #[inline]
    pub fn pixel_to_geodetic(&self, px: f64, py: f64) -> Geodetic2 {
        let c = &self.coefficients;
        Geodetic2::new(c[3] + px * c[4] + py * c[5], c[0] + px * c[1] + py * c[2])
    }

    /// Map a geodetic position to pixel coordinates.
    ///
    /// Closed-form 2x2 linear solve of the inverse. The transform must
    /// be invertible; callers validate this once at open time.
    #[inline]
    pub fn geodetic_to_pixel(&self, position: &Geodetic2) -> (f64, f64) {
        let c = &self.coefficients;
        let det = self.determinant();
        debug_assert!(det.abs() > 1e-15, "geo-transform is not invertible");

        let dlon = position.lon - c[0];
        let dlat = position.lat - c[3];
        let px = (dlon * c[5] - dlat * c[2]) / det;
        let py = (dlat * c[1] - dlon * c[4]) / det;

        // Round-tripping the coordinate must be exact to within 1e-10
        debug_assert!({
            let back = self.pixel_to_geodetic(px, py);
            (back.lon - position.lon).abs() < 1e-10 && (back.lat - position.lat).abs() < 1e-10
        });

        (px, py)
    }
}

/// A rectangular pixel region within one overview level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left edge in pixels (may be negative before clamping).
    pub x: i64,
    /// Top edge in pixels (may be negative before clamping).
    pub y: i64,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl PixelRegion {
    /// Create a new region.
    pub fn new(x: i64, y: i64, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels in the region.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Whether the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp the region to the bounds of a raster of the given size.
    pub fn clamped_to(&self, raster_width: usize, raster_height: usize) -> PixelRegion {
        let x0 = self.x.clamp(0, raster_width as i64);
        let y0 = self.y.clamp(0, raster_height as i64);
        let x1 = (self.x + self.width as i64).clamp(0, raster_width as i64);
        let y1 = (self.y + self.height as i64).clamp(0, raster_height as i64);
        PixelRegion {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0) as usize,
            height: (y1 - y0).max(0) as usize,
        }
    }
}

/// Severity of a raster read problem, worst last.
///
/// Mirrors the severity ladder of the underlying raster library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadSeverity {
    None,
    Debug,
    Warning,
    Failure,
    Fatal,
}

/// An error reading a raster region.
#[derive(Debug, Clone, Error)]
#[error("raster read failed ({severity:?}): {message}")]
pub struct RasterReadError {
    /// How bad the problem is.
    pub severity: ReadSeverity,
    /// Human-readable description.
    pub message: String,
}

impl RasterReadError {
    /// Create a new read error.
    pub fn new(severity: ReadSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// A raster data source with a resolution pyramid.
///
/// Overview 0 is the full-resolution raster; overview `i` halves the
/// resolution of overview `i-1`, with `overview_count() - 1` the
/// coarsest. One handle is shared read-only across worker threads;
/// sources that cannot serve concurrent reads on one handle return
/// `false` from [`RasterSource::concurrent_reads`] and the pipeline
/// serializes reads for them.
pub trait RasterSource: Send + Sync {
    /// Full-resolution raster size as (width, height) in pixels.
    fn raster_size(&self) -> (usize, usize);

    /// Number of bands (1 to 4 for renderable data).
    fn band_count(&self) -> usize;

    /// Sample type shared by all bands.
    fn sample_type(&self) -> SampleType;

    /// Number of overview levels, including full resolution.
    fn overview_count(&self) -> usize;

    /// Size of the given overview level as (width, height) in pixels.
    fn overview_size(&self, overview: usize) -> (usize, usize);

    /// The pixel-to-geodetic affine transform at full resolution.
    fn geo_transform(&self) -> GeoTransform;

    /// Dataset-reported (scale, offset) for interpreting samples as
    /// physical depth values.
    fn scale_offset(&self) -> (f64, f64) {
        (1.0, 0.0)
    }

    /// Whether concurrent reads on this handle are safe.
    fn concurrent_reads(&self) -> bool {
        true
    }

    /// Read one band's samples for a region of an overview level.
    ///
    /// BLOCKING. The region is in the overview's own pixel coordinates
    /// and already clamped to its bounds. Returns the samples row by
    /// row, top to bottom, `region.pixel_count() * sample size` bytes.
    fn read_region(
        &self,
        band: usize,
        overview: usize,
        region: PixelRegion,
    ) -> Result<Vec<u8>, RasterReadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_transform_corners() {
        let transform = GeoTransform::global(360, 180);

        let nw = transform.pixel_to_geodetic(0.0, 0.0);
        assert_eq!(nw.lon, -180.0);
        assert_eq!(nw.lat, 90.0);

        let se = transform.pixel_to_geodetic(360.0, 180.0);
        assert_eq!(se.lon, 180.0);
        assert_eq!(se.lat, -90.0);
    }

    #[test]
    fn geodetic_pixel_roundtrip_within_tolerance() {
        // Includes a rotated transform to exercise the full 2x2 solve
        let transforms = [
            GeoTransform::global(4096, 2048),
            GeoTransform::new([-180.0, 0.05, 0.001, 90.0, -0.002, -0.05]),
        ];

        for transform in transforms {
            assert!(transform.is_invertible());
            for (lat, lon) in [(0.0, 0.0), (42.5, -71.1), (-89.9, 179.9), (13.37, 0.01)] {
                let position = Geodetic2::new(lat, lon);
                let (px, py) = transform.geodetic_to_pixel(&position);
                let back = transform.pixel_to_geodetic(px, py);
                assert!((back.lat - lat).abs() < 1e-10);
                assert!((back.lon - lon).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn degenerate_transform_is_not_invertible() {
        let transform = GeoTransform::new([0.0, 1.0, 2.0, 0.0, 2.0, 4.0]);
        assert!(!transform.is_invertible());
    }

    #[test]
    fn pixel_region_clamping() {
        let region = PixelRegion::new(-10, 5, 40, 40);
        let clamped = region.clamped_to(30, 30);

        assert_eq!(clamped.x, 0);
        assert_eq!(clamped.y, 5);
        assert_eq!(clamped.width, 30);
        assert_eq!(clamped.height, 25);
    }

    #[test]
    fn pixel_region_fully_outside_is_empty() {
        let region = PixelRegion::new(100, 100, 10, 10);
        assert!(region.clamped_to(50, 50).is_empty());
    }

    #[test]
    fn severity_ordering() {
        assert!(ReadSeverity::None < ReadSeverity::Warning);
        assert!(ReadSeverity::Warning < ReadSeverity::Failure);
        assert!(ReadSeverity::Failure < ReadSeverity::Fatal);
    }

    #[test]
    fn sample_type_sizes() {
        assert_eq!(SampleType::U8.size_bytes(), 1);
        assert_eq!(SampleType::U16.size_bytes(), 2);
        assert_eq!(SampleType::F32.size_bytes(), 4);
        assert_eq!(SampleType::F64.size_bytes(), 8);
    }

    #[test]
    fn float_types_have_unit_depth_multiplier() {
        assert_eq!(SampleType::F32.depth_multiplier(), 1.0);
        assert_eq!(SampleType::F64.depth_multiplier(), 1.0);
        assert_eq!(SampleType::U8.depth_multiplier(), 255.0);
        assert_eq!(SampleType::U16.depth_multiplier(), 65535.0);
    }
}
