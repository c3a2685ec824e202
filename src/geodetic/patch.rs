//! Geodetic patches: the lat/lon rectangle covered by one chunk.

use super::chunk_index::{ChunkIndex, ROOT_LEVEL};
use super::Geodetic2;

/// A lat/lon bounding rectangle on the ellipsoid surface.
///
/// Derived deterministically from a [`ChunkIndex`] and immutable once
/// constructed. At level `L` the globe is divided into `2^L` columns
/// and `2^(L-1)` rows, so each hemisphere root covers 180 x 180
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPatch {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl GeodeticPatch {
    /// Compute the patch for a chunk index.
    pub fn from_chunk_index(index: &ChunkIndex) -> Self {
        debug_assert!(index.level >= ROOT_LEVEL, "no patch above the hemisphere roots");

        let columns = 1u64 << index.level;
        let rows = 1u64 << (index.level - 1);

        let lon_step = 360.0 / columns as f64;
        let lat_step = 180.0 / rows as f64;

        let min_lon = -180.0 + index.x as f64 * lon_step;
        let max_lat = 90.0 - index.y as f64 * lat_step;

        Self {
            min_lat: max_lat - lat_step,
            max_lat,
            min_lon,
            max_lon: min_lon + lon_step,
        }
    }

    /// Minimum (southern) latitude in degrees.
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Maximum (northern) latitude in degrees.
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Minimum (western) longitude in degrees.
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Maximum (eastern) longitude in degrees.
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// The patch center.
    pub fn center(&self) -> Geodetic2 {
        Geodetic2::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// The four corners: NW, NE, SW, SE.
    pub fn corners(&self) -> [Geodetic2; 4] {
        [
            Geodetic2::new(self.max_lat, self.min_lon),
            Geodetic2::new(self.max_lat, self.max_lon),
            Geodetic2::new(self.min_lat, self.min_lon),
            Geodetic2::new(self.min_lat, self.max_lon),
        ]
    }

    /// The point inside the patch closest (in lat/lon) to `position`.
    ///
    /// Clamps the position into the rectangle. Used to find the patch
    /// surface point nearest the camera for distance-based LOD.
    pub fn closest_point(&self, position: Geodetic2) -> Geodetic2 {
        Geodetic2::new(
            position.lat.clamp(self.min_lat, self.max_lat),
            position.lon.clamp(self.min_lon, self.max_lon),
        )
    }

    /// Whether the patch contains the given position.
    pub fn contains(&self, position: Geodetic2) -> bool {
        position.lat >= self.min_lat
            && position.lat <= self.max_lat
            && position.lon >= self.min_lon
            && position.lon <= self.max_lon
    }
}
