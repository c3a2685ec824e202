//! Geodetic coordinate types for the quadtree globe.
//!
//! Provides the quadtree chunk key ([`ChunkIndex`]), the lat/lon
//! rectangle each chunk covers ([`GeodeticPatch`]), and the
//! [`Ellipsoid`] math needed to relate patches to 3D camera positions.

mod chunk_index;
mod ellipsoid;
mod patch;

pub use chunk_index::{ChunkIndex, Quadrant, LEFT_HEMISPHERE, RIGHT_HEMISPHERE, ROOT_LEVEL};
pub use ellipsoid::Ellipsoid;
pub use patch::GeodeticPatch;

/// A geodetic position: latitude and longitude in degrees.
///
/// Latitude is positive north, longitude positive east. Heights are
/// carried separately where needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic2 {
    /// Latitude in degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in degrees (-180 to 180).
    pub lon: f64,
}

impl Geodetic2 {
    /// Create a new geodetic position.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}
