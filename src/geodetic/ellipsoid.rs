//! Ellipsoid math: geodetic/cartesian conversions and patch distances.
//!
//! The ellipsoid is an oblate spheroid (equal equatorial radii), which
//! covers every globe this pipeline renders. Cartesian coordinates are
//! ellipsoid-centered, z toward the north pole, x toward lat 0 lon 0.

use glam::DVec3;

use super::patch::GeodeticPatch;
use super::Geodetic2;

/// An oblate spheroid described by its equatorial and polar radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    equatorial_radius: f64,
    polar_radius: f64,
    /// First eccentricity squared, `1 - (b/a)^2`.
    eccentricity_squared: f64,
}

impl Ellipsoid {
    /// Create an ellipsoid from equatorial and polar radii in meters.
    pub fn new(equatorial_radius: f64, polar_radius: f64) -> Self {
        debug_assert!(equatorial_radius > 0.0 && polar_radius > 0.0);
        let ratio = polar_radius / equatorial_radius;
        Self {
            equatorial_radius,
            polar_radius,
            eccentricity_squared: 1.0 - ratio * ratio,
        }
    }

    /// The WGS84 Earth ellipsoid.
    pub fn wgs84() -> Self {
        Self::new(6_378_137.0, 6_356_752.314_245)
    }

    /// A perfect sphere of the given radius.
    pub fn sphere(radius: f64) -> Self {
        Self::new(radius, radius)
    }

    /// The smallest radius of the ellipsoid (the polar radius).
    pub fn minimum_radius(&self) -> f64 {
        self.polar_radius.min(self.equatorial_radius)
    }

    /// The equatorial radius.
    pub fn maximum_radius(&self) -> f64 {
        self.polar_radius.max(self.equatorial_radius)
    }

    /// Convert a geodetic position plus height above the surface to
    /// cartesian coordinates.
    pub fn geodetic_to_cartesian(&self, position: &Geodetic2, height: f64) -> DVec3 {
        let lat = position.lat.to_radians();
        let lon = position.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        // Prime vertical radius of curvature
        let n = self.equatorial_radius
            / (1.0 - self.eccentricity_squared * sin_lat * sin_lat).sqrt();

        DVec3::new(
            (n + height) * cos_lat * cos_lon,
            (n + height) * cos_lat * sin_lon,
            (n * (1.0 - self.eccentricity_squared) + height) * sin_lat,
        )
    }

    /// Convert cartesian coordinates back to a geodetic position.
    ///
    /// Uses the standard fixed-point iteration on the geodetic
    /// latitude; converges to well below a millimeter in a handful of
    /// steps for positions outside the core.
    pub fn cartesian_to_geodetic(&self, point: DVec3) -> Geodetic2 {
        let lon = point.y.atan2(point.x);
        let p = (point.x * point.x + point.y * point.y).sqrt();

        if p < f64::EPSILON {
            // On the polar axis
            let lat = if point.z >= 0.0 { 90.0 } else { -90.0 };
            return Geodetic2::new(lat, lon.to_degrees());
        }

        // Start from the geocentric latitude and iterate
        let mut lat = (point.z / (p * (1.0 - self.eccentricity_squared))).atan();
        for _ in 0..4 {
            let sin_lat = lat.sin();
            let n = self.equatorial_radius
                / (1.0 - self.eccentricity_squared * sin_lat * sin_lat).sqrt();
            let height = p / lat.cos() - n;
            lat = (point.z / (p * (1.0 - self.eccentricity_squared * n / (n + height))))
                .atan();
        }

        Geodetic2::new(lat.to_degrees(), lon.to_degrees())
    }

    /// Distance from `point` to the closest surface point of `patch`.
    ///
    /// The closest point is found by clamping the point's geodetic
    /// position into the patch rectangle and projecting back onto the
    /// surface.
    pub fn distance_to_patch(&self, patch: &GeodeticPatch, point: DVec3) -> f64 {
        let geodetic = self.cartesian_to_geodetic(point);
        let closest = patch.closest_point(geodetic);
        (self.geodetic_to_cartesian(&closest, 0.0) - point).length()
    }
}
