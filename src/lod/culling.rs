//! Chunk visibility tests.
//!
//! Two independent cullers, both conservative: a chunk is considered
//! potentially visible only when both agree. [`FrustumCuller`] tests
//! the patch corner points against the clip volume; [`HorizonCuller`]
//! rejects chunks hidden behind the planet's bulge.

use glam::DVec3;

use super::context::RenderContext;
use crate::geodetic::{Ellipsoid, GeodeticPatch};

/// Clip-space visibility test over the patch corner points.
///
/// The patch is sampled at its four corners at heights zero and
/// `max_height`, giving eight points. The chunk is culled only when
/// all eight are outside the same clip plane; this is conservative
/// since a box can have all corners outside of some plane while its
/// interior intersects the volume, but never rejects a visible chunk
/// for that reason.
#[derive(Debug, Clone, Copy)]
pub struct FrustumCuller {
    /// Relative widening of the clip volume; positive values keep
    /// chunks slightly outside the frustum alive across fast camera
    /// pans.
    margin: f64,
}

impl Default for FrustumCuller {
    fn default() -> Self {
        Self { margin: 0.0 }
    }
}

impl FrustumCuller {
    /// A culler testing against the exact clip volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the clip volume by a relative margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Whether any part of the patch may intersect the view frustum.
    pub fn is_visible(
        &self,
        patch: &GeodeticPatch,
        ellipsoid: &Ellipsoid,
        max_height: f64,
        context: &RenderContext,
    ) -> bool {
        // outside-counts per clip plane: -x +x -y +y near far
        let mut outside = [0u8; 6];
        let mut total = 0u8;

        for corner in patch.corners() {
            for height in [0.0, max_height] {
                let point = ellipsoid.geodetic_to_cartesian(&corner, height);
                let clip = context.view_projection * point.extend(1.0);
                let w = clip.w * (1.0 + self.margin);

                if clip.x < -w {
                    outside[0] += 1;
                }
                if clip.x > w {
                    outside[1] += 1;
                }
                if clip.y < -w {
                    outside[2] += 1;
                }
                if clip.y > w {
                    outside[3] += 1;
                }
                if clip.z < 0.0 {
                    outside[4] += 1;
                }
                if clip.z > w {
                    outside[5] += 1;
                }
                total += 1;
            }
        }

        !outside.iter().any(|&count| count == total)
    }
}

/// Horizon visibility test on the minimum-radius sphere.
///
/// A surface point is hidden when its distance from the camera
/// exceeds the camera's horizon distance plus the horizon distance of
/// a point raised `max_height` above the surface; both follow from
/// the tangent-line relation `l = sqrt(h * (h + 2r))`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HorizonCuller;

impl HorizonCuller {
    pub fn new() -> Self {
        Self
    }

    /// Whether the patch may rise above the horizon as seen from
    /// `camera`.
    pub fn is_visible(
        &self,
        patch: &GeodeticPatch,
        ellipsoid: &Ellipsoid,
        max_height: f64,
        camera: DVec3,
    ) -> bool {
        let radius = ellipsoid.minimum_radius();
        let camera_height = camera.length() - radius;
        if camera_height <= 0.0 {
            // Inside the sphere there is no horizon to hide behind
            return true;
        }

        let camera_horizon = (camera_height * (camera_height + 2.0 * radius)).sqrt();
        let patch_horizon = (max_height * (max_height + 2.0 * radius)).sqrt();

        ellipsoid.distance_to_patch(patch, camera) <= camera_horizon + patch_horizon
    }
}
