//! Desired-level heuristics.
//!
//! The evaluator set is closed: distance to the camera, projected
//! screen area, and a cap at the level the dataset can actually
//! supply. A globe carries a list of evaluators and uses the most
//! conservative (smallest) answer, so the data-availability variant
//! composes with either heuristic as a cap.

use glam::DVec2;

use super::chunk::Chunk;
use super::context::RenderContext;
use crate::geodetic::Ellipsoid;

/// One desired-level heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkLevelEvaluator {
    /// Level from the 3D distance between the camera and the closest
    /// surface point of the chunk's patch. Halving the distance asks
    /// for one more level.
    Distance {
        /// Scales the distance-to-level mapping; larger values split
        /// deeper at the same distance.
        scale_factor: f64,
    },
    /// Level from the patch's projected area in normalized device
    /// coordinates. Unlike [`Distance`](Self::Distance) this accounts
    /// for the foreshortening of patches seen edge-on.
    ProjectedArea {
        /// Scales the area-to-level mapping; larger values split
        /// deeper at the same screen coverage.
        scale_factor: f64,
    },
    /// Caps the level at the deepest one the dataset can supply, so
    /// the tree never splits past the data's native resolution.
    AvailableTileData { maximum_level: i32 },
}

impl ChunkLevelEvaluator {
    /// The level this heuristic wants for `chunk`. Unclamped; the
    /// split/merge logic clamps to the configured depth bounds.
    pub fn desired_level(
        &self,
        chunk: &Chunk,
        ellipsoid: &Ellipsoid,
        context: &RenderContext,
    ) -> i32 {
        match *self {
            Self::Distance { scale_factor } => {
                let distance = ellipsoid
                    .distance_to_patch(chunk.patch(), context.camera_position)
                    .max(1e-9);
                (scale_factor * ellipsoid.minimum_radius() / distance)
                    .log2()
                    .ceil() as i32
            }
            Self::ProjectedArea { scale_factor } => {
                // NW, NE, SW, SE surface corners in NDC
                let mut ndc = [DVec2::ZERO; 4];
                for (slot, corner) in ndc.iter_mut().zip(chunk.patch().corners()) {
                    let point = ellipsoid.geodetic_to_cartesian(&corner, 0.0);
                    let clip = context.view_projection * point.extend(1.0);
                    if clip.w <= f64::EPSILON {
                        // A corner at or behind the camera means the
                        // patch is at point-blank range
                        return chunk.index().level as i32 + 1;
                    }
                    *slot = DVec2::new(clip.x / clip.w, clip.y / clip.w);
                }

                // Shoelace over the quad in winding order
                let quad = [ndc[0], ndc[1], ndc[3], ndc[2]];
                let mut doubled_area = 0.0;
                for i in 0..4 {
                    let a = quad[i];
                    let b = quad[(i + 1) % 4];
                    doubled_area += a.x * b.y - b.x * a.y;
                }
                let area = (doubled_area / 2.0).abs();
                if area <= 0.0 {
                    return 0;
                }

                // One level deeper per doubling of projected edge
                // length relative to the target
                chunk.index().level as i32 + (scale_factor * area.sqrt()).log2().round() as i32
            }
            Self::AvailableTileData { maximum_level } => maximum_level,
        }
    }
}
