//! Per-chunk split/merge decisions.

use super::context::RenderContext;
use super::culling::{FrustumCuller, HorizonCuller};
use super::evaluator::ChunkLevelEvaluator;
use crate::config::GlobeConfig;
use crate::geodetic::{ChunkIndex, Ellipsoid, GeodeticPatch};

/// What a chunk wants to happen to itself this frame.
///
/// Re-evaluated from scratch every frame, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The chunk is at its desired level.
    DoNothing,
    /// More detail wanted: split into four children.
    WantSplit,
    /// Less detail wanted (or off-screen): collapse the subtree.
    WantMerge,
}

/// Everything a chunk needs to decide its fate for one frame.
///
/// Borrowed from the owning globe and threaded through the traversal,
/// so chunks reach no ambient state.
pub struct FrameContext<'a> {
    pub config: &'a GlobeConfig,
    pub ellipsoid: &'a Ellipsoid,
    pub evaluators: &'a [ChunkLevelEvaluator],
    pub frustum: &'a FrustumCuller,
    pub horizon: &'a HorizonCuller,
    pub render: &'a RenderContext,
}

impl FrameContext<'_> {
    /// The most conservative desired level across the evaluators.
    fn desired_level(&self, chunk: &Chunk) -> i32 {
        self.evaluators
            .iter()
            .map(|evaluator| evaluator.desired_level(chunk, self.ellipsoid, self.render))
            .min()
            .unwrap_or(chunk.index.level as i32)
    }
}

/// One quadtree node's surface patch and per-frame LOD state.
///
/// Holds no tile data; tiles are fetched on demand through the
/// provider when the chunk is drawn.
#[derive(Debug, Clone)]
pub struct Chunk {
    index: ChunkIndex,
    patch: GeodeticPatch,
    visible: bool,
}

impl Chunk {
    pub fn new(index: ChunkIndex) -> Self {
        Self {
            index,
            patch: GeodeticPatch::from_chunk_index(&index),
            visible: true,
        }
    }

    pub fn index(&self) -> ChunkIndex {
        self.index
    }

    pub fn patch(&self) -> &GeodeticPatch {
        &self.patch
    }

    /// Visibility as of the last [`update`](Self::update).
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Recompute visibility and the split/merge decision for this
    /// frame.
    ///
    /// Both cullers must agree the chunk is potentially visible; an
    /// invisible chunk merges immediately when the globe is
    /// configured to collapse off-screen detail. Otherwise the
    /// desired level is clamped into the configured depth bounds
    /// before being compared against the chunk's own level, so a
    /// desired level past `max_split_depth` still splits toward the
    /// bound rather than being treated as unreachable.
    pub fn update(&mut self, frame: &FrameContext) -> Decision {
        let max_height = frame.config.max_height;
        self.visible = frame
            .frustum
            .is_visible(&self.patch, frame.ellipsoid, max_height, frame.render)
            && frame.horizon.is_visible(
                &self.patch,
                frame.ellipsoid,
                max_height,
                frame.render.camera_position,
            );

        if !self.visible && frame.config.merge_invisible {
            return Decision::WantMerge;
        }

        let desired = frame.desired_level(self).clamp(
            frame.config.min_split_depth as i32,
            frame.config.max_split_depth as i32,
        );

        match desired.cmp(&(self.index.level as i32)) {
            std::cmp::Ordering::Greater => Decision::WantSplit,
            std::cmp::Ordering::Less => Decision::WantMerge,
            std::cmp::Ordering::Equal => Decision::DoNothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodetic::Geodetic2;
    use glam::{DMat4, DVec3};

    fn frame_context<'a>(
        config: &'a GlobeConfig,
        ellipsoid: &'a Ellipsoid,
        evaluators: &'a [ChunkLevelEvaluator],
        cullers: &'a (FrustumCuller, HorizonCuller),
        render: &'a RenderContext,
    ) -> FrameContext<'a> {
        FrameContext {
            config,
            ellipsoid,
            evaluators,
            frustum: &cullers.0,
            horizon: &cullers.1,
            render,
        }
    }

    fn looking_down_at(ellipsoid: &Ellipsoid, target: Geodetic2, height: f64) -> RenderContext {
        let camera = ellipsoid.geodetic_to_cartesian(&target, height);
        let view = DMat4::look_at_rh(camera, DVec3::ZERO, DVec3::Z);
        let projection = DMat4::perspective_rh(60f64.to_radians(), 1.0, 0.1, 1.0e8);
        RenderContext::new(camera, projection * view)
    }

    fn test_config() -> GlobeConfig {
        GlobeConfig::default()
            .with_min_split_depth(2)
            .with_max_split_depth(6)
            .with_max_height(0.0)
    }

    #[test]
    fn depth_bound_clamps_before_the_split_comparison() {
        let config = test_config();
        let ellipsoid = Ellipsoid::sphere(1000.0);
        let evaluators = [ChunkLevelEvaluator::Distance { scale_factor: 1.0 }];
        let cullers = (FrustumCuller::new(), HorizonCuller::new());

        // distance 10 on this sphere wants raw level 7, past the
        // bound of 6
        let mut chunk = Chunk::new(ChunkIndex::new(16, 8, 5));
        let render = looking_down_at(&ellipsoid, chunk.patch().center(), 10.0);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);
        assert_eq!(chunk.update(&frame), Decision::WantSplit);

        // At level 6 the clamped desired level equals the chunk's
        // own, so the same camera asks for nothing
        let mut at_bound = Chunk::new(ChunkIndex::new(33, 17, 6));
        let render = looking_down_at(&ellipsoid, at_bound.patch().center(), 10.0);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);
        assert_eq!(at_bound.update(&frame), Decision::DoNothing);
    }

    #[test]
    fn distant_camera_wants_merge() {
        let config = test_config();
        let ellipsoid = Ellipsoid::sphere(1000.0);
        let evaluators = [ChunkLevelEvaluator::Distance { scale_factor: 1.0 }];
        let cullers = (FrustumCuller::new(), HorizonCuller::new());

        let mut chunk = Chunk::new(ChunkIndex::new(16, 8, 5));
        let render = looking_down_at(&ellipsoid, chunk.patch().center(), 1000.0);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);

        assert_eq!(chunk.update(&frame), Decision::WantMerge);
        assert!(chunk.is_visible());
    }

    #[test]
    fn invisible_chunk_merges_when_configured() {
        let config = test_config().with_merge_invisible(true);
        let ellipsoid = Ellipsoid::sphere(1000.0);
        let evaluators = [ChunkLevelEvaluator::Distance { scale_factor: 1.0 }];
        let cullers = (FrustumCuller::new(), HorizonCuller::new());

        // Camera over the antipode: the chunk is horizon-culled
        let mut chunk = Chunk::new(ChunkIndex::new(16, 8, 5));
        let render = looking_down_at(&ellipsoid, Geodetic2::new(0.0, -174.0), 500.0);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);

        assert_eq!(chunk.update(&frame), Decision::WantMerge);
        assert!(!chunk.is_visible());
    }

    #[test]
    fn extreme_distances_stay_within_depth_bounds() {
        let config = test_config();
        let ellipsoid = Ellipsoid::sphere(1000.0);
        let evaluators = [ChunkLevelEvaluator::Distance { scale_factor: 1.0 }];
        let cullers = (FrustumCuller::new(), HorizonCuller::new());

        // Camera on the surface: raw desired level explodes, but the
        // decision is still just a split request
        let mut chunk = Chunk::new(ChunkIndex::new(16, 8, 5));
        let render = looking_down_at(&ellipsoid, chunk.patch().center(), 1e-6);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);
        assert_eq!(chunk.update(&frame), Decision::WantSplit);

        // A chunk already at the bound stops splitting even at point
        // blank range
        let mut at_bound = Chunk::new(ChunkIndex::new(33, 17, 6));
        let render = looking_down_at(&ellipsoid, at_bound.patch().center(), 1e-6);
        let frame = frame_context(&config, &ellipsoid, &evaluators, &cullers, &render);
        assert_eq!(at_bound.update(&frame), Decision::DoNothing);
    }
}
