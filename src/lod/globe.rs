//! The chunked LOD globe: traversal, culling, and draw emission.

use super::chunk::FrameContext;
use super::chunk_node::ChunkNode;
use super::context::RenderContext;
use super::culling::{FrustumCuller, HorizonCuller};
use super::evaluator::ChunkLevelEvaluator;
use crate::config::GlobeConfig;
use crate::geodetic::{ChunkIndex, Ellipsoid, LEFT_HEMISPHERE, RIGHT_HEMISPHERE};
use crate::provider::{Tile, TileProvider};

/// One chunk the renderer should draw this frame.
#[derive(Debug, Clone)]
pub struct ChunkDraw {
    /// The chunk being drawn.
    pub chunk_index: ChunkIndex,
    /// The index the tile data belongs to. Equal to `chunk_index`
    /// when the chunk's own tile is ready, otherwise the nearest
    /// ancestor with a cached tile; the renderer derives texture
    /// coordinates from the index difference.
    pub tile_index: ChunkIndex,
    /// The tile to sample. Not renderable only when no ancestor has
    /// data yet.
    pub tile: Tile,
}

/// Counters for one traversal frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    pub nodes_visited: u32,
    pub chunks_culled: u32,
    pub chunks_rendered: u32,
    /// Nodes that materialized children this frame.
    pub splits: u32,
    /// Nodes that dropped their subtree this frame.
    pub merges: u32,
    /// Draws served from an ancestor tile instead of the chunk's own.
    pub fallback_tiles: u32,
}

/// The quadtree LOD engine over both hemispheres.
///
/// Owns the two root subtrees and resolves every chunk's split/merge
/// decision before emitting the frame's draw list, so a chunk is
/// never drawn and restructured in the same frame. Render-thread
/// only.
pub struct ChunkedLodGlobe {
    config: GlobeConfig,
    ellipsoid: Ellipsoid,
    evaluators: Vec<ChunkLevelEvaluator>,
    frustum: FrustumCuller,
    horizon: HorizonCuller,
    left: ChunkNode,
    right: ChunkNode,
    stats: RenderStats,
}

impl ChunkedLodGlobe {
    /// Create a globe with the given level heuristics.
    pub fn new(config: GlobeConfig, ellipsoid: Ellipsoid, evaluators: Vec<ChunkLevelEvaluator>) -> Self {
        Self {
            config,
            ellipsoid,
            evaluators,
            frustum: FrustumCuller::new(),
            horizon: HorizonCuller::new(),
            left: ChunkNode::new(LEFT_HEMISPHERE),
            right: ChunkNode::new(RIGHT_HEMISPHERE),
            stats: RenderStats::default(),
        }
    }

    /// Replace the frustum culler, e.g. to add a margin.
    pub fn with_frustum_culler(mut self, culler: FrustumCuller) -> Self {
        self.frustum = culler;
        self
    }

    /// Update the tree for this frame and emit the draw list.
    ///
    /// Ticks the provider, resolves split/merge across both
    /// hemispheres, then walks the visible leaves. Each leaf draws
    /// its own tile when cached; otherwise the nearest cached
    /// ancestor stands in, which also warms the ancestor chain in the
    /// provider. With `render_small_chunks_first` the list is ordered
    /// deepest level first, a cheap front-to-back approximation that
    /// helps the GPU reject occluded fragments early.
    pub fn render(
        &mut self,
        context: &RenderContext,
        provider: &mut dyn TileProvider,
    ) -> Vec<ChunkDraw> {
        provider.update();
        let mut stats = RenderStats::default();

        let mut evaluators = self.evaluators.clone();
        if self.config.limit_level_by_available_data {
            if let Some(maximum_level) = provider.maximum_level() {
                evaluators.push(ChunkLevelEvaluator::AvailableTileData { maximum_level });
            }
        }

        let frame = FrameContext {
            config: &self.config,
            ellipsoid: &self.ellipsoid,
            evaluators: &evaluators,
            frustum: &self.frustum,
            horizon: &self.horizon,
            render: context,
        };

        self.left.update(&frame, &mut stats);
        self.right.update(&frame, &mut stats);

        let mut leaves = Vec::new();
        self.left.collect_visible_leaves(&mut leaves);
        self.right.collect_visible_leaves(&mut leaves);

        if self.config.render_small_chunks_first {
            leaves.sort_by(|a, b| b.level.cmp(&a.level));
        }

        let mut draws = Vec::with_capacity(leaves.len());
        for chunk_index in leaves {
            let (tile_index, tile) = Self::best_available_tile(provider, chunk_index);
            if tile_index != chunk_index && tile.is_renderable() {
                stats.fallback_tiles += 1;
            }
            stats.chunks_rendered += 1;
            draws.push(ChunkDraw {
                chunk_index,
                tile_index,
                tile,
            });
        }

        tracing::trace!(
            visited = stats.nodes_visited,
            culled = stats.chunks_culled,
            rendered = stats.chunks_rendered,
            fallbacks = stats.fallback_tiles,
            "globe traversal"
        );
        self.stats = stats;
        draws
    }

    /// Counters from the most recent [`render`](Self::render).
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Resident nodes across both hemisphere trees.
    pub fn node_count(&self) -> usize {
        self.left.node_count() + self.right.node_count()
    }

    /// The chunk's own tile, or the deepest cached ancestor's.
    ///
    /// Requests every index along the walk, so missing levels are
    /// fetched in the background and the fallback sharpens over the
    /// following frames.
    fn best_available_tile(
        provider: &mut dyn TileProvider,
        chunk_index: ChunkIndex,
    ) -> (ChunkIndex, Tile) {
        let mut tile_index = chunk_index;
        let mut tile = provider.tile(tile_index);
        while !tile.is_renderable() {
            match tile_index.parent() {
                Some(parent) => {
                    tile_index = parent;
                    tile = provider.tile(parent);
                }
                None => break,
            }
        }
        (tile_index, tile)
    }
}
