//! Level-of-detail globe traversal.
//!
//! A quadtree of [`Chunk`]s over two hemisphere roots. Each frame the
//! tree is re-shaped from the camera state in the [`RenderContext`]:
//! cullers mark off-screen chunks, evaluators pick a desired depth,
//! and [`ChunkedLodGlobe`] resolves the resulting split/merge
//! decisions before emitting draw calls backed by tiles from a
//! [`TileProvider`].
//!
//! [`TileProvider`]: crate::provider::TileProvider

mod chunk;
mod chunk_node;
mod context;
mod culling;
mod evaluator;
mod globe;

pub use chunk::{Chunk, Decision, FrameContext};
pub use chunk_node::ChunkNode;
pub use context::RenderContext;
pub use culling::{FrustumCuller, HorizonCuller};
pub use evaluator::ChunkLevelEvaluator;
pub use globe::{ChunkDraw, ChunkedLodGlobe, RenderStats};
