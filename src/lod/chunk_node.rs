//! Quadtree nodes with owned children.

use super::chunk::{Chunk, Decision, FrameContext};
use super::globe::RenderStats;
use crate::geodetic::ChunkIndex;

/// A quadtree node owning its four children outright.
///
/// Children exist only while the chunk wants to stay split; merging
/// drops the box and with it the whole subtree.
pub struct ChunkNode {
    chunk: Chunk,
    children: Option<Box<[ChunkNode; 4]>>,
}

impl ChunkNode {
    pub fn new(index: ChunkIndex) -> Self {
        Self {
            chunk: Chunk::new(index),
            children: None,
        }
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<&[ChunkNode; 4]> {
        self.children.as_deref()
    }

    /// Nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(Self::node_count).sum())
    }

    /// Resolve this frame's split/merge decision for the whole
    /// subtree, top-down.
    ///
    /// A split request materializes the children before recursing so
    /// the new chunks get their own decision the same frame; anything
    /// else collapses the subtree, since children deeper than the
    /// desired level are stale by definition.
    pub fn update(&mut self, frame: &FrameContext, stats: &mut RenderStats) {
        stats.nodes_visited += 1;
        let decision = self.chunk.update(frame);
        if !self.chunk.is_visible() {
            stats.chunks_culled += 1;
        }

        match decision {
            Decision::WantSplit => {
                if self.children.is_none() {
                    stats.splits += 1;
                    self.children = Some(Box::new(self.chunk.index().children().map(Self::new)));
                }
                if let Some(children) = &mut self.children {
                    for child in children.iter_mut() {
                        child.update(frame, stats);
                    }
                }
            }
            Decision::WantMerge | Decision::DoNothing => {
                if self.children.is_some() {
                    stats.merges += 1;
                    self.children = None;
                }
            }
        }
    }

    /// Append the indices of visible leaves in this subtree.
    pub fn collect_visible_leaves(&self, leaves: &mut Vec<ChunkIndex>) {
        match &self.children {
            Some(children) => {
                for child in children.iter() {
                    child.collect_visible_leaves(leaves);
                }
            }
            None => {
                if self.chunk.is_visible() {
                    leaves.push(self.chunk.index());
                }
            }
        }
    }
}
