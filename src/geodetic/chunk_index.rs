//! Quadtree chunk indexing.
//!
//! A [`ChunkIndex`] identifies one quadtree node on the globe. The
//! tree has two roots at level 1, one per hemisphere; each node splits
//! into four children one level deeper. Children of `(x, y, level)`
//! are `(2x+dx, 2y+dy, level+1)` for `dx, dy` in `{0, 1}`.

use std::fmt;

/// The level of the two hemisphere root chunks.
pub const ROOT_LEVEL: u8 = 1;

/// Root chunk covering the western hemisphere (lon -180..0).
pub const LEFT_HEMISPHERE: ChunkIndex = ChunkIndex {
    x: 0,
    y: 0,
    level: ROOT_LEVEL,
};

/// Root chunk covering the eastern hemisphere (lon 0..180).
pub const RIGHT_HEMISPHERE: ChunkIndex = ChunkIndex {
    x: 1,
    y: 0,
    level: ROOT_LEVEL,
};

/// One of the four child quadrants of a chunk.
///
/// The discriminant encodes the child offset: bit 0 is `dx`, bit 1 is
/// `dy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All four quadrants in child-array order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Child x offset (0 or 1).
    #[inline]
    pub fn dx(self) -> u32 {
        self as u32 & 1
    }

    /// Child y offset (0 or 1).
    #[inline]
    pub fn dy(self) -> u32 {
        self as u32 >> 1
    }
}

/// Identifies one quadtree node: column, row, and depth.
///
/// Level increases monotonically downward; the roots sit at
/// [`ROOT_LEVEL`]. At level `L` there are `2^L` columns and `2^(L-1)`
/// rows covering the full globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkIndex {
    /// Column, increasing eastward from lon -180.
    pub x: u32,
    /// Row, increasing southward from lat 90.
    pub y: u32,
    /// Quadtree depth.
    pub level: u8,
}

impl ChunkIndex {
    /// Create a new chunk index.
    pub fn new(x: u32, y: u32, level: u8) -> Self {
        Self { x, y, level }
    }

    /// The child index in the given quadrant, one level deeper.
    pub fn child(&self, quadrant: Quadrant) -> ChunkIndex {
        ChunkIndex {
            x: 2 * self.x + quadrant.dx(),
            y: 2 * self.y + quadrant.dy(),
            level: self.level + 1,
        }
    }

    /// All four children in [`Quadrant::ALL`] order.
    pub fn children(&self) -> [ChunkIndex; 4] {
        Quadrant::ALL.map(|q| self.child(q))
    }

    /// The parent index, or `None` for a hemisphere root.
    pub fn parent(&self) -> Option<ChunkIndex> {
        if self.level <= ROOT_LEVEL {
            return None;
        }
        Some(ChunkIndex {
            x: self.x / 2,
            y: self.y / 2,
            level: self.level - 1,
        })
    }

    /// Whether this is one of the two hemisphere roots.
    pub fn is_root(&self) -> bool {
        self.level == ROOT_LEVEL
    }
}

impl fmt::Display for ChunkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk:{}:{}:{}", self.level, self.x, self.y)
    }
}
