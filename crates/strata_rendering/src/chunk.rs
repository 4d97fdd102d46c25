//! # Chunk Addressing
//!
//! The world is cut into square chunks of `chunk_size` meters on the XZ
//! plane. A chunk is identified by its grid coordinate; a rendered chunk by
//! its coordinate plus the LOD ring it was requested in.

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not meters).
    pub x: i32,
    /// Z coordinate (in chunks, not meters).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the world position `(x, z)`.
    ///
    /// Returns `None` for a non-positive or non-finite `chunk_size`, or a
    /// non-finite position.
    #[inline]
    #[must_use]
    pub fn from_world(x: f32, z: f32, chunk_size: f32) -> Option<Self> {
        if !(chunk_size > 0.0 && chunk_size.is_finite() && x.is_finite() && z.is_finite()) {
            return None;
        }
        Some(Self {
            x: (x / chunk_size).floor() as i32,
            z: (z / chunk_size).floor() as i32,
        })
    }

    /// World position of the chunk's minimum corner.
    #[inline]
    #[must_use]
    pub fn world_origin(self, chunk_size: f32) -> (f32, f32) {
        (self.x as f32 * chunk_size, self.z as f32 * chunk_size)
    }

    /// Chebyshev (ring) distance between two chunks.
    #[inline]
    #[must_use]
    pub const fn ring_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        if dx > dz {
            dx
        } else {
            dz
        }
    }

    /// The chunk across `edge`. Saturates at the edge of the grid.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, edge: Edge) -> Self {
        let (dx, dz) = edge.offset();
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }
}

/// One side of a chunk. North faces -Z, east faces +X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// -Z side.
    North,
    /// +Z side.
    South,
    /// +X side.
    East,
    /// -X side.
    West,
}

impl Edge {
    /// All four edges, in seam-mask bit order.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Bit for this edge in a [`SeamMask`].
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::South => 0b0010,
            Self::East => 0b0100,
            Self::West => 0b1000,
        }
    }

    /// Grid step toward the neighbour across this edge.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }
}

/// 4-bit mask of chunk edges that border a different LOD ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SeamMask(u8);

impl SeamMask {
    /// No seams.
    pub const NONE: Self = Self(0);
    /// All four edges.
    pub const ALL: Self = Self(0b1111);

    /// Builds a mask from raw bits (upper nibble ignored).
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if `edge` is flagged.
    #[inline]
    #[must_use]
    pub const fn contains(self, edge: Edge) -> bool {
        self.0 & edge.bit() != 0
    }

    /// Flags `edge`.
    #[inline]
    pub fn insert(&mut self, edge: Edge) {
        self.0 |= edge.bit();
    }

    /// True when no edge is flagged.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flagged edges in bit order.
    pub fn edges(self) -> impl Iterator<Item = Edge> {
        Edge::ALL.into_iter().filter(move |edge| self.contains(*edge))
    }
}

/// A rendered chunk: grid coordinate plus LOD ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Grid coordinate.
    pub coord: ChunkCoord,
    /// LOD ring (0 = finest).
    pub lod: u8,
}

impl ChunkKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(coord: ChunkCoord, lod: u8) -> Self {
        Self { coord, lod }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_floors() {
        assert_eq!(ChunkCoord::from_world(10.0, 10.0, 256.0), Some(ChunkCoord::new(0, 0)));
        assert_eq!(ChunkCoord::from_world(300.0, 300.0, 256.0), Some(ChunkCoord::new(1, 1)));
        assert_eq!(ChunkCoord::from_world(-0.5, -256.0, 256.0), Some(ChunkCoord::new(-1, -1)));
        assert_eq!(ChunkCoord::from_world(-256.5, 0.0, 256.0), Some(ChunkCoord::new(-2, 0)));
    }

    #[test]
    fn test_from_world_rejects_bad_size() {
        assert_eq!(ChunkCoord::from_world(1.0, 1.0, 0.0), None);
        assert_eq!(ChunkCoord::from_world(1.0, 1.0, -8.0), None);
        assert_eq!(ChunkCoord::from_world(f32::NAN, 1.0, 8.0), None);
    }

    #[test]
    fn test_ring_distance() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.ring_distance(ChunkCoord::new(3, -1)), 3);
        assert_eq!(origin.ring_distance(ChunkCoord::new(-2, 5)), 5);
        assert_eq!(origin.ring_distance(origin), 0);
    }

    #[test]
    fn test_seam_mask_bits() {
        let mut mask = SeamMask::NONE;
        assert!(mask.is_empty());

        mask.insert(Edge::East);
        mask.insert(Edge::North);
        assert!(mask.contains(Edge::East));
        assert!(!mask.contains(Edge::West));
        assert_eq!(mask.bits(), 0b0101);
        assert_eq!(mask.edges().collect::<Vec<_>>(), vec![Edge::North, Edge::East]);
        assert_eq!(SeamMask::from_bits(0xFF), SeamMask::ALL);
    }

    #[test]
    fn test_neighbors() {
        let c = ChunkCoord::new(4, 4);
        assert_eq!(c.neighbor(Edge::North), ChunkCoord::new(4, 3));
        assert_eq!(c.neighbor(Edge::South), ChunkCoord::new(4, 5));
        assert_eq!(c.neighbor(Edge::East), ChunkCoord::new(5, 4));
        assert_eq!(c.neighbor(Edge::West), ChunkCoord::new(3, 4));

        let corner = ChunkCoord::new(i32::MAX, i32::MIN);
        assert_eq!(corner.neighbor(Edge::East), corner);
        assert_eq!(corner.neighbor(Edge::North), corner);
    }
}
