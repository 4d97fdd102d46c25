//! # Clipmap LOD
//!
//! Concentric square rings of equal-size chunks around the camera chunk.
//!
//! ```text
//!   ring 3  ┌─────────────────┐   d = Chebyshev distance (in chunks)
//!   ring 2  │ ┌─────────────┐ │   ring L holds inner(L) < d <= outer(L)
//!   ring 1  │ │ ┌─────────┐ │ │   ring 0 holds d <= outer(0)
//!   ring 0  │ │ │  ┌───┐  │ │ │
//!           │ │ │  │ C │  │ │ │   vertex stride doubles per ring, so each
//!           │ │ │  └───┘  │ │ │   ring covers more area with fewer vertices
//! ```

use crate::chunk::{ChunkCoord, ChunkKey};

/// Default outer radius (in chunks) of each ring.
pub const DEFAULT_RING_RADII: [u32; 4] = [1, 3, 6, 10];

/// Default vertex stride of each ring. Chunk resolution is
/// `base_resolution / stride`.
pub const DEFAULT_VERTEX_STRIDES: [u32; 4] = [1, 2, 4, 8];

/// Static description of one ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingSettings {
    /// LOD level (0 = finest).
    pub lod: u8,
    /// Exclusive inner Chebyshev radius; `None` for ring 0.
    pub inner_radius: Option<u32>,
    /// Inclusive outer Chebyshev radius.
    pub outer_radius: u32,
    /// Vertex stride relative to the base resolution.
    pub vertex_stride: u32,
}

impl RingSettings {
    /// True if a chunk at ring distance `distance` belongs to this ring.
    #[inline]
    #[must_use]
    pub fn contains(&self, distance: u32) -> bool {
        distance <= self.outer_radius && self.inner_radius.map_or(true, |inner| distance > inner)
    }

    /// Chunk resolution in this ring for a base resolution (at least 1
    /// unless the base itself is 0).
    #[inline]
    #[must_use]
    pub fn chunk_resolution(&self, base_resolution: u32) -> u32 {
        if base_resolution == 0 {
            0
        } else {
            (base_resolution / self.vertex_stride.max(1)).max(1)
        }
    }
}

/// Chunks requested in one ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LodRing {
    /// LOD level.
    pub lod: u8,
    /// Chunks in this ring, row-major around the camera.
    pub chunks: Vec<ChunkCoord>,
    /// Ring parameters.
    pub settings: RingSettings,
}

/// Visible chunk set for one camera chunk, grouped by LOD.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RingMap {
    center: Option<ChunkCoord>,
    rings: Vec<LodRing>,
}

impl RingMap {
    /// The ring at `lod`, if any.
    #[must_use]
    pub fn ring(&self, lod: u8) -> Option<&LodRing> {
        self.rings.iter().find(|ring| ring.lod == lod)
    }

    /// All rings, finest first.
    #[must_use]
    pub fn rings(&self) -> &[LodRing] {
        &self.rings
    }

    /// Camera chunk this map was built around.
    #[must_use]
    pub const fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Total chunks over all rings.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.rings.iter().map(|ring| ring.chunks.len()).sum()
    }

    /// True when no chunk is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_chunks() == 0
    }

    /// LOD a chunk is requested at, if it is requested at all.
    #[must_use]
    pub fn lod_of(&self, coord: ChunkCoord) -> Option<u8> {
        match self.center {
            Some(center) => {
                let distance = center.ring_distance(coord);
                self.rings
                    .iter()
                    .find(|ring| ring.settings.contains(distance))
                    .map(|ring| ring.lod)
            }
            None => self
                .rings
                .iter()
                .find(|ring| ring.chunks.contains(&coord))
                .map(|ring| ring.lod),
        }
    }

    /// Every requested `(coord, lod)` pair, finest ring first.
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.rings
            .iter()
            .flat_map(|ring| ring.chunks.iter().map(move |coord| ChunkKey::new(*coord, ring.lod)))
    }

    /// Builds a map from explicit per-ring chunk lists.
    ///
    /// For callers that stream a custom set (editors, tests); `lod_of`
    /// then answers from the lists instead of ring distances.
    #[must_use]
    pub fn from_rings(rings: Vec<LodRing>) -> Self {
        Self { center: None, rings }
    }
}

/// Ring layout and the pure LOD queries over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainLodManager {
    rings: Vec<RingSettings>,
}

impl TerrainLodManager {
    /// Builds rings from outer radii and vertex strides.
    ///
    /// Pairs beyond the shorter list are ignored. A radius that does not
    /// grow past the previous ring ends the table, as does a zero stride.
    #[must_use]
    pub fn with_rings(radii: &[u32], strides: &[u32]) -> Self {
        let mut rings = Vec::with_capacity(radii.len().min(strides.len()));
        let mut inner: Option<u32> = None;
        for (lod, (&outer, &stride)) in radii.iter().zip(strides).enumerate() {
            let Ok(lod) = u8::try_from(lod) else {
                break;
            };
            if stride == 0 || inner.is_some_and(|inner| outer <= inner) {
                break;
            }
            rings.push(RingSettings {
                lod,
                inner_radius: inner,
                outer_radius: outer,
                vertex_stride: stride,
            });
            inner = Some(outer);
        }
        Self { rings }
    }

    /// Ring parameters, finest first.
    #[must_use]
    pub fn ring_settings(&self) -> &[RingSettings] {
        &self.rings
    }

    /// Number of rings.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Radius of the outermost ring.
    #[must_use]
    pub fn view_radius(&self) -> u32 {
        self.rings.last().map_or(0, |ring| ring.outer_radius)
    }

    /// Chunk under a camera position; `None` for an invalid chunk size.
    #[inline]
    #[must_use]
    pub fn camera_chunk(camera: [f32; 3], chunk_size: f32) -> Option<ChunkCoord> {
        ChunkCoord::from_world(camera[0], camera[2], chunk_size)
    }

    /// Chunks to draw around `camera`, grouped by ring.
    ///
    /// Non-positive `chunk_size` yields an empty map.
    #[must_use]
    pub fn compute_visible_chunks(&self, camera: [f32; 3], chunk_size: f32) -> RingMap {
        match Self::camera_chunk(camera, chunk_size) {
            Some(center) => self.rings_around(center),
            None => RingMap::default(),
        }
    }

    /// Ring map centered on a chunk.
    ///
    /// The center is pulled inward so the outermost ring stays inside the
    /// `i32` chunk grid.
    #[must_use]
    pub fn rings_around(&self, center: ChunkCoord) -> RingMap {
        let limit = i32::MAX - Self::reach(self.view_radius());
        let center = ChunkCoord::new(center.x.clamp(-limit, limit), center.z.clamp(-limit, limit));
        let rings = self
            .rings
            .iter()
            .map(|settings| {
                let reach = Self::reach(settings.outer_radius);
                let mut chunks = Vec::new();
                for dz in -reach..=reach {
                    for dx in -reach..=reach {
                        let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                        if settings.contains(center.ring_distance(coord)) {
                            chunks.push(coord);
                        }
                    }
                }
                LodRing {
                    lod: settings.lod,
                    chunks,
                    settings: *settings,
                }
            })
            .collect();
        RingMap {
            center: Some(center),
            rings,
        }
    }

    /// Ring radius as a signed grid offset.
    #[inline]
    fn reach(radius: u32) -> i32 {
        i32::try_from(radius).unwrap_or(i32::MAX)
    }

    /// True only when the camera moved into a different chunk.
    #[must_use]
    pub fn should_rebuild_clipmap(old: [f32; 3], new: [f32; 3], chunk_size: f32) -> bool {
        match (Self::camera_chunk(old, chunk_size), Self::camera_chunk(new, chunk_size)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

impl Default for TerrainLodManager {
    fn default() -> Self {
        Self::with_rings(&DEFAULT_RING_RADII, &DEFAULT_VERTEX_STRIDES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ring_sizes() {
        let map = TerrainLodManager::default().compute_visible_chunks([0.0; 3], 128.0);
        let counts: Vec<usize> = map.rings().iter().map(|ring| ring.chunks.len()).collect();
        // 3x3, 7x7 - 3x3, 13x13 - 7x7, 21x21 - 13x13
        assert_eq!(counts, vec![9, 40, 120, 272]);
        assert_eq!(map.total_chunks(), 21 * 21);
    }

    #[test]
    fn test_rings_are_disjoint() {
        let map = TerrainLodManager::default().compute_visible_chunks([500.0, 0.0, -900.0], 64.0);
        let mut all: Vec<ChunkCoord> = map.keys().map(|key| key.coord).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_lod_of() {
        let map = TerrainLodManager::default().compute_visible_chunks([0.0; 3], 10.0);
        assert_eq!(map.lod_of(ChunkCoord::new(0, 0)), Some(0));
        assert_eq!(map.lod_of(ChunkCoord::new(1, -1)), Some(0));
        assert_eq!(map.lod_of(ChunkCoord::new(2, 0)), Some(1));
        assert_eq!(map.lod_of(ChunkCoord::new(-10, 4)), Some(3));
        assert_eq!(map.lod_of(ChunkCoord::new(11, 0)), None);
    }

    #[test]
    fn test_stride_lowers_resolution() {
        let lod = TerrainLodManager::default();
        let resolutions: Vec<u32> = lod.ring_settings().iter().map(|s| s.chunk_resolution(32)).collect();
        assert_eq!(resolutions, vec![32, 16, 8, 4]);
        assert_eq!(lod.ring_settings()[3].chunk_resolution(4), 1);
        assert_eq!(lod.ring_settings()[0].chunk_resolution(0), 0);
    }

    #[test]
    fn test_should_rebuild() {
        assert!(!TerrainLodManager::should_rebuild_clipmap([10.0, 0.0, 10.0], [100.0, 0.0, 100.0], 256.0));
        assert!(TerrainLodManager::should_rebuild_clipmap([10.0, 0.0, 10.0], [300.0, 0.0, 300.0], 256.0));
        // Height never matters
        assert!(!TerrainLodManager::should_rebuild_clipmap([1.0, 0.0, 1.0], [1.0, 900.0, 1.0], 256.0));
        assert!(!TerrainLodManager::should_rebuild_clipmap([0.0; 3], [1000.0; 3], 0.0));
    }

    #[test]
    fn test_invalid_tables_are_truncated() {
        let lod = TerrainLodManager::with_rings(&[2, 2, 5], &[1, 2, 4]);
        assert_eq!(lod.ring_count(), 1);

        let lod = TerrainLodManager::with_rings(&[1, 3, 6], &[1, 0, 4]);
        assert_eq!(lod.ring_count(), 1);

        let lod = TerrainLodManager::with_rings(&[1, 3, 6], &[1, 2]);
        assert_eq!(lod.ring_count(), 2);
        assert_eq!(lod.view_radius(), 3);
    }

    #[test]
    fn test_far_camera_stays_on_grid() {
        let lod = TerrainLodManager::default();
        for camera in [[3.0e9, 0.0, 0.0], [-3.0e9, 0.0, 3.0e9], [f32::MAX, 0.0, f32::MIN]] {
            let map = lod.compute_visible_chunks(camera, 1.0);
            assert_eq!(map.total_chunks(), 21 * 21);

            let center = map.center().unwrap();
            assert!(map.keys().all(|key| key.coord.ring_distance(center) <= lod.view_radius()));
            assert_eq!(map.lod_of(center), Some(0));
        }

        let map = lod.compute_visible_chunks([3.0e9, 0.0, 0.0], 1.0);
        let center = map.center().unwrap();
        assert_eq!(center.x, i32::MAX - 10);
        assert!(map.keys().all(|key| key.coord.x > 0), "No chunk wraps to the far side");
    }

    #[test]
    fn test_bad_chunk_size_is_empty() {
        let lod = TerrainLodManager::default();
        assert!(lod.compute_visible_chunks([0.0; 3], 0.0).is_empty());
        assert!(lod.compute_visible_chunks([0.0; 3], -1.0).is_empty());
    }
}
