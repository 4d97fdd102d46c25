//! # Clipmap Streamer
//!
//! Remembers the last camera chunk and only asks the LOD manager for a new
//! ring map when the camera crosses a chunk boundary. Sub-chunk motion
//! returns the cached map.

use tracing::debug;

use crate::chunk::ChunkCoord;
use crate::lod::{RingMap, TerrainLodManager};

/// Result of one camera update.
#[derive(Debug)]
pub struct StreamUpdate<'a> {
    /// True if the visible set was recomputed by this call.
    pub rebuilt: bool,
    /// Current visible set (fresh or cached).
    pub visible_chunks: &'a RingMap,
}

/// Stateful wrapper around [`TerrainLodManager`].
///
/// Only the latest camera position matters; there is no queued history.
pub struct TerrainClipmapStreamer {
    lod: TerrainLodManager,
    chunk_size: f32,
    last_chunk: Option<ChunkCoord>,
    visible: RingMap,
    dirty: bool,
}

impl TerrainClipmapStreamer {
    /// Creates a streamer. The first `update_camera` always rebuilds.
    #[must_use]
    pub fn new(lod: TerrainLodManager, chunk_size: f32) -> Self {
        Self {
            lod,
            chunk_size,
            last_chunk: None,
            visible: RingMap::default(),
            dirty: true,
        }
    }

    /// Feeds the latest camera position.
    ///
    /// An invalid chunk size never rebuilds and leaves the map empty.
    pub fn update_camera(&mut self, camera: [f32; 3]) -> StreamUpdate<'_> {
        let current = TerrainLodManager::camera_chunk(camera, self.chunk_size);
        let rebuilt = match current {
            Some(chunk) if self.dirty || self.last_chunk != Some(chunk) => {
                self.visible = self.lod.rings_around(chunk);
                debug!(
                    x = chunk.x,
                    z = chunk.z,
                    chunks = self.visible.total_chunks(),
                    "Clipmap rebuilt"
                );
                self.last_chunk = Some(chunk);
                self.dirty = false;
                true
            }
            _ => false,
        };

        StreamUpdate {
            rebuilt,
            visible_chunks: &self.visible,
        }
    }

    /// Forces the next `update_camera` to rebuild (terrain edit, new heightmap).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Last computed visible set.
    #[must_use]
    pub const fn visible_chunks(&self) -> &RingMap {
        &self.visible
    }

    /// Camera chunk of the last rebuild.
    #[must_use]
    pub const fn last_camera_chunk(&self) -> Option<ChunkCoord> {
        self.last_chunk
    }

    /// Chunk edge length in meters.
    #[must_use]
    pub const fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Ring layout in use.
    #[must_use]
    pub const fn lod_manager(&self) -> &TerrainLodManager {
        &self.lod
    }
}
