//! # Terrain Runtime Manager
//!
//! Owns every chunk instance. Each sync diffs the requested ring map
//! against the active set:
//!
//! ```text
//!   active − requested  → hide, return to pool
//!   requested − active  → pool.acquire() or backend.create(), queue build
//!   seam mask changed   → queue rebuild
//!   queue               → build up to max_rebuilds_per_sync, rest next call
//! ```
//!
//! ## Invariants
//!
//! - After a sync, the active set equals the requested `(coord, lod)` set.
//! - An instance is either active or pooled, never both, never leaked.
//! - The pool never holds more instances than the historical peak in use.

use std::collections::{HashMap, HashSet, VecDeque};

use strata_core::ResourcePool;
use strata_procedural::Heightfield;
use tracing::{debug, warn};

use crate::backend::RenderBackend;
use crate::chunk::{ChunkCoord, ChunkKey, Edge, SeamMask};
use crate::lod::RingMap;
use crate::mesh::{MeshData, TerrainMeshBridge};
use crate::stats::RuntimeStats;

/// Geometry parameters shared by every chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeSettings {
    /// Chunk edge length in meters.
    pub chunk_size: f32,
    /// World meters between heightfield samples.
    pub meters_per_vertex: f32,
    /// Chunk builds per sync; 0 builds everything at once.
    pub max_rebuilds_per_sync: usize,
    /// Skirt depth in meters on seam edges; 0 disables skirts.
    pub skirt_depth: f32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            chunk_size: 128.0,
            meters_per_vertex: 1.0,
            max_rebuilds_per_sync: 16,
            skirt_depth: 2.0,
        }
    }
}

/// One pooled render chunk.
///
/// `resolution` and `seam_mask` describe the uploaded mesh; the `target_*`
/// pair is what the next build will produce.
struct ChunkInstance<H> {
    handle: H,
    mesh: MeshData,
    resolution: u32,
    seam_mask: SeamMask,
    target_resolution: u32,
    target_seam_mask: SeamMask,
    built: bool,
    queued: bool,
}

impl<H> ChunkInstance<H> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            mesh: MeshData::default(),
            resolution: 0,
            seam_mask: SeamMask::NONE,
            target_resolution: 0,
            target_seam_mask: SeamMask::NONE,
            built: false,
            queued: false,
        }
    }

    /// Drops per-chunk state, keeping the handle and mesh allocations.
    fn reset(&mut self) {
        self.mesh.clear();
        self.resolution = 0;
        self.seam_mask = SeamMask::NONE;
        self.target_resolution = 0;
        self.target_seam_mask = SeamMask::NONE;
        self.built = false;
        self.queued = false;
    }

    fn is_current(&self) -> bool {
        self.built && self.resolution == self.target_resolution && self.seam_mask == self.target_seam_mask
    }
}

/// Read-only view of an active chunk, describing the uploaded mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Quads per chunk edge.
    pub resolution: u32,
    /// Edges bordering a different LOD.
    pub seam_mask: SeamMask,
    /// True once a mesh has been uploaded.
    pub built: bool,
    /// True while a rebuild is queued; the uploaded mesh is then stale.
    pub pending: bool,
    /// Vertices in the uploaded mesh (skirts included).
    pub vertex_count: usize,
    /// Indices in the uploaded mesh (skirts included).
    pub index_count: usize,
}

/// What one sync did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Distinct `(coord, lod)` pairs in the requested set.
    pub requested: usize,
    /// Chunks returned to the pool.
    pub released: usize,
    /// Newly active chunks served from the pool.
    pub reused: usize,
    /// Newly active chunks that needed a new backend resource.
    pub allocated: usize,
    /// Meshes built this call.
    pub built: usize,
    /// Builds left for later calls.
    pub pending: usize,
}

/// Pooled chunk runtime over a render backend.
pub struct TerrainRuntime3DManager<B: RenderBackend> {
    backend: B,
    settings: RuntimeSettings,
    pool: ResourcePool<ChunkInstance<B::Handle>>,
    active: HashMap<ChunkKey, ChunkInstance<B::Handle>>,
    pending: VecDeque<ChunkKey>,
    total_builds: u64,
}

impl<B: RenderBackend> TerrainRuntime3DManager<B> {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new(backend: B, settings: RuntimeSettings) -> Self {
        Self {
            backend,
            settings,
            pool: ResourcePool::new(),
            active: HashMap::new(),
            pending: VecDeque::new(),
            total_builds: 0,
        }
    }

    /// Brings the active set in line with `rings` and builds queued meshes
    /// within the per-sync budget.
    pub fn sync_clipmap(&mut self, heightfield: &Heightfield, rings: &RingMap, resolution: u32) -> SyncReport {
        let mut report = SyncReport::default();

        let requested: HashSet<ChunkKey> = rings.keys().collect();
        report.requested = requested.len();

        // Finest ring wins when a custom map lists a coord twice
        let mut lods: HashMap<ChunkCoord, u8> = HashMap::with_capacity(requested.len());
        for key in rings.keys() {
            lods.entry(key.coord).or_insert(key.lod);
        }

        // Release what is no longer wanted
        let stale: Vec<ChunkKey> = self
            .active
            .keys()
            .filter(|key| !requested.contains(key))
            .copied()
            .collect();
        for key in stale {
            if self.release_chunk(key) {
                report.released += 1;
            }
        }

        // Claim what is new, refresh seams and resolution on the rest
        for ring in rings.rings() {
            let chunk_resolution = ring.settings.chunk_resolution(resolution);
            for &coord in &ring.chunks {
                let key = ChunkKey::new(coord, ring.lod);
                let seam_mask = seam_mask_for(coord, ring.lod, &lods);

                if !self.active.contains_key(&key) {
                    let backend = &mut self.backend;
                    let (instance, reused) = self.pool.acquire_or_else(|| ChunkInstance::new(backend.create()));
                    if reused {
                        report.reused += 1;
                    } else {
                        report.allocated += 1;
                    }
                    self.active.insert(key, instance);
                }
                let Some(instance) = self.active.get_mut(&key) else {
                    continue;
                };

                instance.target_resolution = chunk_resolution;
                instance.target_seam_mask = seam_mask;
                if !instance.is_current() && !instance.queued {
                    instance.queued = true;
                    self.pending.push_back(key);
                }
            }
        }

        let budget = match self.settings.max_rebuilds_per_sync {
            0 => usize::MAX,
            n => n,
        };
        report.built = self.build_pending(heightfield, budget);
        report.pending = self.pending_count();

        if report.released + report.reused + report.allocated > 0 {
            debug!(
                requested = report.requested,
                released = report.released,
                reused = report.reused,
                allocated = report.allocated,
                built = report.built,
                "Clipmap synced"
            );
        }
        if report.pending > 0 {
            warn!(
                pending = report.pending,
                budget = self.settings.max_rebuilds_per_sync,
                "Rebuild budget exhausted, deferring chunk builds"
            );
        }
        report
    }

    /// Builds every queued chunk regardless of the budget.
    pub fn flush_pending(&mut self, heightfield: &Heightfield) -> usize {
        self.build_pending(heightfield, usize::MAX)
    }

    /// Queues every active chunk for a rebuild (terrain edit, new heightmap).
    pub fn invalidate_all(&mut self) {
        for (key, instance) in &mut self.active {
            if !instance.queued {
                instance.queued = true;
                self.pending.push_back(*key);
            }
        }
    }

    /// Hides a chunk and returns it to the pool.
    ///
    /// Returns false (and does nothing) if the chunk is not active.
    pub fn release_chunk(&mut self, key: ChunkKey) -> bool {
        let Some(mut instance) = self.active.remove(&key) else {
            return false;
        };
        self.backend.release(&instance.handle);
        instance.reset();
        self.pool.release(instance);
        true
    }

    /// Releases every active chunk.
    pub fn release_all(&mut self) -> usize {
        let keys: Vec<ChunkKey> = self.active.keys().copied().collect();
        keys.into_iter().filter(|key| self.release_chunk(*key)).count()
    }

    fn build_pending(&mut self, heightfield: &Heightfield, budget: usize) -> usize {
        let mut built = 0;
        while built < budget {
            let Some(key) = self.pending.pop_front() else {
                break;
            };
            // Entries for chunks released since queueing are dropped here
            let Some(instance) = self.active.get_mut(&key) else {
                continue;
            };
            if !instance.queued {
                continue;
            }

            TerrainMeshBridge::fill_chunk_mesh(
                &mut instance.mesh,
                heightfield,
                key.coord,
                instance.target_resolution,
                self.settings.meters_per_vertex,
                self.settings.chunk_size,
            );
            if self.settings.skirt_depth > 0.0 {
                TerrainMeshBridge::append_skirts(
                    &mut instance.mesh,
                    instance.target_resolution,
                    instance.target_seam_mask,
                    self.settings.skirt_depth,
                );
            }
            self.backend.update(&instance.handle, &instance.mesh);
            instance.resolution = instance.target_resolution;
            instance.seam_mask = instance.target_seam_mask;
            instance.built = true;
            instance.queued = false;
            built += 1;
        }
        self.total_builds += built as u64;
        built
    }

    /// Chunks currently active.
    #[must_use]
    pub fn active_chunk_count(&self) -> usize {
        self.active.len()
    }

    /// Released instances waiting for reuse.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.free_count()
    }

    /// Active chunks waiting for a build.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.active.values().filter(|instance| instance.queued).count()
    }

    /// Metadata of an active chunk.
    #[must_use]
    pub fn chunk_metadata(&self, coord: ChunkCoord, lod: u8) -> Option<ChunkMetadata> {
        self.active.get(&ChunkKey::new(coord, lod)).map(|instance| ChunkMetadata {
            resolution: instance.resolution,
            seam_mask: instance.seam_mask,
            built: instance.built,
            pending: instance.queued,
            vertex_count: instance.mesh.vertex_count(),
            index_count: instance.mesh.index_count(),
        })
    }

    /// Keys of all active chunks, in no particular order.
    pub fn active_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.active.keys().copied()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        let (vertices, indices) = self
            .active
            .values()
            .filter(|instance| instance.built)
            .fold((0, 0), |(v, i), instance| {
                (v + instance.mesh.vertex_count(), i + instance.mesh.index_count())
            });
        RuntimeStats {
            active_chunks: self.active.len(),
            pooled_chunks: self.pool.free_count(),
            pending_builds: self.pending_count(),
            peak_active: self.pool.peak_in_use(),
            total_allocations: self.pool.allocated_count(),
            total_builds: self.total_builds,
            vertices,
            indices,
        }
    }

    /// Geometry parameters.
    #[must_use]
    pub const fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Replaces the geometry parameters and queues every chunk for a rebuild.
    pub fn set_settings(&mut self, settings: RuntimeSettings) {
        self.settings = settings;
        self.invalidate_all();
    }

    /// The render backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

/// Edges whose neighbour is requested at a different LOD.
fn seam_mask_for(coord: ChunkCoord, lod: u8, lods: &HashMap<ChunkCoord, u8>) -> SeamMask {
    let mut mask = SeamMask::NONE;
    for edge in Edge::ALL {
        if lods.get(&coord.neighbor(edge)).is_some_and(|other| *other != lod) {
            mask.insert(edge);
        }
    }
    mask
}
