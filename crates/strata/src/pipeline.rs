//! # Terrain Pipeline
//!
//! World init and the per-frame loop for the 3D terrain path.
//!
//! ```text
//! world init:  generate → erode → HeightmapReady ─┐
//!                                                 ↓ (bound source)
//! each frame:  poll_events → camera → streamer → runtime sync → detail cull
//! ```
//!
//! The pipeline owns the runtime manager, the streamer and the detail
//! renderer. It shares nothing through globals: the heightmap source is
//! handed in explicitly with [`TerrainPipeline::bind_source`].

use std::sync::Arc;

use strata_procedural::{
    ElevationQuery, Heightfield, HeightmapBinding, HeightmapReady, HeightmapSource, HydraulicErosion,
    NoiseProfile, ProceduralTerrainGenerator, TerrainDetailScatter,
};
use strata_rendering::{
    MeshData, RenderBackend, RuntimeStats, SyncReport, TerrainClipmapStreamer, TerrainDetailRenderer3D,
    TerrainRuntime3DManager,
};
use tracing::{debug, info};

use crate::config::TerrainConfig;
use crate::error::TerrainResult;

/// Seed stream for erosion droplets, derived from the world seed.
const EROSION_STREAM: u64 = 0xE805;

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// A new heightmap was applied this frame.
    pub heightmap_applied: bool,
    /// The camera crossed a chunk boundary (or the clipmap was invalidated).
    pub clipmap_rebuilt: bool,
    /// Chunk sync result, if a sync ran.
    pub sync: Option<SyncReport>,
    /// Detail instances drawn this frame.
    pub visible_details: usize,
}

/// Terrain runtime for one world.
pub struct TerrainPipeline<B: RenderBackend> {
    config: TerrainConfig,
    heightfield: Option<Arc<Heightfield>>,
    sea_level: f32,
    binding: HeightmapBinding,
    streamer: TerrainClipmapStreamer,
    runtime: TerrainRuntime3DManager<B>,
    detail: TerrainDetailRenderer3D,
    grass_mesh: MeshData,
    rock_mesh: MeshData,
}

impl<B: RenderBackend> TerrainPipeline<B> {
    /// Builds a pipeline from a configuration and a render backend.
    ///
    /// # Errors
    ///
    /// [`crate::TerrainError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(config: TerrainConfig, backend: B) -> TerrainResult<Self> {
        config.validate()?;
        Ok(Self {
            streamer: TerrainClipmapStreamer::new(config.lod_manager(), config.runtime.chunk_size),
            runtime: TerrainRuntime3DManager::new(backend, config.runtime_settings()),
            sea_level: config.generation.sea_level,
            config,
            heightfield: None,
            binding: HeightmapBinding::new(),
            detail: TerrainDetailRenderer3D::new(),
            grass_mesh: MeshData::crossed_quads(0.6, 0.8),
            rock_mesh: MeshData::octahedron(0.5),
        })
    }

    /// Bootstrap hook: switches the 3D path and sets generation parameters
    /// for the next [`Self::generate_world`].
    ///
    /// Disabling hides and pools every chunk and drops detail instances.
    pub fn configure_runtime_pipeline(&mut self, enabled: bool, profile: NoiseProfile, erosion_iterations: usize) {
        let was_enabled = self.config.runtime.enabled;
        self.config.runtime.enabled = enabled;
        self.config.generation.profile = profile;
        self.config.generation.erosion_iterations = erosion_iterations;

        if was_enabled && !enabled {
            let released = self.runtime.release_all();
            self.detail.clear();
            info!(released, "Terrain runtime disabled");
        } else if !was_enabled && enabled {
            self.streamer.invalidate();
            self.rebuild_details();
            info!("Terrain runtime enabled");
        }
    }

    /// Generates and erodes a world from the current configuration.
    #[must_use]
    pub fn generate_world(&self) -> HeightmapReady {
        let generation = &self.config.generation;
        let heightfield = ProceduralTerrainGenerator::new(&generation.profile).generate(generation.size);
        self.finish_world(heightfield)
    }

    /// Like [`Self::generate_world`], guided by an external elevation source
    /// (a 2D map layer). `weight` in `[0, 1]` is how strongly the hints win.
    #[must_use]
    pub fn generate_world_with_hints(&self, hints: &dyn ElevationQuery, weight: f32) -> HeightmapReady {
        let generation = &self.config.generation;
        let heightfield = ProceduralTerrainGenerator::new(&generation.profile).generate_with_hints(
            generation.size,
            hints,
            weight,
        );
        self.finish_world(heightfield)
    }

    fn finish_world(&self, mut heightfield: Heightfield) -> HeightmapReady {
        let generation = &self.config.generation;
        let erosion_seed = generation.profile.world_seed().derive(EROSION_STREAM).value();
        let stats = HydraulicErosion::new(generation.erosion.clone()).erode(
            &mut heightfield,
            generation.erosion_iterations,
            erosion_seed,
        );
        info!(
            size = generation.size,
            seed = generation.profile.seed,
            droplets = stats.droplets,
            max_height = heightfield.max(),
            "World generated"
        );
        HeightmapReady::new(heightfield, generation.sea_level)
    }

    /// Generates a world and announces it on `source`.
    ///
    /// Returns the number of listeners reached.
    pub fn publish_world(&self, source: &HeightmapSource) -> usize {
        source.publish(&self.generate_world())
    }

    /// Listens to `source` for new heightmaps, replacing any previous source.
    pub fn bind_source(&mut self, source: &HeightmapSource) {
        self.binding.bind_source(source);
        debug!("Heightmap source bound");
    }

    /// Stops listening for heightmaps.
    pub fn unbind_source(&mut self) {
        self.binding.unbind();
    }

    /// Applies the newest heightmap received since the last poll.
    ///
    /// Older queued heightmaps are superseded. Returns true if one was
    /// applied.
    pub fn poll_events(&mut self) -> bool {
        match self.binding.drain().pop() {
            Some(event) => {
                self.apply_heightmap(event);
                true
            }
            None => false,
        }
    }

    /// Makes `event` the terrain source of truth and schedules a full
    /// clipmap rebuild.
    pub fn apply_heightmap(&mut self, event: HeightmapReady) {
        info!(size = event.size(), sea_level = event.sea_level, "Heightmap applied");
        self.heightfield = Some(event.heightfield);
        self.sea_level = event.sea_level;
        self.streamer.invalidate();
        self.runtime.invalidate_all();
        self.rebuild_details();
    }

    /// Runs one frame for the given camera position.
    ///
    /// Does nothing while disabled or before a heightmap has arrived.
    pub fn update_frame(&mut self, camera: [f32; 3]) -> FrameReport {
        let mut report = FrameReport {
            heightmap_applied: self.poll_events(),
            ..FrameReport::default()
        };
        if !self.config.runtime.enabled {
            return report;
        }
        let Some(heightfield) = self.heightfield.as_deref() else {
            return report;
        };

        let update = self.streamer.update_camera(camera);
        report.clipmap_rebuilt = update.rebuilt;
        if update.rebuilt || self.runtime.pending_count() > 0 {
            report.sync = Some(self.runtime.sync_clipmap(
                heightfield,
                update.visible_chunks,
                self.config.runtime.base_resolution,
            ));
        }

        if update.rebuilt {
            self.detail.cull_to_radius(camera, self.config.runtime.detail_radius);
        }
        report.visible_details = (self.detail.grass_batch().visible_count()
            + self.detail.rock_batch().visible_count()) as usize;
        report
    }

    fn rebuild_details(&mut self) {
        let Some(heightfield) = self.heightfield.as_deref() else {
            return;
        };
        if !self.config.runtime.enabled {
            return;
        }

        let scatter_config = &self.config.scatter;
        let mut rules = scatter_config.rules.clone();
        rules.cell_size = self.config.runtime.meters_per_vertex;
        let seed = self
            .config
            .generation
            .profile
            .world_seed()
            .derive(scatter_config.seed_offset)
            .value();

        let set = TerrainDetailScatter::new(rules).build(
            heightfield,
            scatter_config.density,
            scatter_config.min_height.max(self.sea_level),
            seed,
        );
        self.detail
            .configure_instances(&set.grass, &set.rocks, &self.grass_mesh, &self.rock_mesh);
    }

    /// True if the 3D path is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.runtime.enabled
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Current terrain, if any has arrived.
    #[must_use]
    pub fn heightfield(&self) -> Option<&Heightfield> {
        self.heightfield.as_deref()
    }

    /// Water plane of the current terrain.
    #[must_use]
    pub const fn sea_level(&self) -> f32 {
        self.sea_level
    }

    /// Chunk runtime.
    #[must_use]
    pub const fn runtime(&self) -> &TerrainRuntime3DManager<B> {
        &self.runtime
    }

    /// Detail batches.
    #[must_use]
    pub const fn detail_renderer(&self) -> &TerrainDetailRenderer3D {
        &self.detail
    }

    /// Chunk runtime statistics.
    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        self.runtime.stats()
    }
}
