//! Instanced grass and rock batches.

use tracing::debug;

use strata_procedural::ScatterTransform;

use super::instance_data::{DetailInstance, DrawIndexedIndirectCommand};
use crate::mesh::MeshData;

/// One instanced draw: a mesh plus its per-instance records.
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    mesh: MeshData,
    instances: Vec<DetailInstance>,
    command: DrawIndexedIndirectCommand,
}

impl InstanceBatch {
    fn configure(&mut self, transforms: &[ScatterTransform], mesh: &MeshData) {
        self.mesh.clone_from(mesh);
        self.instances.clear();
        self.instances.extend(transforms.iter().map(DetailInstance::from_transform));
        self.command = DrawIndexedIndirectCommand::for_mesh(
            u32::try_from(mesh.index_count()).unwrap_or(u32::MAX),
            u32::try_from(self.instances.len()).unwrap_or(u32::MAX),
        );
    }

    /// Moves instances within `radius` of `camera` (XZ distance) to the
    /// front and draws only those.
    fn cull(&mut self, camera: [f32; 3], radius: f32) -> usize {
        let radius_sq = radius * radius;
        let within = |instance: &DetailInstance| {
            let [x, _, z] = instance.position();
            let dx = x - camera[0];
            let dz = z - camera[2];
            dx * dx + dz * dz <= radius_sq
        };
        // Stable so culled order stays deterministic
        self.instances.sort_by_key(|instance| !within(instance));
        let visible = self.instances.iter().take_while(|instance| within(instance)).count();
        self.command.instance_count = u32::try_from(visible).unwrap_or(u32::MAX);
        visible
    }

    /// Configured instance count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances the current draw command covers.
    #[must_use]
    pub const fn visible_count(&self) -> u32 {
        self.command.instance_count
    }

    /// Per-instance records (visible prefix first after culling).
    #[must_use]
    pub fn instances(&self) -> &[DetailInstance] {
        &self.instances
    }

    /// Instance records as bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Indirect draw command for this batch.
    #[must_use]
    pub const fn command(&self) -> DrawIndexedIndirectCommand {
        self.command
    }

    /// Mesh drawn per instance.
    #[must_use]
    pub const fn mesh(&self) -> &MeshData {
        &self.mesh
    }
}

/// Holds the grass and rock batches for the loaded terrain.
#[derive(Debug, Default)]
pub struct TerrainDetailRenderer3D {
    grass: InstanceBatch,
    rocks: InstanceBatch,
}

impl TerrainDetailRenderer3D {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds both batches, sized to the transform counts. Everything is
    /// drawn until the next [`Self::cull_to_radius`].
    pub fn configure_instances(
        &mut self,
        grass: &[ScatterTransform],
        rocks: &[ScatterTransform],
        grass_mesh: &MeshData,
        rock_mesh: &MeshData,
    ) {
        self.grass.configure(grass, grass_mesh);
        self.rocks.configure(rocks, rock_mesh);
        debug!(grass = grass.len(), rocks = rocks.len(), "Detail instances configured");
    }

    /// Limits both draws to instances within `radius` of the camera.
    ///
    /// Configured counts do not change. Returns the visible total.
    pub fn cull_to_radius(&mut self, camera: [f32; 3], radius: f32) -> usize {
        self.grass.cull(camera, radius) + self.rocks.cull(camera, radius)
    }

    /// Drops all instances.
    pub fn clear(&mut self) {
        self.grass = InstanceBatch::default();
        self.rocks = InstanceBatch::default();
    }

    /// Configured grass instances.
    #[must_use]
    pub fn grass_count(&self) -> usize {
        self.grass.len()
    }

    /// Configured rock instances.
    #[must_use]
    pub fn rock_count(&self) -> usize {
        self.rocks.len()
    }

    /// The grass batch.
    #[must_use]
    pub const fn grass_batch(&self) -> &InstanceBatch {
        &self.grass
    }

    /// The rock batch.
    #[must_use]
    pub const fn rock_batch(&self) -> &InstanceBatch {
        &self.rocks
    }

    /// Draw calls needed this frame (empty batches are skipped).
    #[must_use]
    pub fn draw_calls(&self) -> u32 {
        u32::from(self.grass.visible_count() > 0) + u32::from(self.rocks.visible_count() > 0)
    }
}
