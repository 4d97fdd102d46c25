//! Instance data structures for GPU upload.

use bytemuck::{Pod, Zeroable};
use strata_procedural::ScatterTransform;

/// Per-instance data sent to the GPU.
///
/// Consumed by the detail vertex shader. 32 bytes: two `vec4<f32>`
/// attributes, 4-byte aligned.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DetailInstance {
    /// World position (x, y, z) + uniform scale packed in w.
    pub position_scale: [f32; 4],
    /// Yaw as (sin, cos), raw yaw in radians, wind phase.
    pub rotation: [f32; 4],
}

impl DetailInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Packs a scatter placement.
    #[must_use]
    pub fn from_transform(transform: &ScatterTransform) -> Self {
        let [x, y, z] = transform.position;
        let (sin, cos) = transform.rotation.sin_cos();
        Self {
            position_scale: [x, y, z, transform.scale],
            // Wind phase from position so neighbours sway out of step
            rotation: [sin, cos, transform.rotation, (x * 0.37 + z * 0.61).fract()],
        }
    }

    /// World position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> [f32; 3] {
        [self.position_scale[0], self.position_scale[1], self.position_scale[2]]
    }
}

/// Indirect draw command for instanced rendering.
///
/// Laid out for `draw_indexed_indirect`; `instance_count` is the visible
/// prefix of the instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectCommand {
    /// Number of indices per instance.
    pub index_count: u32,
    /// Number of instances to draw.
    pub instance_count: u32,
    /// First index in the index buffer.
    pub first_index: u32,
    /// Vertex offset added to each index.
    pub base_vertex: i32,
    /// First instance ID.
    pub first_instance: u32,
}

impl DrawIndexedIndirectCommand {
    /// Creates a command drawing `instance_count` copies of a mesh with
    /// `index_count` indices.
    #[must_use]
    pub const fn for_mesh(index_count: u32, instance_count: u32) -> Self {
        Self {
            index_count,
            instance_count,
            first_index: 0,
            base_vertex: 0,
            first_instance: 0,
        }
    }
}
