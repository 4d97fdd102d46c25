//! # Detail Instancing
//!
//! Grass and rock placements become two instanced draws:
//!
//! ```text
//! ScatterTransform[] → DetailInstance[] (Pod) → instance buffer
//!                                            → DrawIndexedIndirectCommand
//! ```

mod instance_data;
mod renderer;

pub use instance_data::{DetailInstance, DrawIndexedIndirectCommand};
pub use renderer::{InstanceBatch, TerrainDetailRenderer3D};
