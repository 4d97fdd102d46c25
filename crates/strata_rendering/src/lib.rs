//! # STRATA Rendering
//!
//! Streams terrain geometry around a moving camera:
//! - Concentric clipmap rings, finer near the camera
//! - Rebuilds only when the camera crosses a chunk boundary
//! - Pooled chunk instances, bounded builds per frame
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PER-FRAME PIPELINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Camera → ClipmapStreamer → RingMap (LOD 0..3)               │
//! │                 ↓ (chunk boundary crossed)                   │
//! │  Runtime3DManager: diff → pool → MeshBridge → RenderBackend  │
//! │                                                              │
//! │  Scatter → DetailRenderer3D → instance buffer + draw indirect│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - No graphics API in this crate: resources are backend handles
//! - No unbounded work per frame: excess builds wait for the next sync

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod chunk;
pub mod detail;
pub mod lod;
pub mod mesh;
pub mod runtime;
pub mod stats;
pub mod streamer;

pub use backend::{HeadlessBackend, RenderBackend, ResourceId, ResourceRecord};
pub use chunk::{ChunkCoord, ChunkKey, Edge, SeamMask};
pub use detail::{DetailInstance, DrawIndexedIndirectCommand, InstanceBatch, TerrainDetailRenderer3D};
pub use lod::{LodRing, RingMap, RingSettings, TerrainLodManager, DEFAULT_RING_RADII, DEFAULT_VERTEX_STRIDES};
pub use mesh::{MeshData, TerrainMeshBridge};
pub use runtime::{ChunkMetadata, RuntimeSettings, SyncReport, TerrainRuntime3DManager};
pub use stats::RuntimeStats;
pub use streamer::{StreamUpdate, TerrainClipmapStreamer};
