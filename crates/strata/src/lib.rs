//! # STRATA
//!
//! Procedural terrain runtime: world generation, hydraulic erosion, clipmap
//! chunk streaming and detail instancing behind one pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::{TerrainConfig, TerrainPipeline};
//! use strata_procedural::HeightmapSource;
//! use strata_rendering::HeadlessBackend;
//!
//! let config = TerrainConfig::load("config/terrain.toml")?;
//! let mut pipeline = TerrainPipeline::new(config, HeadlessBackend::new())?;
//!
//! let source = HeightmapSource::default();
//! pipeline.bind_source(&source);
//! pipeline.publish_world(&source);
//!
//! loop {
//!     let report = pipeline.update_frame(camera_position());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{GenerationConfig, LodConfig, RuntimeConfig, ScatterConfig, TerrainConfig};
pub use error::{TerrainError, TerrainResult};
pub use pipeline::{FrameReport, TerrainPipeline};
