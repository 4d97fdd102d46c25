//! # Terrain Configuration
//!
//! Loaded once at startup. Every key is optional:
//!
//! ```toml
//! [runtime]
//! enabled = true
//! chunk_size = 64.0
//! base_resolution = 32
//! max_rebuilds_per_sync = 16
//!
//! [generation]
//! size = 512
//! erosion_iterations = 50000
//! sea_level = 12.0
//!
//! [generation.profile]
//! seed = 42
//! height_scale = 180.0
//!
//! [scatter]
//! density = 0.25
//!
//! [lod]
//! ring_radii = [1, 3, 6, 10]
//! vertex_strides = [1, 2, 4, 8]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_procedural::{ErosionParams, NoiseProfile, ScatterRules};
use strata_rendering::{RuntimeSettings, TerrainLodManager, DEFAULT_RING_RADII, DEFAULT_VERTEX_STRIDES};

use crate::error::{TerrainError, TerrainResult};

/// Complete terrain configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Chunk streaming.
    pub runtime: RuntimeConfig,
    /// World generation.
    pub generation: GenerationConfig,
    /// Grass / rock placement.
    pub scatter: ScatterConfig,
    /// Clipmap rings.
    pub lod: LodConfig,
}

/// `[runtime]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Master switch for the 3D runtime path.
    pub enabled: bool,
    /// Chunk edge length in meters.
    pub chunk_size: f32,
    /// World meters between heightfield samples.
    pub meters_per_vertex: f32,
    /// Quads per chunk edge in ring 0.
    pub base_resolution: u32,
    /// Chunk builds per frame; 0 = unbounded.
    pub max_rebuilds_per_sync: usize,
    /// Seam skirt depth in meters; 0 disables skirts.
    pub skirt_depth: f32,
    /// Detail instances farther than this from the camera are not drawn.
    pub detail_radius: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chunk_size: 64.0,
            meters_per_vertex: 1.0,
            base_resolution: 32,
            max_rebuilds_per_sync: 16,
            skirt_depth: 2.0,
            detail_radius: 96.0,
        }
    }
}

/// `[generation]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Heightfield edge length in samples.
    pub size: usize,
    /// Erosion droplets at world init.
    pub erosion_iterations: usize,
    /// Water plane elevation.
    pub sea_level: f32,
    /// Noise profile.
    pub profile: NoiseProfile,
    /// Droplet model constants.
    pub erosion: ErosionParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size: 512,
            erosion_iterations: 50_000,
            sea_level: 12.0,
            profile: NoiseProfile::default(),
            erosion: ErosionParams::default(),
        }
    }
}

/// `[scatter]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Candidates per heightfield cell.
    pub density: f32,
    /// Nothing is placed below this elevation (or below sea level).
    pub min_height: f32,
    /// Mixed into the world seed for the scatter stream.
    pub seed_offset: u64,
    /// Slope thresholds and scale ranges.
    pub rules: ScatterRules,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            density: 0.25,
            min_height: 0.0,
            seed_offset: 7,
            rules: ScatterRules::default(),
        }
    }
}

/// `[lod]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Outer Chebyshev radius of each ring, strictly increasing.
    pub ring_radii: Vec<u32>,
    /// Vertex stride of each ring, non-zero.
    pub vertex_strides: Vec<u32>,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            ring_radii: DEFAULT_RING_RADII.to_vec(),
            vertex_strides: DEFAULT_VERTEX_STRIDES.to_vec(),
        }
    }
}

impl TerrainConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Parse`] for malformed TOML,
    /// [`TerrainError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(toml: &str) -> TerrainResult<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Io`] if unreadable, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path).map_err(|source| TerrainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&toml)
    }

    /// Checks every value the runtime relies on.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> TerrainResult<()> {
        let runtime = &self.runtime;
        positive("runtime.chunk_size", runtime.chunk_size)?;
        positive("runtime.meters_per_vertex", runtime.meters_per_vertex)?;
        non_negative("runtime.skirt_depth", runtime.skirt_depth)?;
        non_negative("runtime.detail_radius", runtime.detail_radius)?;
        if runtime.base_resolution == 0 {
            return Err(invalid("runtime.base_resolution must be at least 1"));
        }

        if self.generation.size < 2 {
            return Err(invalid("generation.size must be at least 2"));
        }
        non_negative("generation.sea_level", self.generation.sea_level)?;
        non_negative("scatter.density", self.scatter.density)?;

        let lod = &self.lod;
        if lod.ring_radii.is_empty() {
            return Err(invalid("lod.ring_radii must not be empty"));
        }
        if lod.ring_radii.len() != lod.vertex_strides.len() {
            return Err(invalid(format!(
                "lod.ring_radii has {} entries but lod.vertex_strides has {}",
                lod.ring_radii.len(),
                lod.vertex_strides.len()
            )));
        }
        if lod.ring_radii.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(invalid("lod.ring_radii must be strictly increasing"));
        }
        if lod.vertex_strides.contains(&0) {
            return Err(invalid("lod.vertex_strides must be non-zero"));
        }
        Ok(())
    }

    /// Ring layout described by `[lod]`.
    #[must_use]
    pub fn lod_manager(&self) -> TerrainLodManager {
        TerrainLodManager::with_rings(&self.lod.ring_radii, &self.lod.vertex_strides)
    }

    /// Chunk runtime parameters described by `[runtime]`.
    #[must_use]
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            chunk_size: self.runtime.chunk_size,
            meters_per_vertex: self.runtime.meters_per_vertex,
            max_rebuilds_per_sync: self.runtime.max_rebuilds_per_sync,
            skirt_depth: self.runtime.skirt_depth,
        }
    }
}

fn invalid(message: impl Into<String>) -> TerrainError {
    TerrainError::InvalidConfig(message.into())
}

fn positive(field: &str, value: f32) -> TerrainResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be positive, got {value}")))
    }
}

fn non_negative(field: &str, value: f32) -> TerrainResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be non-negative, got {value}")))
    }
}
