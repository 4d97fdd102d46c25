//! # STRATA Procedural Generation
//!
//! Deterministic terrain shaping for reproducible worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same terrain
//! 2. **Explicit randomness**: Every RNG is seeded by the caller
//! 3. **Single source of truth**: One [`Heightfield`] feeds meshing and scatter
//! 4. **Never panics on bad sizes**: Degenerate input yields empty output
//!
//! ## Core Components
//!
//! - `SimplexNoise`: 2D fractal noise
//! - `ProceduralTerrainGenerator`: Heightfield from a `NoiseProfile`
//! - `HydraulicErosion`: Droplet erosion, in place
//! - `TerrainDetailScatter`: Grass / rock placements
//! - `HeightmapReady`: Notification payload for the runtime
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{erode, generate_heightmap, NoiseProfile};
//!
//! let profile = NoiseProfile::with_seed(42);
//! let mut heightfield = generate_heightmap(512, &profile);
//! erode(&mut heightfield, 50_000, 42);
//! assert!(heightfield.min() >= 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod elevation;
pub mod erosion;
pub mod events;
pub mod generator;
pub mod heightfield;
pub mod noise;
pub mod profile;
pub mod scatter;

pub use elevation::{ElevationQuery, HeightfieldHints};
pub use erosion::{erode, erode_with_params, ErosionParams, ErosionStats, HydraulicErosion};
pub use events::{HeightmapBinding, HeightmapReady, HeightmapSource};
pub use generator::{generate_heightmap, ProceduralTerrainGenerator};
pub use heightfield::Heightfield;
pub use noise::{SimplexNoise, WorldSeed};
pub use profile::NoiseProfile;
pub use scatter::{build_scatter_transforms, ScatterRules, ScatterSet, ScatterTransform, TerrainDetailScatter};
