//! # Detail Scatter
//!
//! Deterministic placement of decorative instances (grass tufts, rocks)
//! on a heightfield.
//!
//! Candidates are drawn uniformly from a seeded ChaCha stream; each
//! candidate consumes the same number of draws whether it is kept or not,
//! so one rejected candidate never shifts the rest of the set.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::heightfield::Heightfield;

/// Placement thresholds and instance variation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterRules {
    /// Grass only grows where the slope (rise per meter) is at most this.
    pub grass_max_slope: f32,
    /// Rocks only appear where the slope is at least this.
    pub rock_min_slope: f32,
    /// Uniform scale range for grass instances.
    pub grass_scale: [f32; 2],
    /// Uniform scale range for rock instances.
    pub rock_scale: [f32; 2],
    /// World meters between heightfield samples.
    pub cell_size: f32,
    /// Upper bound for the density parameter (candidates per cell).
    pub max_density: f32,
}

impl Default for ScatterRules {
    fn default() -> Self {
        Self {
            grass_max_slope: 0.35,
            rock_min_slope: 0.6,
            grass_scale: [0.6, 1.2],
            rock_scale: [0.5, 1.8],
            cell_size: 1.0,
            max_density: 4.0,
        }
    }
}

/// Placement of one decorative instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterTransform {
    /// World position; `y` is the terrain elevation.
    pub position: [f32; 3],
    /// Rotation about the vertical axis, in radians.
    pub rotation: f32,
    /// Uniform scale.
    pub scale: f32,
}

/// Scatter output, split by instance kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScatterSet {
    /// Grass placements (flat ground).
    pub grass: Vec<ScatterTransform>,
    /// Rock placements (steep ground).
    pub rocks: Vec<ScatterTransform>,
}

impl ScatterSet {
    /// Total placements of both kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.grass.len() + self.rocks.len()
    }
}

/// Scatter generator.
#[derive(Clone, Debug, Default)]
pub struct TerrainDetailScatter {
    rules: ScatterRules,
}

impl TerrainDetailScatter {
    /// Creates a scatter generator with custom rules.
    #[must_use]
    pub const fn new(rules: ScatterRules) -> Self {
        Self { rules }
    }

    /// Placement rules in use.
    #[must_use]
    pub const fn rules(&self) -> &ScatterRules {
        &self.rules
    }

    /// Builds grass and rock placements.
    ///
    /// * `density` - candidates per heightfield cell (clamped to `[0, max_density]`)
    /// * `min_height` - candidates below this elevation are rejected
    /// * `seed` - RNG seed; equal inputs always give equal output
    #[must_use]
    pub fn build(&self, heightfield: &Heightfield, density: f32, min_height: f32, seed: u64) -> ScatterSet {
        let mut set = ScatterSet::default();
        if heightfield.size() < 2 {
            return set;
        }

        let limit = (heightfield.size() - 1) as f32;
        let density = density.clamp(0.0, self.rules.max_density.max(0.0));
        let candidates = (limit * limit * density).round() as usize;
        let cell_size = if self.rules.cell_size > 0.0 { self.rules.cell_size } else { 1.0 };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..candidates {
            let x = rng.gen_range(0.0..limit);
            let z = rng.gen_range(0.0..limit);
            let rotation = rng.gen_range(0.0..TAU);
            let variation: f32 = rng.gen();

            let (height, grad_x, grad_z) = heightfield.height_and_gradient(x, z);
            if height < min_height {
                continue;
            }
            let slope = (grad_x * grad_x + grad_z * grad_z).sqrt() / cell_size;
            let position = [x * cell_size, height, z * cell_size];

            if slope <= self.rules.grass_max_slope {
                set.grass.push(ScatterTransform {
                    position,
                    rotation,
                    scale: lerp(self.rules.grass_scale, variation),
                });
            } else if slope >= self.rules.rock_min_slope {
                set.rocks.push(ScatterTransform {
                    position,
                    rotation,
                    scale: lerp(self.rules.rock_scale, variation),
                });
            }
        }

        set
    }
}

#[inline]
fn lerp([lo, hi]: [f32; 2], t: f32) -> f32 {
    lo + (hi - lo) * t
}

/// Builds placements with default rules.
#[must_use]
pub fn build_scatter_transforms(heightfield: &Heightfield, density: f32, min_height: f32, seed: u64) -> ScatterSet {
    TerrainDetailScatter::default().build(heightfield, density, min_height, seed)
}
