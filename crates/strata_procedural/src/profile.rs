//! Noise profile: the value object that fully describes a generated terrain.

use serde::{Deserialize, Serialize};

use crate::noise::WorldSeed;

/// Parameters for heightfield generation.
///
/// Values are used as given; callers are expected to supply sane ranges.
/// Generated elevations lie in `[0, height_scale]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseProfile {
    /// Seed for the noise permutation.
    pub seed: u64,
    /// Maximum elevation in world units.
    pub height_scale: f32,
    /// Noise features across the whole grid at the first octave.
    pub frequency: f64,
    /// Number of fractal layers.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Frequency growth per octave.
    pub lacunarity: f64,
    /// Minimum normalized lift applied before the falloff (0..1).
    pub continent_bias: f32,
    /// Normalized radius where the island falloff begins (0..1).
    pub falloff_start: f32,
    /// Exponent shaping the falloff toward the edges.
    pub falloff_power: f32,
}

impl NoiseProfile {
    /// Default profile with a different seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Returns the profile seed as a [`WorldSeed`].
    #[inline]
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed::new(self.seed)
    }
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            seed: 1337,
            height_scale: 120.0,
            frequency: 4.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            continent_bias: 0.3,
            falloff_start: 0.35,
            falloff_power: 1.5,
        }
    }
}
