//! # Procedural Terrain Generator
//!
//! Produces a heightfield from a [`NoiseProfile`]:
//!
//! ```text
//! h(x, z) = height_scale * lift(fbm(x, z)) * falloff(r(x, z))
//! ```
//!
//! - `fbm` is octaved simplex noise mapped to `[0, 1]`
//! - `lift` raises it by `continent_bias` so the interior never sits at zero
//! - `falloff` is 1 inside `falloff_start` and eases to 0 at the far corner,
//!   so every generated world is an island tapering into the sea

use std::f32::consts::SQRT_2;

use tracing::debug;

use crate::elevation::ElevationQuery;
use crate::heightfield::Heightfield;
use crate::noise::SimplexNoise;
use crate::profile::NoiseProfile;

/// Multiplier applied to the normalized noise of cells an external source
/// marks as water.
const WATER_DEPRESSION: f32 = 0.35;

/// Heightfield generator bound to one profile.
pub struct ProceduralTerrainGenerator {
    profile: NoiseProfile,
    noise: SimplexNoise,
}

impl ProceduralTerrainGenerator {
    /// Creates a generator. The permutation table is built once here.
    #[must_use]
    pub fn new(profile: &NoiseProfile) -> Self {
        Self {
            noise: SimplexNoise::new(profile.world_seed()),
            profile: profile.clone(),
        }
    }

    /// The profile this generator was built from.
    #[must_use]
    pub const fn profile(&self) -> &NoiseProfile {
        &self.profile
    }

    /// Generates a `size x size` heightfield.
    ///
    /// `size == 0` yields an empty heightfield.
    #[must_use]
    pub fn generate(&self, size: usize) -> Heightfield {
        let heightfield = Heightfield::from_fn(size, |x, z| {
            let base = self.normalized_noise(x, z, size);
            self.finish(base, x, z, size)
        });
        debug!(size, seed = self.profile.seed, max = heightfield.max(), "Generated heightfield");
        heightfield
    }

    /// Generates a heightfield blended toward an external elevation source.
    ///
    /// `weight` (clamped to `[0, 1]`) is how strongly the hint overrides the
    /// noise; cells the source marks as water are pushed down.
    #[must_use]
    pub fn generate_with_hints(&self, size: usize, hints: &dyn ElevationQuery, weight: f32) -> Heightfield {
        let weight = weight.clamp(0.0, 1.0);
        Heightfield::from_fn(size, |x, z| {
            let mut base = self.normalized_noise(x, z, size);
            if let Some(hint) = hints.elevation_at(x, z) {
                base += (hint.clamp(0.0, 1.0) - base) * weight;
            }
            if hints.is_water(x, z) {
                base *= WATER_DEPRESSION;
            }
            self.finish(base, x, z, size)
        })
    }

    /// Octaved noise at a grid cell, mapped to `[0, 1]`.
    fn normalized_noise(&self, x: usize, z: usize, size: usize) -> f32 {
        let scale = self.profile.frequency / size.max(1) as f64;
        let value = self.noise.octaved(
            x as f64 * scale,
            z as f64 * scale,
            self.profile.octaves,
            self.profile.persistence,
            self.profile.lacunarity,
        );
        (((value + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Applies lift, island falloff and height scale.
    fn finish(&self, base: f32, x: usize, z: usize, size: usize) -> f32 {
        let bias = self.profile.continent_bias.clamp(0.0, 1.0);
        let lifted = bias + (1.0 - bias) * base;
        let max_height = self.profile.height_scale.max(0.0);
        (lifted * self.island_falloff(x, z, size) * max_height).clamp(0.0, max_height)
    }

    /// 1.0 at the grid center, 0.0 at the corners.
    fn island_falloff(&self, x: usize, z: usize, size: usize) -> f32 {
        let center = size.saturating_sub(1) as f32 * 0.5;
        let half = center.max(0.5);
        let dx = (x as f32 - center) / half;
        let dz = (z as f32 - center) / half;
        let distance = ((dx * dx + dz * dz).sqrt() / SQRT_2).min(1.0);

        let start = self.profile.falloff_start.clamp(0.0, 0.99);
        if distance <= start {
            return 1.0;
        }
        let t = (distance - start) / (1.0 - start);
        let eased = t * t * (3.0 - 2.0 * t);
        (1.0 - eased).max(0.0).powf(self.profile.falloff_power.max(0.01))
    }
}

/// Generates a `size x size` heightfield with values in
/// `[0, profile.height_scale]`. Bit-identical for identical inputs.
#[must_use]
pub fn generate_heightmap(size: usize, profile: &NoiseProfile) -> Heightfield {
    ProceduralTerrainGenerator::new(profile).generate(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::HeightfieldHints;

    #[test]
    fn test_size_and_range() {
        let profile = NoiseProfile::with_seed(7);
        for size in [1, 2, 17, 64] {
            let hf = generate_heightmap(size, &profile);
            assert_eq!(hf.len(), size * size);
            assert!(hf
                .heights()
                .iter()
                .all(|h| (0.0..=profile.height_scale).contains(h)));
        }
    }

    #[test]
    fn test_zero_size_is_empty() {
        let hf = generate_heightmap(0, &NoiseProfile::default());
        assert!(hf.is_empty());
        assert_eq!(hf.size(), 0);
    }

    #[test]
    fn test_bit_identical() {
        let profile = NoiseProfile::with_seed(2024);
        let a = generate_heightmap(48, &profile);
        let b = generate_heightmap(48, &profile);
        let same = a
            .heights()
            .iter()
            .zip(b.heights())
            .all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(same, "Generation must be bit-for-bit deterministic");
    }

    #[test]
    fn test_island_falloff() {
        let hf = generate_heightmap(65, &NoiseProfile::with_seed(3));
        let center = hf.get(32, 32);
        let corner = hf.get(0, 0);
        assert!(center > corner, "center {center} should exceed corner {corner}");
        assert_eq!(corner, 0.0);
    }

    #[test]
    fn test_non_positive_height_scale_is_flat() {
        let profile = NoiseProfile {
            height_scale: -5.0,
            ..NoiseProfile::default()
        };
        let hf = generate_heightmap(16, &profile);
        assert!(hf.heights().iter().all(|h| *h == 0.0));
    }

    struct Plateau;

    impl ElevationQuery for Plateau {
        fn elevation_at(&self, _x: usize, _z: usize) -> Option<f32> {
            Some(1.0)
        }

        fn is_water(&self, x: usize, _z: usize) -> bool {
            x < 4
        }
    }

    #[test]
    fn test_hints_override_noise() {
        let profile = NoiseProfile {
            falloff_start: 0.99,
            ..NoiseProfile::with_seed(11)
        };
        let generator = ProceduralTerrainGenerator::new(&profile);
        let hinted = generator.generate_with_hints(32, &Plateau, 1.0);

        // Full-weight hint of 1.0 lifts dry interior cells to the ceiling
        assert!((hinted.get(16, 16) - profile.height_scale).abs() < 1e-3);
        // Water cells are depressed
        assert!(hinted.get(2, 16) < hinted.get(16, 16));
    }

    #[test]
    fn test_previous_heightfield_guides_regeneration() {
        let previous = generate_heightmap(48, &NoiseProfile::with_seed(5));
        let hints = HeightfieldHints::new(&previous);

        // At full weight the guide replaces the noise, so the seed stops mattering
        let a = ProceduralTerrainGenerator::new(&NoiseProfile::with_seed(100)).generate_with_hints(48, &hints, 1.0);
        let b = ProceduralTerrainGenerator::new(&NoiseProfile::with_seed(200)).generate_with_hints(48, &hints, 1.0);
        let drift = a
            .heights()
            .iter()
            .zip(b.heights())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max);
        assert!(drift < 1e-3, "drift = {drift}");
        assert_ne!(a, generate_heightmap(48, &NoiseProfile::with_seed(100)));

        // At zero weight the guide is ignored
        let unguided = ProceduralTerrainGenerator::new(&NoiseProfile::with_seed(100)).generate_with_hints(48, &hints, 0.0);
        assert_eq!(unguided, generate_heightmap(48, &NoiseProfile::with_seed(100)));
    }
}
