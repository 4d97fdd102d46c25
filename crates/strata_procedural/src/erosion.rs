//! # Hydraulic Erosion
//!
//! Droplet simulation: each iteration drops one particle of water on the
//! heightfield and lets it run downhill, picking up sediment where it is
//! fast and shallow and dropping it where it slows down or climbs.
//!
//! ## Invariants
//!
//! - No cell ever drops below zero. Removal is clamped per cell inside the
//!   brush step, never repaired afterwards.
//! - Identical `(heightfield, iterations, seed)` produce identical results.
//!   The droplet RNG is a `ChaCha8Rng` seeded by the caller.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::heightfield::Heightfield;

/// Droplet model constants.
///
/// These are tuned for plausibility on grids of 64..4096 cells with heights
/// of a few hundred units, not for physical accuracy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// How much of its previous direction a droplet keeps (0..1).
    pub inertia: f32,
    /// Sediment capacity multiplier.
    pub capacity: f32,
    /// Fraction of excess sediment dropped per step (0..1).
    pub deposition: f32,
    /// Fraction of free capacity eroded per step (0..1).
    pub erosion: f32,
    /// Fraction of water lost per step (0..1).
    pub evaporation: f32,
    /// Slope floor used for capacity on nearly flat ground.
    pub min_slope: f32,
    /// Acceleration from height loss.
    pub gravity: f32,
    /// Erosion brush radius in cells.
    pub radius: usize,
    /// Maximum steps per droplet.
    pub max_lifetime: usize,
    /// Water carried by a fresh droplet.
    pub initial_water: f32,
    /// Speed of a fresh droplet.
    pub initial_speed: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            inertia: 0.05,
            capacity: 4.0,
            deposition: 0.3,
            erosion: 0.3,
            evaporation: 0.01,
            min_slope: 0.01,
            gravity: 4.0,
            radius: 3,
            max_lifetime: 30,
            initial_water: 1.0,
            initial_speed: 1.0,
        }
    }
}

/// Totals from one erosion pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErosionStats {
    /// Droplets simulated.
    pub droplets: usize,
    /// Total material removed from the terrain.
    pub eroded: f32,
    /// Total material put back onto the terrain.
    pub deposited: f32,
}

/// Droplet erosion simulator with a precomputed brush.
pub struct HydraulicErosion {
    params: ErosionParams,
    /// Brush offsets and unnormalized weights.
    brush: Vec<(isize, isize, f32)>,
}

impl HydraulicErosion {
    /// Creates a simulator with the given constants.
    #[must_use]
    pub fn new(params: ErosionParams) -> Self {
        let radius = params.radius.max(1) as isize;
        let mut brush = Vec::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let distance = ((dx * dx + dz * dz) as f32).sqrt();
                let weight = 1.0 - distance / radius as f32;
                if weight > 0.0 {
                    brush.push((dx, dz, weight));
                }
            }
        }
        Self { params, brush }
    }

    /// The constants in use.
    #[must_use]
    pub const fn params(&self) -> &ErosionParams {
        &self.params
    }

    /// Runs `iterations` droplets over `heightfield` in place.
    ///
    /// Heightfields smaller than 2x2 are left untouched.
    pub fn erode(&self, heightfield: &mut Heightfield, iterations: usize, seed: u64) -> ErosionStats {
        let mut stats = ErosionStats::default();
        if heightfield.size() < 2 || iterations == 0 {
            return stats;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let limit = (heightfield.size() - 1) as f32;

        for _ in 0..iterations {
            let start_x = rng.gen_range(0.0..limit);
            let start_z = rng.gen_range(0.0..limit);
            self.run_droplet(heightfield, start_x, start_z, &mut stats);
            stats.droplets += 1;
        }

        debug!(
            droplets = stats.droplets,
            eroded = stats.eroded,
            deposited = stats.deposited,
            "Erosion pass complete"
        );
        stats
    }

    fn run_droplet(&self, heightfield: &mut Heightfield, mut x: f32, mut z: f32, stats: &mut ErosionStats) {
        let p = &self.params;
        let limit = (heightfield.size() - 1) as f32;

        let mut dir_x = 0.0f32;
        let mut dir_z = 0.0f32;
        let mut speed = p.initial_speed;
        let mut water = p.initial_water;
        let mut sediment = 0.0f32;

        for _ in 0..p.max_lifetime {
            let cell_x = x as usize;
            let cell_z = z as usize;
            let (height, grad_x, grad_z) = heightfield.height_and_gradient(x, z);

            dir_x = dir_x * p.inertia - grad_x * (1.0 - p.inertia);
            dir_z = dir_z * p.inertia - grad_z * (1.0 - p.inertia);
            let len = (dir_x * dir_x + dir_z * dir_z).sqrt();
            if len < 1e-6 {
                // Resting in a pit or on a plateau
                break;
            }
            dir_x /= len;
            dir_z /= len;

            let next_x = x + dir_x;
            let next_z = z + dir_z;
            if next_x < 0.0 || next_z < 0.0 || next_x >= limit || next_z >= limit {
                break;
            }

            let (next_height, _, _) = heightfield.height_and_gradient(next_x, next_z);
            let delta = next_height - height;
            let capacity = (-delta).max(p.min_slope) * speed * water * p.capacity;

            if sediment > capacity || delta > 0.0 {
                let amount = if delta > 0.0 {
                    // Fill the pit behind us, up to what we carry
                    sediment.min(delta)
                } else {
                    (sediment - capacity) * p.deposition
                };
                sediment -= amount;
                Self::deposit(heightfield, x, z, amount);
                stats.deposited += amount;
            } else {
                let wanted = ((capacity - sediment) * p.erosion).min(-delta);
                let removed = self.erode_brush(heightfield, cell_x, cell_z, wanted);
                sediment += removed;
                stats.eroded += removed;
            }

            speed = (speed * speed - delta * p.gravity).max(0.0).sqrt();
            water *= 1.0 - p.evaporation;
            x = next_x;
            z = next_z;
        }
    }

    /// Spreads `amount` over the four corners of the cell containing `(x, z)`.
    fn deposit(heightfield: &mut Heightfield, x: f32, z: f32, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let cell_x = x as usize;
        let cell_z = z as usize;
        let u = x - cell_x as f32;
        let v = z - cell_z as f32;

        let corners = [
            (cell_x, cell_z, (1.0 - u) * (1.0 - v)),
            (cell_x + 1, cell_z, u * (1.0 - v)),
            (cell_x, cell_z + 1, (1.0 - u) * v),
            (cell_x + 1, cell_z + 1, u * v),
        ];
        for (cx, cz, weight) in corners {
            let current = heightfield.get(cx, cz);
            heightfield.set(cx, cz, current + amount * weight);
        }
    }

    /// Removes up to `amount` around a cell, weighted by the brush.
    ///
    /// Each cell gives at most what it has. Returns the amount actually removed.
    fn erode_brush(&self, heightfield: &mut Heightfield, cell_x: usize, cell_z: usize, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let size = heightfield.size() as isize;
        let in_bounds = |dx: isize, dz: isize| {
            let px = cell_x as isize + dx;
            let pz = cell_z as isize + dz;
            (px >= 0 && pz >= 0 && px < size && pz < size).then_some((px as usize, pz as usize))
        };

        let total_weight: f32 = self
            .brush
            .iter()
            .filter(|(dx, dz, _)| in_bounds(*dx, *dz).is_some())
            .map(|(_, _, w)| w)
            .sum();
        if total_weight <= 0.0 {
            return 0.0;
        }

        let mut removed = 0.0;
        for &(dx, dz, weight) in &self.brush {
            let Some((px, pz)) = in_bounds(dx, dz) else {
                continue;
            };
            let current = heightfield.get(px, pz);
            let take = (amount * weight / total_weight).min(current.max(0.0));
            heightfield.set(px, pz, current - take);
            removed += take;
        }
        removed
    }
}

impl Default for HydraulicErosion {
    fn default() -> Self {
        Self::new(ErosionParams::default())
    }
}

/// Erodes `heightfield` in place with default constants.
pub fn erode(heightfield: &mut Heightfield, iterations: usize, seed: u64) -> ErosionStats {
    HydraulicErosion::default().erode(heightfield, iterations, seed)
}

/// Erodes `heightfield` in place with custom constants.
pub fn erode_with_params(
    heightfield: &mut Heightfield,
    iterations: usize,
    seed: u64,
    params: &ErosionParams,
) -> ErosionStats {
    HydraulicErosion::new(params.clone()).erode(heightfield, iterations, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: usize) -> Heightfield {
        Heightfield::from_fn(size, |x, z| 2.0 + x as f32 * 0.8 + z as f32 * 0.3)
    }

    #[test]
    fn test_erosion_changes_sloped_terrain() {
        let original = ramp(64);
        let mut eroded = original.clone();
        let stats = erode(&mut eroded, 3000, 99);

        assert_eq!(stats.droplets, 3000);
        assert!(stats.eroded > 0.0);
        assert_ne!(original, eroded, "Erosion should modify the heightfield");
        assert!(eroded.min() >= 0.0);
    }

    #[test]
    fn test_erosion_deterministic() {
        let mut a = ramp(48);
        let mut b = ramp(48);
        erode(&mut a, 1500, 5);
        erode(&mut b, 1500, 5);
        assert_eq!(a, b);

        let mut c = ramp(48);
        erode(&mut c, 1500, 6);
        assert_ne!(a, c, "Different seeds should erode differently");
    }

    #[test]
    fn test_thin_terrain_never_negative() {
        // Barely-there sediment layer on a steep ramp with aggressive constants
        let mut hf = Heightfield::from_fn(32, |x, _| {
            let grain = if x % 2 == 0 { 0.001 } else { 0.0 };
            grain + x as f32 * 0.01
        });
        let erosion = HydraulicErosion::new(ErosionParams {
            erosion: 1.0,
            capacity: 50.0,
            ..ErosionParams::default()
        });
        erosion.erode(&mut hf, 5000, 123);
        assert!(hf.min() >= 0.0, "min = {}", hf.min());
    }

    #[test]
    fn test_degenerate_inputs_are_noops() {
        let mut tiny = Heightfield::flat(1, 5.0);
        assert_eq!(erode(&mut tiny, 100, 1).droplets, 0);
        assert_eq!(tiny.get(0, 0), 5.0);

        let mut hf = ramp(16);
        let before = hf.clone();
        erode(&mut hf, 0, 1);
        assert_eq!(hf, before);
    }

    #[test]
    fn test_flat_terrain_is_stable() {
        let mut hf = Heightfield::flat(32, 10.0);
        erode(&mut hf, 500, 42);
        assert!(hf.heights().iter().all(|h| (*h - 10.0).abs() < 1e-6));
    }
}
