//! # Heightfield
//!
//! Square grid of elevation samples stored as a flat row-major array.
//!
//! The heightfield is the single source of truth for terrain shape: the
//! generator creates it, erosion refines it once, and meshing / scatter read
//! it afterwards. Elevations are non-negative by invariant.

/// A `size x size` grid of elevations, row-major (`index = z * size + x`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heightfield {
    size: usize,
    heights: Vec<f32>,
}

impl Heightfield {
    /// Creates a heightfield with every sample set to `height`.
    #[must_use]
    pub fn flat(size: usize, height: f32) -> Self {
        Self {
            size,
            heights: vec![height; size * size],
        }
    }

    /// Wraps existing row-major data.
    ///
    /// Returns `None` if `heights.len() != size * size`.
    #[must_use]
    pub fn from_raw(size: usize, heights: Vec<f32>) -> Option<Self> {
        (heights.len() == size * size).then_some(Self { size, heights })
    }

    /// Builds a heightfield by evaluating `f(x, z)` for every cell.
    #[must_use]
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut heights = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                heights.push(f(x, z));
            }
        }
        Self { size, heights }
    }

    /// Width and depth in samples.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of samples (`size * size`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// True when the grid has no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Raw row-major samples.
    #[inline]
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Mutable raw samples.
    #[inline]
    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Consumes the heightfield, returning the raw samples.
    #[must_use]
    pub fn into_raw(self) -> Vec<f32> {
        self.heights
    }

    /// Elevation at `(x, z)`, or `0.0` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        if x < self.size && z < self.size {
            self.heights[z * self.size + x]
        } else {
            0.0
        }
    }

    /// Sets the elevation at `(x, z)`. Ignored outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, height: f32) {
        if x < self.size && z < self.size {
            self.heights[z * self.size + x] = height;
        }
    }

    /// Bilinear sample at fractional cell coordinates, clamped to the border.
    #[must_use]
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let max = (self.size - 1) as f32;
        let x = x.clamp(0.0, max);
        let z = z.clamp(0.0, max);

        let x0 = x.floor() as usize;
        let z0 = z.floor() as usize;
        let x1 = (x0 + 1).min(self.size - 1);
        let z1 = (z0 + 1).min(self.size - 1);
        let fx = x - x0 as f32;
        let fz = z - z0 as f32;

        let top = self.get(x0, z0) * (1.0 - fx) + self.get(x1, z0) * fx;
        let bottom = self.get(x0, z1) * (1.0 - fx) + self.get(x1, z1) * fx;
        top * (1.0 - fz) + bottom * fz
    }

    /// Bilinear height and gradient `(h, dh/dx, dh/dz)` inside a cell.
    ///
    /// Callers must keep `0 <= x, z < size - 1`.
    #[must_use]
    pub fn height_and_gradient(&self, x: f32, z: f32) -> (f32, f32, f32) {
        let cx = x as usize;
        let cz = z as usize;
        let u = x - cx as f32;
        let v = z - cz as f32;

        let nw = self.get(cx, cz);
        let ne = self.get(cx + 1, cz);
        let sw = self.get(cx, cz + 1);
        let se = self.get(cx + 1, cz + 1);

        let grad_x = (ne - nw) * (1.0 - v) + (se - sw) * v;
        let grad_z = (sw - nw) * (1.0 - u) + (se - ne) * u;
        let height = nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v;

        (height, grad_x, grad_z)
    }

    /// Slope magnitude (rise per cell) at a grid cell from central differences.
    #[must_use]
    pub fn slope_at(&self, x: usize, z: usize) -> f32 {
        if self.size < 2 || x >= self.size || z >= self.size {
            return 0.0;
        }
        let left = x.saturating_sub(1);
        let right = (x + 1).min(self.size - 1);
        let up = z.saturating_sub(1);
        let down = (z + 1).min(self.size - 1);

        let dx = (self.get(right, z) - self.get(left, z)) / (right - left) as f32;
        let dz = (self.get(x, down) - self.get(x, up)) / (down - up) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    /// Lowest elevation, or `0.0` when empty.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.heights.iter().copied().reduce(f32::min).unwrap_or(0.0)
    }

    /// Highest elevation, or `0.0` when empty.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.heights.iter().copied().reduce(f32::max).unwrap_or(0.0)
    }
}
