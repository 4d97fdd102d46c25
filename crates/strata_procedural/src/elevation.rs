//! Query interface for external elevation data (e.g. a 2D tile map).
//!
//! Only used to seed or cross-check generation. The terrain core never
//! writes back through this interface.

use crate::heightfield::Heightfield;

/// Per-cell lookups provided by an external terrain data source.
pub trait ElevationQuery {
    /// Normalized elevation hint in `[0, 1]` for a grid cell, or `None`
    /// when the source has no opinion about that cell.
    fn elevation_at(&self, x: usize, z: usize) -> Option<f32>;

    /// True if the source marks the cell as water.
    fn is_water(&self, _x: usize, _z: usize) -> bool {
        false
    }
}

/// A previously generated heightfield used to guide regeneration.
///
/// Heights are normalized by the field's maximum, scanned once on
/// construction.
#[derive(Clone, Copy, Debug)]
pub struct HeightfieldHints<'a> {
    field: &'a Heightfield,
    max: f32,
}

impl<'a> HeightfieldHints<'a> {
    /// Wraps `field` for use as an [`ElevationQuery`].
    #[must_use]
    pub fn new(field: &'a Heightfield) -> Self {
        Self {
            field,
            max: field.max(),
        }
    }
}

impl ElevationQuery for HeightfieldHints<'_> {
    fn elevation_at(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.field.size() || z >= self.field.size() || self.max <= 0.0 {
            return None;
        }
        Some(self.field.get(x, z) / self.max)
    }
}
