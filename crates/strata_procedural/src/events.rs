//! Terrain notifications published through `strata_core` event sources.

use std::sync::Arc;

use strata_core::{EventSource, SourceBinding};

use crate::heightfield::Heightfield;

/// Source a terrain data owner publishes finished heightfields through.
pub type HeightmapSource = EventSource<HeightmapReady>;

/// Single-owner subscription to a [`HeightmapSource`].
pub type HeightmapBinding = SourceBinding<HeightmapReady>;

/// A new heightfield is ready: generation (or a terrain edit) finished.
///
/// Receiving this is what triggers the runtime to rebuild its clipmap.
/// The heightfield is shared, never copied per subscriber.
#[derive(Clone, Debug)]
pub struct HeightmapReady {
    /// The finished heightfield.
    pub heightfield: Arc<Heightfield>,
    /// Water level in the same units as the elevations.
    pub sea_level: f32,
}

impl HeightmapReady {
    /// Wraps a finished heightfield.
    #[must_use]
    pub fn new(heightfield: Heightfield, sea_level: f32) -> Self {
        Self {
            heightfield: Arc::new(heightfield),
            sea_level,
        }
    }

    /// Grid size of the carried heightfield.
    #[must_use]
    pub fn size(&self) -> usize {
        self.heightfield.size()
    }
}
