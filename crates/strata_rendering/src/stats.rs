//! Runtime statistics.

/// Snapshot of the chunk runtime after a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Chunks currently requested and owned by the runtime.
    pub active_chunks: usize,
    /// Released instances waiting in the pool.
    pub pooled_chunks: usize,
    /// Active chunks still waiting for a mesh build.
    pub pending_builds: usize,
    /// Highest number of chunk instances in use at once.
    pub peak_active: usize,
    /// Backend resources ever created.
    pub total_allocations: usize,
    /// Mesh builds since creation.
    pub total_builds: u64,
    /// Vertices across built active chunks.
    pub vertices: usize,
    /// Indices across built active chunks.
    pub indices: usize,
}

impl RuntimeStats {
    /// Triangles across built active chunks.
    #[must_use]
    pub const fn triangles(&self) -> usize {
        self.indices / 3
    }

    /// True once every active chunk has a mesh.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.pending_builds == 0
    }
}
