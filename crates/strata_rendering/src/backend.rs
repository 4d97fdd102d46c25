//! # Render Backend Interface
//!
//! The runtime manager never touches a graphics API. It holds opaque
//! handles and asks the backend to create, fill and hide them.
//!
//! [`HeadlessBackend`] records what would have been uploaded. It backs the
//! tests, the perf tooling and dedicated servers.

use std::collections::HashMap;

use crate::mesh::MeshData;

/// Render resource lifecycle used by the chunk pool.
pub trait RenderBackend {
    /// Opaque resource handle.
    type Handle;

    /// Creates a new, empty, hidden resource.
    fn create(&mut self) -> Self::Handle;

    /// Replaces the resource's geometry and makes it visible.
    fn update(&mut self, handle: &Self::Handle, mesh: &MeshData);

    /// Hides the resource. It stays alive for reuse.
    fn release(&mut self, handle: &Self::Handle);
}

/// Handle issued by [`HeadlessBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

/// What a headless resource currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Vertices in the last upload.
    pub vertex_count: usize,
    /// Indices in the last upload.
    pub index_count: usize,
    /// Bytes in the last upload.
    pub bytes: usize,
    /// Uploads received over the resource's lifetime.
    pub uploads: u32,
    /// True between `update` and `release`.
    pub visible: bool,
}

/// Backend that keeps bookkeeping only.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    resources: HashMap<ResourceId, ResourceRecord>,
    uploads: u64,
    releases: u64,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a resource.
    #[must_use]
    pub fn resource(&self, id: ResourceId) -> Option<&ResourceRecord> {
        self.resources.get(&id)
    }

    /// Resources ever created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.resources.len()
    }

    /// Resources currently visible.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.resources.values().filter(|record| record.visible).count()
    }

    /// Total `update` calls.
    #[must_use]
    pub const fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Total `release` calls.
    #[must_use]
    pub const fn release_count(&self) -> u64 {
        self.releases
    }

    /// Bytes held by all resources (visible or not).
    #[must_use]
    pub fn resident_bytes(&self) -> usize {
        self.resources.values().map(|record| record.bytes).sum()
    }
}

impl RenderBackend for HeadlessBackend {
    type Handle = ResourceId;

    fn create(&mut self) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.resources.insert(id, ResourceRecord::default());
        id
    }

    fn update(&mut self, handle: &ResourceId, mesh: &MeshData) {
        if let Some(record) = self.resources.get_mut(handle) {
            record.vertex_count = mesh.vertex_count();
            record.index_count = mesh.index_count();
            record.bytes = mesh.byte_size();
            record.uploads += 1;
            record.visible = true;
            self.uploads += 1;
        }
    }

    fn release(&mut self, handle: &ResourceId) {
        if let Some(record) = self.resources.get_mut(handle) {
            record.visible = false;
            self.releases += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let id = backend.create();
        assert_eq!(backend.resource(id).map(|r| r.visible), Some(false));

        let mesh = MeshData::crossed_quads(1.0, 1.0);
        backend.update(&id, &mesh);
        let record = backend.resource(id).copied().unwrap_or_default();
        assert!(record.visible);
        assert_eq!(record.vertex_count, 8);
        assert_eq!(record.bytes, mesh.byte_size());

        backend.release(&id);
        assert_eq!(backend.visible_count(), 0);
        assert_eq!(backend.created_count(), 1, "Release hides, never destroys");
        assert_eq!(backend.upload_count(), 1);
        assert_eq!(backend.release_count(), 1);
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let mut backend = HeadlessBackend::new();
        backend.update(&ResourceId(7), &MeshData::default());
        backend.release(&ResourceId(7));
        assert_eq!(backend.upload_count(), 0);
        assert_eq!(backend.release_count(), 0);
    }
}
