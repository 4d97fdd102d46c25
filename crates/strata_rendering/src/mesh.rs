//! # Terrain Mesh Bridge
//!
//! Turns a window of the heightfield into chunk geometry.
//!
//! ```text
//!   j=0  0 ── 1 ── 2      (resolution + 1)^2 vertices, row-major by Z
//!        │ ╲  │ ╲  │      two triangles per quad: (a, c, b) (b, c, d)
//!   j=1  3 ── 4 ── 5      counter-clockwise seen from +Y
//! ```
//!
//! Positions are world space. The heightfield is sampled bilinearly at
//! `world / meters_per_vertex`, clamped at its border.

use strata_procedural::Heightfield;

use crate::chunk::{ChunkCoord, Edge, SeamMask};

/// CPU-side geometry for one chunk or one instanced mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates in `[0, 1]`.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices.
    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// True when there is nothing to draw.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bytes this mesh occupies once uploaded (tightly packed attributes).
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.positions.len() * std::mem::size_of::<[f32; 3]>()
            + self.normals.len() * std::mem::size_of::<[f32; 3]>()
            + self.uvs.len() * std::mem::size_of::<[f32; 2]>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }

    /// Empties all buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Two quads crossed at right angles, standing on the origin.
    ///
    /// The usual grass-tuft billboard.
    #[must_use]
    pub fn crossed_quads(width: f32, height: f32) -> Self {
        let half = width * 0.5;
        let mut mesh = Self::default();
        for (axis, normal) in [([1.0, 0.0], [0.0, 0.0, 1.0]), ([0.0, 1.0], [1.0, 0.0, 0.0])] {
            let base = mesh.positions.len() as u32;
            let [ax, az] = axis;
            mesh.positions.extend_from_slice(&[
                [-half * ax, 0.0, -half * az],
                [half * ax, 0.0, half * az],
                [-half * ax, height, -half * az],
                [half * ax, height, half * az],
            ]);
            mesh.normals.extend_from_slice(&[normal; 4]);
            mesh.uvs.extend_from_slice(&[[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]);
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
        }
        mesh
    }

    /// Flat-shaded octahedron resting on the origin. Stand-in rock.
    #[must_use]
    pub fn octahedron(radius: f32) -> Self {
        let top = [0.0, radius * 2.0, 0.0];
        let bottom = [0.0, 0.0, 0.0];
        let ring = [
            [radius, radius, 0.0],
            [0.0, radius, radius],
            [-radius, radius, 0.0],
            [0.0, radius, -radius],
        ];

        let mut mesh = Self::default();
        for i in 0..4 {
            let a = ring[i];
            let b = ring[(i + 1) % 4];
            for tri in [[top, b, a], [bottom, a, b]] {
                let normal = face_normal(tri[0], tri[1], tri[2]);
                let base = mesh.positions.len() as u32;
                mesh.positions.extend_from_slice(&tri);
                mesh.normals.extend_from_slice(&[normal; 3]);
                mesh.uvs.extend_from_slice(&[[0.5, 0.0], [0.0, 1.0], [1.0, 1.0]]);
                mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
            }
        }
        mesh
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    normalize([
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ])
}

#[inline]
fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

/// Stateless heightfield-to-mesh conversion.
pub struct TerrainMeshBridge;

impl TerrainMeshBridge {
    /// Builds the mesh for one chunk.
    ///
    /// Yields `(resolution + 1)^2` vertices and `resolution^2 * 6` indices, or
    /// empty buffers when `resolution == 0`, the heightfield is empty, or a
    /// spacing is not positive.
    #[must_use]
    pub fn generate_chunk_mesh_data(
        heightfield: &Heightfield,
        coord: ChunkCoord,
        resolution: u32,
        meters_per_vertex: f32,
        chunk_size: f32,
    ) -> MeshData {
        let mut mesh = MeshData::default();
        Self::fill_chunk_mesh(&mut mesh, heightfield, coord, resolution, meters_per_vertex, chunk_size);
        mesh
    }

    /// Same as [`Self::generate_chunk_mesh_data`], reusing `mesh`'s buffers.
    pub fn fill_chunk_mesh(
        mesh: &mut MeshData,
        heightfield: &Heightfield,
        coord: ChunkCoord,
        resolution: u32,
        meters_per_vertex: f32,
        chunk_size: f32,
    ) {
        mesh.clear();
        let spacing_ok = meters_per_vertex > 0.0
            && meters_per_vertex.is_finite()
            && chunk_size > 0.0
            && chunk_size.is_finite();
        if resolution == 0 || heightfield.is_empty() || !spacing_ok {
            return;
        }

        let side = resolution as usize + 1;
        let step = chunk_size / resolution as f32;
        let (origin_x, origin_z) = coord.world_origin(chunk_size);
        let height_at = |wx: f32, wz: f32| heightfield.sample(wx / meters_per_vertex, wz / meters_per_vertex);

        mesh.positions.reserve(side * side);
        mesh.normals.reserve(side * side);
        mesh.uvs.reserve(side * side);
        mesh.indices.reserve(resolution as usize * resolution as usize * 6);

        for j in 0..side {
            for i in 0..side {
                let wx = origin_x + i as f32 * step;
                let wz = origin_z + j as f32 * step;

                // Central differences one vertex step apart, in world units
                let left = height_at(wx - step, wz);
                let right = height_at(wx + step, wz);
                let near = height_at(wx, wz - step);
                let far = height_at(wx, wz + step);

                mesh.positions.push([wx, height_at(wx, wz), wz]);
                mesh.normals.push(normalize([left - right, 2.0 * step, near - far]));
                mesh.uvs.push([i as f32 / resolution as f32, j as f32 / resolution as f32]);
            }
        }

        let side = side as u32;
        for j in 0..resolution {
            for i in 0..resolution {
                let a = j * side + i;
                let b = a + 1;
                let c = a + side;
                let d = c + 1;
                mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
    }

    /// Hangs a skirt of `depth` meters below every edge flagged in `mask`.
    ///
    /// `mesh` must be a grid built at `resolution`; anything else is left
    /// untouched. Skirts face outward and reuse the edge normals and UVs.
    pub fn append_skirts(mesh: &mut MeshData, resolution: u32, mask: SeamMask, depth: f32) {
        let side = resolution as usize + 1;
        if resolution == 0 || mask.is_empty() || depth <= 0.0 || mesh.vertex_count() != side * side {
            return;
        }

        let last = resolution as usize;
        for edge in mask.edges() {
            // Walk direction is chosen so that the strip faces out of the chunk
            let rim: Vec<usize> = match edge {
                Edge::North => (0..=last).collect(),
                Edge::South => (0..=last).rev().map(|i| last * side + i).collect(),
                Edge::East => (0..=last).map(|j| j * side + last).collect(),
                Edge::West => (0..=last).rev().map(|j| j * side).collect(),
            };

            let base = mesh.positions.len() as u32;
            for &top in &rim {
                let [x, y, z] = mesh.positions[top];
                mesh.positions.push([x, y - depth, z]);
                mesh.normals.push(mesh.normals[top]);
                mesh.uvs.push(mesh.uvs[top]);
            }
            for k in 0..last {
                let top_a = rim[k] as u32;
                let top_b = rim[k + 1] as u32;
                let low_a = base + k as u32;
                let low_b = low_a + 1;
                mesh.indices
                    .extend_from_slice(&[top_a, top_b, low_a, top_b, low_b, low_a]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: usize) -> Heightfield {
        Heightfield::from_fn(size, |x, _| x as f32)
    }

    #[test]
    fn test_flat_field_counts() {
        let hf = Heightfield::flat(64, 3.0);
        let mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(0, 0), 16, 1.0, 32.0);

        assert_eq!(mesh.positions.len(), 17 * 17);
        assert_eq!(mesh.normals.len(), 17 * 17);
        assert_eq!(mesh.uvs.len(), 17 * 17);
        assert_eq!(mesh.indices.len(), 16 * 16 * 6);
        assert!(mesh.normals.iter().all(|n| (n[1] - 1.0).abs() < 1e-6));
        assert!(mesh.positions.iter().all(|p| (p[1] - 3.0).abs() < 1e-6));
    }

    #[test]
    fn test_uvs_span_chunk() {
        let hf = Heightfield::flat(8, 0.0);
        let mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(1, 2), 4, 1.0, 4.0);
        assert_eq!(mesh.uvs.first(), Some(&[0.0, 0.0]));
        assert_eq!(mesh.uvs.last(), Some(&[1.0, 1.0]));
        assert_eq!(mesh.positions.first(), Some(&[4.0, 0.0, 8.0]));
        assert_eq!(mesh.positions.last(), Some(&[8.0, 0.0, 12.0]));
    }

    #[test]
    fn test_ramp_normals_tilt_downhill() {
        let hf = ramp(32);
        let mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(0, 0), 8, 1.0, 16.0);
        // Height rises with +X so the normal leans toward -X
        let center = mesh.normals[4 * 9 + 4];
        assert!(center[0] < 0.0);
        assert!(center[1] > 0.0);
        assert!(center[2].abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_inputs_give_empty_buffers() {
        let hf = Heightfield::flat(16, 1.0);
        let origin = ChunkCoord::new(0, 0);
        assert!(TerrainMeshBridge::generate_chunk_mesh_data(&hf, origin, 0, 1.0, 8.0).positions.is_empty());
        assert!(TerrainMeshBridge::generate_chunk_mesh_data(&hf, origin, 4, 0.0, 8.0).positions.is_empty());
        assert!(TerrainMeshBridge::generate_chunk_mesh_data(&hf, origin, 4, 1.0, -8.0).positions.is_empty());
        assert!(TerrainMeshBridge::generate_chunk_mesh_data(&Heightfield::default(), origin, 4, 1.0, 8.0)
            .positions
            .is_empty());
    }

    #[test]
    fn test_pure() {
        let hf = ramp(32);
        let a = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(1, 0), 8, 0.5, 8.0);
        let b = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(1, 0), 8, 0.5, 8.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_reuses_buffers() {
        let hf = Heightfield::flat(16, 1.0);
        let mut mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(0, 0), 8, 1.0, 8.0);
        let capacity = mesh.positions.capacity();
        TerrainMeshBridge::fill_chunk_mesh(&mut mesh, &hf, ChunkCoord::new(0, 0), 4, 1.0, 8.0);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.positions.capacity(), capacity);
    }

    #[test]
    fn test_skirts() {
        let hf = Heightfield::flat(16, 5.0);
        let mut mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(0, 0), 4, 1.0, 8.0);
        let mut mask = SeamMask::NONE;
        mask.insert(Edge::East);
        mask.insert(Edge::South);

        TerrainMeshBridge::append_skirts(&mut mesh, 4, mask, 2.0);
        assert_eq!(mesh.vertex_count(), 25 + 2 * 5);
        assert_eq!(mesh.index_count(), 4 * 4 * 6 + 2 * 4 * 6);
        assert!(mesh.positions[25..].iter().all(|p| (p[1] - 3.0).abs() < 1e-6));

        // Skirt on the east edge faces +X
        let tri = &mesh.indices[4 * 4 * 6 + 4 * 6..][..3];
        let normal = face_normal(
            mesh.positions[tri[0] as usize],
            mesh.positions[tri[1] as usize],
            mesh.positions[tri[2] as usize],
        );
        assert!(normal[0] > 0.99, "normal = {normal:?}");
    }

    #[test]
    fn test_skirts_ignore_mismatched_grid() {
        let hf = Heightfield::flat(16, 5.0);
        let mut mesh = TerrainMeshBridge::generate_chunk_mesh_data(&hf, ChunkCoord::new(0, 0), 4, 1.0, 8.0);
        let before = mesh.clone();
        TerrainMeshBridge::append_skirts(&mut mesh, 8, SeamMask::ALL, 2.0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_detail_meshes() {
        let grass = MeshData::crossed_quads(1.0, 0.5);
        assert_eq!(grass.vertex_count(), 8);
        assert_eq!(grass.index_count(), 12);

        let rock = MeshData::octahedron(0.5);
        assert_eq!(rock.index_count(), 24);
        assert!(rock.normals.iter().all(|n| (n[0] * n[0] + n[1] * n[1] + n[2] * n[2] - 1.0).abs() < 1e-5));
    }
}
