//! Meshes.
//!
//! A mesh is an indexed triangle list with optional per-vertex buffers.
//! Which buffers are present is described by [`MeshFlags`]; two meshes
//! with the same flags share a vertex layout and can be combined.

use glam::{UVec3, Vec2, Vec3, Vec4};

use crate::core::table::{Columns, Table};
use crate::math::Aabb;

crate::define_id! {
    /// Identifies a mesh.
    pub struct MeshId;
}

crate::change_flags! {
    pub struct MeshChanges {
        const BOUNDS = 1 << 2;
    }
}

bitflags::bitflags! {
    /// The per-vertex buffers a mesh carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MeshFlags: u8 {
        const POSITION = 1 << 0;
        const NORMAL = 1 << 1;
        const TEXCOORD = 1 << 2;
        const TANGENT = 1 << 3;
        const ALL_BUFFERS = Self::POSITION.bits() | Self::NORMAL.bits() | Self::TEXCOORD.bits() | Self::TANGENT.bits();
    }
}

/// CPU-side geometry of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub primitives: Vec<UVec3>,
    pub positions: Option<Vec<Vec3>>,
    pub normals: Option<Vec<Vec3>>,
    /// Tangents with the bitangent sign in `w`.
    pub tangents: Option<Vec<Vec4>>,
    pub texcoords: Option<Vec<Vec2>>,
    vertex_count: usize,
}

impl Mesh {
    /// Zero-initialized buffers for `primitive_count` triangles and
    /// `vertex_count` vertices.
    #[must_use]
    pub fn new(primitive_count: usize, vertex_count: usize, flags: MeshFlags) -> Self {
        Self {
            primitives: vec![UVec3::ZERO; primitive_count],
            positions: flags.contains(MeshFlags::POSITION).then(|| vec![Vec3::ZERO; vertex_count]),
            normals: flags.contains(MeshFlags::NORMAL).then(|| vec![Vec3::ZERO; vertex_count]),
            tangents: flags.contains(MeshFlags::TANGENT).then(|| vec![Vec4::ZERO; vertex_count]),
            texcoords: flags.contains(MeshFlags::TEXCOORD).then(|| vec![Vec2::ZERO; vertex_count]),
            vertex_count,
        }
    }

    #[must_use]
    pub fn flags(&self) -> MeshFlags {
        let mut flags = MeshFlags::empty();
        flags.set(MeshFlags::POSITION, self.positions.is_some());
        flags.set(MeshFlags::NORMAL, self.normals.is_some());
        flags.set(MeshFlags::TANGENT, self.tangents.is_some());
        flags.set(MeshFlags::TEXCOORD, self.texcoords.is_some());
        flags
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.primitives.len() * 3
    }

    /// Bounds of the position buffer. Invalid when there are no positions.
    #[must_use]
    pub fn compute_bounds(&self) -> Aabb {
        self.positions
            .as_deref()
            .map_or(Aabb::INVALID, Aabb::from_points)
    }
}

#[derive(Debug, Default)]
pub struct MeshData {
    names: Vec<String>,
    meshes: Vec<Mesh>,
    bounds: Vec<Aabb>,
}

impl Columns for MeshData {
    type Id = MeshId;
    type Changes = MeshChanges;
    const NAME: &'static str = "Meshes";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.meshes.resize_with(capacity, Mesh::default);
        self.bounds.resize(capacity, Aabb::INVALID);
    }
}

pub type Meshes = Table<MeshData>;

impl Table<MeshData> {
    /// Creates a mesh with zeroed buffers. Bounds start out invalid; fill the
    /// buffers through [`get_mesh_mut`](Self::get_mesh_mut) and then call
    /// [`compute_bounds`](Self::compute_bounds) or [`set_bounds`](Self::set_bounds).
    pub fn create(
        &mut self,
        name: impl Into<String>,
        primitive_count: usize,
        vertex_count: usize,
        flags: MeshFlags,
    ) -> MeshId {
        self.create_from(name, Mesh::new(primitive_count, vertex_count, flags), Aabb::INVALID)
    }

    /// Stores an already built mesh.
    pub fn create_from(&mut self, name: impl Into<String>, mesh: Mesh, bounds: Aabb) -> MeshId {
        let Some((id, index)) = self.acquire() else {
            return MeshId::INVALID;
        };
        self.columns.names[index] = name.into();
        self.columns.meshes[index] = mesh;
        self.columns.bounds[index] = bounds;
        id
    }

    /// Destroys the mesh and releases its buffers.
    pub fn destroy(&mut self, id: MeshId) {
        if let Some(index) = self.release(id) {
            self.columns.meshes[index] = Mesh::default();
        }
    }

    #[must_use]
    pub fn name(&self, id: MeshId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    /// The mesh geometry; the empty dummy mesh for dead IDs.
    #[must_use]
    pub fn get_mesh(&self, id: MeshId) -> &Mesh {
        &self.columns.meshes[self.slot_or_dummy(id)]
    }

    pub fn get_mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        let index = self.slot_for_write(id)?;
        Some(&mut self.columns.meshes[index])
    }

    #[must_use]
    pub fn get_bounds(&self, id: MeshId) -> Aabb {
        self.columns.bounds[self.slot_or_dummy(id)]
    }

    pub fn set_bounds(&mut self, id: MeshId, bounds: Aabb) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.bounds[index] = bounds;
            self.flag(index, MeshChanges::BOUNDS);
        }
    }

    /// Recomputes the bounds from the positions and returns them.
    pub fn compute_bounds(&mut self, id: MeshId) -> Aabb {
        let Some(index) = self.slot_for_write(id) else {
            return Aabb::INVALID;
        };
        let bounds = self.columns.meshes[index].compute_bounds();
        self.columns.bounds[index] = bounds;
        self.flag(index, MeshChanges::BOUNDS);
        bounds
    }
}
