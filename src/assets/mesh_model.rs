//! Mesh models bind a scene node to a mesh and a material.
//!
//! References are stored as IDs and validated on read by the database; a
//! model whose mesh or material has been destroyed stays alive but is
//! inert until someone destroys it.

use crate::assets::material::MaterialId;
use crate::assets::mesh::MeshId;
use crate::core::table::{Columns, Table};
use crate::scene::node::SceneNodeId;

crate::define_id! {
    /// Identifies a mesh model.
    pub struct MeshModelId;
}

crate::change_flags! {
    pub struct MeshModelChanges {
        const MATERIAL = 1 << 2;
        const MESH = 1 << 3;
    }
}

#[derive(Debug, Default)]
pub struct MeshModelData {
    scene_nodes: Vec<SceneNodeId>,
    meshes: Vec<MeshId>,
    materials: Vec<MaterialId>,
}

impl Columns for MeshModelData {
    type Id = MeshModelId;
    type Changes = MeshModelChanges;
    const NAME: &'static str = "MeshModels";

    fn resize(&mut self, capacity: usize) {
        self.scene_nodes.resize(capacity, SceneNodeId::INVALID);
        self.meshes.resize(capacity, MeshId::INVALID);
        self.materials.resize(capacity, MaterialId::INVALID);
    }
}

pub type MeshModels = Table<MeshModelData>;

impl Table<MeshModelData> {
    pub fn create(&mut self, scene_node: SceneNodeId, mesh: MeshId, material: MaterialId) -> MeshModelId {
        let Some((id, index)) = self.acquire() else {
            return MeshModelId::INVALID;
        };
        self.columns.scene_nodes[index] = scene_node;
        self.columns.meshes[index] = mesh;
        self.columns.materials[index] = material;
        id
    }

    /// Destroys the model only; its node, mesh and material are untouched.
    pub fn destroy(&mut self, id: MeshModelId) {
        self.release(id);
    }

    #[must_use]
    pub fn get_scene_node_id(&self, id: MeshModelId) -> SceneNodeId {
        self.columns.scene_nodes[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_mesh_id(&self, id: MeshModelId) -> MeshId {
        self.columns.meshes[self.slot_or_dummy(id)]
    }

    pub fn set_mesh_id(&mut self, id: MeshModelId, mesh: MeshId) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.meshes[index] = mesh;
            self.flag(index, MeshModelChanges::MESH);
        }
    }

    #[must_use]
    pub fn get_material_id(&self, id: MeshModelId) -> MaterialId {
        self.columns.materials[self.slot_or_dummy(id)]
    }

    pub fn set_material_id(&mut self, id: MeshModelId, material: MaterialId) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.materials[index] = material;
            self.flag(index, MeshModelChanges::MATERIAL);
        }
    }
}
