//! Scene roots.
//!
//! A scene root anchors one renderable scene: it owns the root scene node
//! of the scene's hierarchy and describes the environment lighting, either
//! a solid tint or a latitude-longitude environment texture modulated by
//! the tint.

use glam::Vec3;

use crate::assets::texture::TextureId;
use crate::core::id::EntityId;
use crate::core::table::{Columns, Table};
use crate::math::Transform;
use crate::scene::node::{SceneNodeId, SceneNodes};

crate::define_id! {
    /// Identifies a scene root.
    pub struct SceneRootId;
}

crate::change_flags! {
    pub struct SceneRootChanges {
        const ENVIRONMENT = 1 << 2;
    }
}

#[derive(Debug, Default)]
pub struct SceneRootData {
    names: Vec<String>,
    root_nodes: Vec<SceneNodeId>,
    environment_tints: Vec<Vec3>,
    environment_maps: Vec<TextureId>,
}

impl Columns for SceneRootData {
    type Id = SceneRootId;
    type Changes = SceneRootChanges;
    const NAME: &'static str = "SceneRoots";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.root_nodes.resize(capacity, SceneNodeId::INVALID);
        self.environment_tints.resize(capacity, Vec3::ZERO);
        self.environment_maps.resize(capacity, TextureId::INVALID);
    }
}

pub type SceneRoots = Table<SceneRootData>;

impl Table<SceneRootData> {
    /// Creates a scene root together with its root scene node.
    pub fn create(&mut self, name: impl Into<String>, nodes: &mut SceneNodes, environment_tint: Vec3) -> SceneRootId {
        let name = name.into();
        let root_node = nodes.create(name.clone(), Transform::IDENTITY);
        if root_node.is_sentinel() {
            return SceneRootId::INVALID;
        }

        let Some((id, index)) = self.acquire() else {
            nodes.destroy(root_node);
            return SceneRootId::INVALID;
        };
        let c = &mut self.columns;
        c.names[index] = name;
        c.root_nodes[index] = root_node;
        c.environment_tints[index] = environment_tint;
        c.environment_maps[index] = TextureId::INVALID;
        id
    }

    /// Creates a scene root lit by an environment texture.
    pub fn create_with_environment_map(
        &mut self,
        name: impl Into<String>,
        nodes: &mut SceneNodes,
        environment_map: TextureId,
        environment_tint: Vec3,
    ) -> SceneRootId {
        let id = self.create(name, nodes, environment_tint);
        if let Some(index) = self.slot(id) {
            self.columns.environment_maps[index] = environment_map;
        }
        id
    }

    /// Destroys the scene root. The root scene node is left to the caller.
    pub fn destroy(&mut self, id: SceneRootId) {
        self.release(id);
    }

    #[must_use]
    pub fn name(&self, id: SceneRootId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_root_node(&self, id: SceneRootId) -> SceneNodeId {
        self.columns.root_nodes[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_environment_tint(&self, id: SceneRootId) -> Vec3 {
        self.columns.environment_tints[self.slot_or_dummy(id)]
    }

    pub fn set_environment_tint(&mut self, id: SceneRootId, tint: Vec3) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.environment_tints[index] = tint;
            self.flag(index, SceneRootChanges::ENVIRONMENT);
        }
    }

    /// The environment texture, or the sentinel for tint-only environments.
    #[must_use]
    pub fn get_environment_map(&self, id: SceneRootId) -> TextureId {
        self.columns.environment_maps[self.slot_or_dummy(id)]
    }

    pub fn set_environment_map(&mut self, id: SceneRootId, environment_map: TextureId) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.environment_maps[index] = environment_map;
            self.flag(index, SceneRootChanges::ENVIRONMENT);
        }
    }

    /// The scene root whose hierarchy has `root_node` at the top.
    #[must_use]
    pub fn find_by_root_node(&self, root_node: SceneNodeId) -> SceneRootId {
        self.get_iterable()
            .find(|id| self.columns.root_nodes[id.index()] == root_node)
            .unwrap_or(SceneRootId::INVALID)
    }
}
