//! The scene database.
//!
//! [`SceneDatabase`] owns one instance of every entity table. It is the
//! single world value the engine hands to its callbacks; tables reference
//! each other by ID only, so each can be borrowed independently through
//! the public fields.

use crate::assets::{Images, Materials, MeshModelId, MeshModels, Meshes, Textures};
use crate::math::{Aabb, Transform};
use crate::scene::{CameraId, Cameras, LightSources, RendererId, Renderers, SceneNodeId, SceneNodes, SceneRoots};

/// Initial capacities handed to [`SceneDatabase::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCapacities {
    pub cameras: u32,
    pub images: u32,
    pub light_sources: u32,
    pub materials: u32,
    pub meshes: u32,
    pub mesh_models: u32,
    pub renderers: u32,
    pub scene_nodes: u32,
    pub scene_roots: u32,
    pub textures: u32,
}

impl Default for SceneCapacities {
    fn default() -> Self {
        Self {
            cameras: 1,
            images: 8,
            light_sources: 8,
            materials: 8,
            meshes: 8,
            mesh_models: 8,
            renderers: 2,
            scene_nodes: 8,
            scene_roots: 1,
            textures: 8,
        }
    }
}

#[derive(Debug, Default)]
pub struct SceneDatabase {
    pub cameras: Cameras,
    pub images: Images,
    pub light_sources: LightSources,
    pub materials: Materials,
    pub meshes: Meshes,
    pub mesh_models: MeshModels,
    pub renderers: Renderers,
    pub scene_nodes: SceneNodes,
    pub scene_roots: SceneRoots,
    pub textures: Textures,
}

impl SceneDatabase {
    /// An unallocated database. Tables allocate on first use, but hosts are
    /// expected to call [`allocate`](Self::allocate) once at startup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates every table. Tables that are already allocated are left
    /// untouched.
    pub fn allocate(&mut self, capacities: &SceneCapacities) {
        self.cameras.allocate(capacities.cameras);
        self.images.allocate(capacities.images);
        self.light_sources.allocate(capacities.light_sources);
        self.materials.allocate(capacities.materials);
        self.meshes.allocate(capacities.meshes);
        self.mesh_models.allocate(capacities.mesh_models);
        self.renderers.allocate(capacities.renderers);
        self.scene_nodes.allocate(capacities.scene_nodes);
        self.scene_roots.allocate(capacities.scene_roots);
        self.textures.allocate(capacities.textures);
        log::debug!("Scene database allocated: {capacities:?}");
    }

    /// Drops all entities of every table.
    pub fn deallocate(&mut self) {
        self.cameras.deallocate();
        self.images.deallocate();
        self.light_sources.deallocate();
        self.materials.deallocate();
        self.meshes.deallocate();
        self.mesh_models.deallocate();
        self.renderers.deallocate();
        self.scene_nodes.deallocate();
        self.scene_roots.deallocate();
        self.textures.deallocate();
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.cameras.has_changes()
            || self.images.has_changes()
            || self.light_sources.has_changes()
            || self.materials.has_changes()
            || self.meshes.has_changes()
            || self.mesh_models.has_changes()
            || self.renderers.has_changes()
            || self.scene_nodes.has_changes()
            || self.scene_roots.has_changes()
            || self.textures.has_changes()
    }

    /// End-of-tick cleanup: clears every change stream and releases the
    /// indices destroyed during the tick.
    pub fn reset_change_notifications(&mut self) {
        self.cameras.reset_change_notifications();
        self.images.reset_change_notifications();
        self.light_sources.reset_change_notifications();
        self.materials.reset_change_notifications();
        self.meshes.reset_change_notifications();
        self.mesh_models.reset_change_notifications();
        self.renderers.reset_change_notifications();
        self.scene_nodes.reset_change_notifications();
        self.scene_roots.reset_change_notifications();
        self.textures.reset_change_notifications();
    }

    // ========================================================================
    // Cross-table queries
    // ========================================================================

    /// The renderer that draws `camera`: its assigned renderer while that
    /// one is live, otherwise the first renderer.
    #[must_use]
    pub fn camera_renderer(&self, camera: CameraId) -> RendererId {
        let assigned = self.cameras.get_renderer_id(camera);
        if self.renderers.has(assigned) {
            assigned
        } else {
            self.renderers.first()
        }
    }

    /// Global transform of the scene node a mesh model is attached to.
    ///
    /// Dangling references resolve to the identity.
    #[must_use]
    pub fn mesh_model_transform(&self, model: MeshModelId) -> Transform {
        let node = self.mesh_models.get_scene_node_id(model);
        if self.scene_nodes.has(node) {
            self.scene_nodes.get_global_transform(node)
        } else {
            Transform::IDENTITY
        }
    }

    /// World-space bounds of every mesh model below `root`, including models
    /// attached to `root` itself.
    #[must_use]
    pub fn compute_bounds(&self, root: SceneNodeId) -> Aabb {
        self.mesh_models
            .get_iterable()
            .filter(|&model| {
                let node = self.mesh_models.get_scene_node_id(model);
                node == root || self.scene_nodes.is_ancestor_of(root, node)
            })
            .fold(Aabb::INVALID, |bounds, model| {
                let mesh = self.mesh_models.get_mesh_id(model);
                let local = self.meshes.get_bounds(mesh);
                if local.is_valid() {
                    bounds.union(&local.transform(&self.mesh_model_transform(model)))
                } else {
                    bounds
                }
            })
    }
}
