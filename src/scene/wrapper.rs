//! Chainable scene node operations.
//!
//! [`SceneNodeMut`] borrows the node table mutably and provides a fluent
//! API for building hierarchies and posing nodes. Every method silently
//! no-ops when the ID is dead, matching the tables' own write policy.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use strata::math::Transform;
//! use strata::scene::SceneNodes;
//!
//! let mut nodes = SceneNodes::new();
//! nodes.allocate(4);
//! let root = nodes.create("root", Transform::IDENTITY);
//! let child = nodes.create("child", Transform::IDENTITY);
//!
//! nodes.node_mut(child)
//!     .set_parent(root)
//!     .set_translation(Vec3::new(0.0, 3.0, 0.0))
//!     .set_scale(2.0)
//!     .look_at(Vec3::ZERO);
//!
//! assert!(nodes.has_child(root, child));
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::{Quat, Vec3};

use crate::math::Transform;
use crate::scene::node::{SceneNodeId, SceneNodes};

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct SceneNodeMut<'a> {
    nodes: &'a mut SceneNodes,
    id: SceneNodeId,
}

impl SceneNodes {
    /// Chainable access to the node `id`.
    #[inline]
    pub fn node_mut(&mut self, id: SceneNodeId) -> SceneNodeMut<'_> {
        SceneNodeMut { nodes: self, id }
    }
}

impl SceneNodeMut<'_> {
    #[inline]
    #[must_use]
    pub fn id(&self) -> SceneNodeId {
        self.id
    }

    fn update_local(self, update: impl FnOnce(&mut Transform)) -> Self {
        let mut transform = self.nodes.get_local_transform(self.id);
        update(&mut transform);
        self.nodes.set_local_transform(self.id, transform);
        self
    }

    #[inline]
    pub fn set_local_transform(self, transform: Transform) -> Self {
        self.nodes.set_local_transform(self.id, transform);
        self
    }

    #[inline]
    pub fn set_global_transform(self, transform: Transform) -> Self {
        self.nodes.set_global_transform(self.id, transform);
        self
    }

    #[inline]
    pub fn set_translation(self, translation: Vec3) -> Self {
        self.update_local(|t| t.translation = translation)
    }

    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        self.update_local(|t| t.translation += offset)
    }

    #[inline]
    pub fn set_rotation(self, rotation: Quat) -> Self {
        self.update_local(|t| t.rotation = rotation)
    }

    /// Rotates around the local Y axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_y(self, angle: f32) -> Self {
        self.update_local(|t| t.rotation = (t.rotation * Quat::from_rotation_y(angle)).normalize())
    }

    /// Rotates around the local X axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_x(self, angle: f32) -> Self {
        self.update_local(|t| t.rotation = (t.rotation * Quat::from_rotation_x(angle)).normalize())
    }

    #[inline]
    pub fn set_scale(self, scale: f32) -> Self {
        self.update_local(|t| t.scale = scale)
    }

    /// Orients the node to face `target` (in parent space).
    #[inline]
    pub fn look_at(self, target: Vec3) -> Self {
        self.update_local(|t| t.look_at(target, Vec3::Y))
    }

    #[inline]
    pub fn set_parent(self, parent: SceneNodeId) -> Self {
        self.nodes.set_parent(self.id, parent);
        self
    }

    #[inline]
    pub fn set_name(self, name: impl Into<String>) -> Self {
        self.nodes.set_name(self.id, name);
        self
    }
}
