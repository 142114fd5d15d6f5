//! Scene nodes and the transform hierarchy.
//!
//! The hierarchy is a forest encoded with three per-node links: `parent`,
//! `first_child` and `next_sibling`. A node is a root iff its parent is the
//! sentinel. New children are linked at the head of their parent's sibling
//! list, so traversals visit the most recently attached child first.
//!
//! # Global transforms
//!
//! Each node caches its global transform together with a dirty bit. Writing
//! a local transform or reparenting marks the node's subtree dirty, stopping
//! at nodes that are already dirty, which keeps the invariant
//! "a dirty node has only dirty descendants". Reads never mutate: a dirty
//! node's global transform is recomposed from its nearest clean ancestor.
//! [`update_global_transforms`](SceneNodes::update_global_transforms) then
//! refreshes the caches, visiting only the subtrees dirtied since the last
//! update.

use smallvec::SmallVec;

use crate::core::id::EntityId;
use crate::core::table::{Columns, Table};
use crate::errors::{Result, StrataError};
use crate::math::Transform;

crate::define_id! {
    /// Identifies a scene node.
    pub struct SceneNodeId;
}

crate::change_flags! {
    pub struct SceneNodeChanges {
        const TRANSFORM = 1 << 2;
        const PARENT = 1 << 3;
    }
}

#[derive(Debug, Default)]
pub struct SceneNodeData {
    names: Vec<String>,
    local_transforms: Vec<Transform>,
    global_transforms: Vec<Transform>,
    global_dirty: Vec<bool>,
    parents: Vec<SceneNodeId>,
    first_children: Vec<SceneNodeId>,
    next_siblings: Vec<SceneNodeId>,
    // Tops of subtrees dirtied since the last update.
    pending_dirty: Vec<SceneNodeId>,
}

impl Columns for SceneNodeData {
    type Id = SceneNodeId;
    type Changes = SceneNodeChanges;
    const NAME: &'static str = "SceneNodes";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.local_transforms.resize(capacity, Transform::IDENTITY);
        self.global_transforms.resize(capacity, Transform::IDENTITY);
        self.global_dirty.resize(capacity, false);
        self.parents.resize(capacity, SceneNodeId::INVALID);
        self.first_children.resize(capacity, SceneNodeId::INVALID);
        self.next_siblings.resize(capacity, SceneNodeId::INVALID);
    }
}

pub type SceneNodes = Table<SceneNodeData>;

/// Iterator over the direct children of a node, in sibling order.
pub struct Children<'a> {
    next_siblings: &'a [SceneNodeId],
    next: SceneNodeId,
}

impl Iterator for Children<'_> {
    type Item = SceneNodeId;

    fn next(&mut self) -> Option<SceneNodeId> {
        if self.next.is_sentinel() {
            return None;
        }
        let current = self.next;
        self.next = self.next_siblings[current.index()];
        Some(current)
    }
}

type NodeStack = SmallVec<[SceneNodeId; 32]>;

impl Table<SceneNodeData> {
    // ========================================================================
    // Creation & destruction
    // ========================================================================

    /// Creates a root node. Returns the sentinel if the table is full.
    pub fn create(&mut self, name: impl Into<String>, transform: Transform) -> SceneNodeId {
        let Some((id, index)) = self.acquire() else {
            return SceneNodeId::INVALID;
        };

        let c = &mut self.columns;
        c.names[index] = name.into();
        c.local_transforms[index] = transform;
        c.global_transforms[index] = transform;
        c.global_dirty[index] = false;
        c.parents[index] = SceneNodeId::INVALID;
        c.first_children[index] = SceneNodeId::INVALID;
        c.next_siblings[index] = SceneNodeId::INVALID;
        id
    }

    /// Like [`create`](Self::create) but reports exhaustion as an error.
    pub fn try_create(&mut self, name: impl Into<String>, transform: Transform) -> Result<SceneNodeId> {
        let id = self.create(name, transform);
        if id.is_sentinel() {
            return Err(StrataError::CapacityExhausted {
                table: SceneNodeData::NAME,
            });
        }
        Ok(id)
    }

    /// Destroys `id`. Its children are not destroyed; they become roots.
    pub fn destroy(&mut self, id: SceneNodeId) {
        if !self.has(id) {
            return;
        }

        self.unlink(id);

        let orphans: NodeStack = self.children(id).collect();
        for child in orphans {
            let child_index = child.index();
            self.columns.parents[child_index] = SceneNodeId::INVALID;
            self.columns.next_siblings[child_index] = SceneNodeId::INVALID;
            self.flag(child_index, SceneNodeChanges::PARENT);
            self.mark_moved_subtree_dirty(child);
        }

        let index = id.index();
        self.columns.first_children[index] = SceneNodeId::INVALID;
        self.columns.global_dirty[index] = false;
        self.release(id);
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    #[must_use]
    pub fn name(&self, id: SceneNodeId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    pub fn set_name(&mut self, id: SceneNodeId, name: impl Into<String>) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.names[index] = name.into();
        }
    }

    #[must_use]
    pub fn get_local_transform(&self, id: SceneNodeId) -> Transform {
        self.columns.local_transforms[self.slot_or_dummy(id)]
    }

    /// Writes the local transform. Writing an equal value is not a change.
    pub fn set_local_transform(&mut self, id: SceneNodeId, transform: Transform) {
        let Some(index) = self.slot_for_write(id) else {
            return;
        };
        if self.columns.local_transforms[index] == transform {
            return;
        }
        self.columns.local_transforms[index] = transform;
        self.flag(index, SceneNodeChanges::TRANSFORM);
        self.mark_subtree_dirty(id);
    }

    /// The node's transform relative to its root.
    #[must_use]
    pub fn get_global_transform(&self, id: SceneNodeId) -> Transform {
        let Some(index) = self.slot(id) else {
            return Transform::IDENTITY;
        };
        let c = &self.columns;
        if !c.global_dirty[index] {
            return c.global_transforms[index];
        }

        // Walk up to the nearest clean ancestor, then compose back down.
        let mut chain: SmallVec<[usize; 16]> = SmallVec::new();
        let mut current = index;
        let mut global = Transform::IDENTITY;
        loop {
            if !c.global_dirty[current] {
                global = c.global_transforms[current];
                break;
            }
            chain.push(current);
            let parent = c.parents[current];
            if parent.is_sentinel() {
                break;
            }
            current = parent.index();
        }

        for &node in chain.iter().rev() {
            global = global.compose(&c.local_transforms[node]);
        }
        global
    }

    /// Sets the local transform so that the global transform becomes `transform`.
    pub fn set_global_transform(&mut self, id: SceneNodeId, transform: Transform) {
        if !self.has(id) {
            return;
        }
        let parent = self.get_parent_id(id);
        let local = if parent.is_sentinel() {
            transform
        } else {
            self.get_global_transform(parent).inverse().compose(&transform)
        };
        self.set_local_transform(id, local);
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[must_use]
    pub fn get_parent_id(&self, id: SceneNodeId) -> SceneNodeId {
        self.columns.parents[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn is_root(&self, id: SceneNodeId) -> bool {
        self.has(id) && self.get_parent_id(id).is_sentinel()
    }

    /// Moves `child` under `parent`, or makes it a root when `parent` is the
    /// sentinel.
    ///
    /// Reparenting a dead node, reparenting under a dead node, and any move
    /// that would create a cycle are ignored.
    pub fn set_parent(&mut self, child: SceneNodeId, parent: SceneNodeId) {
        let Some(child_index) = self.slot_for_write(child) else {
            return;
        };
        if !parent.is_sentinel() && !self.has(parent) {
            log::trace!("SceneNodes: ignoring reparent of {child} under dead {parent}");
            return;
        }
        if parent == child || self.is_ancestor_of(child, parent) {
            log::debug!("SceneNodes: ignoring reparent of {child} under its own descendant {parent}");
            return;
        }
        if self.columns.parents[child_index] == parent {
            return;
        }

        self.unlink(child);

        let c = &mut self.columns;
        c.parents[child_index] = parent;
        if !parent.is_sentinel() {
            let parent_index = parent.index();
            c.next_siblings[child_index] = c.first_children[parent_index];
            c.first_children[parent_index] = child;
        }

        self.flag(child_index, SceneNodeChanges::PARENT);
        self.mark_moved_subtree_dirty(child);
    }

    /// True if `node` is a direct child of `parent`.
    #[must_use]
    pub fn has_child(&self, parent: SceneNodeId, node: SceneNodeId) -> bool {
        self.has(parent) && self.has(node) && self.get_parent_id(node) == parent
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: SceneNodeId, node: SceneNodeId) -> bool {
        if !self.has(ancestor) {
            return false;
        }
        let mut current = self.get_parent_id(node);
        while !current.is_sentinel() {
            if current == ancestor {
                return true;
            }
            current = self.columns.parents[current.index()];
        }
        false
    }

    /// Direct children of `id` in sibling order. Empty for dead IDs.
    pub fn children(&self, id: SceneNodeId) -> Children<'_> {
        Children {
            next_siblings: &self.columns.next_siblings,
            next: self.columns.first_children[self.slot_or_dummy(id)],
        }
    }

    #[must_use]
    pub fn get_children_ids(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        self.children(id).collect()
    }

    /// Visits the direct children of `id`.
    pub fn traverse_children(&self, id: SceneNodeId, mut visit: impl FnMut(SceneNodeId)) {
        for child in self.children(id) {
            visit(child);
        }
    }

    /// Visits every descendant of `id` in pre-order, excluding `id` itself.
    pub fn traverse_all_children(&self, id: SceneNodeId, mut visit: impl FnMut(SceneNodeId)) {
        let c = &self.columns;
        let mut stack = NodeStack::new();
        let first = c.first_children[self.slot_or_dummy(id)];
        if !first.is_sentinel() {
            stack.push(first);
        }

        while let Some(node) = stack.pop() {
            visit(node);
            let index = node.index();
            let sibling = c.next_siblings[index];
            if !sibling.is_sentinel() {
                stack.push(sibling);
            }
            let child = c.first_children[index];
            if !child.is_sentinel() {
                stack.push(child);
            }
        }
    }

    /// Visits `id` and then all of its descendants in pre-order.
    pub fn traverse_graph(&self, id: SceneNodeId, mut visit: impl FnMut(SceneNodeId)) {
        if !self.has(id) {
            return;
        }
        visit(id);
        self.traverse_all_children(id, visit);
    }

    fn unlink(&mut self, child: SceneNodeId) {
        let c = &mut self.columns;
        let child_index = child.index();
        let parent = c.parents[child_index];
        if parent.is_sentinel() {
            return;
        }

        let next = c.next_siblings[child_index];
        let parent_index = parent.index();
        if c.first_children[parent_index] == child {
            c.first_children[parent_index] = next;
        } else {
            let mut sibling = c.first_children[parent_index];
            while !sibling.is_sentinel() {
                let sibling_index = sibling.index();
                if c.next_siblings[sibling_index] == child {
                    c.next_siblings[sibling_index] = next;
                    break;
                }
                sibling = c.next_siblings[sibling_index];
            }
        }

        c.parents[child_index] = SceneNodeId::INVALID;
        c.next_siblings[child_index] = SceneNodeId::INVALID;
    }

    // ========================================================================
    // Global transform maintenance
    // ========================================================================

    /// Dirties a subtree that was just moved. The pending entry that covered
    /// a dirty node may no longer reach it from the new position.
    fn mark_moved_subtree_dirty(&mut self, id: SceneNodeId) {
        if self.columns.global_dirty[id.index()] {
            self.columns.pending_dirty.push(id);
        } else {
            self.mark_subtree_dirty(id);
        }
    }

    fn mark_subtree_dirty(&mut self, id: SceneNodeId) {
        let c = &mut self.columns;
        // A dirty node is already reachable from a pending entry.
        if c.global_dirty[id.index()] {
            return;
        }
        c.pending_dirty.push(id);

        let mut stack = NodeStack::new();
        stack.push(id);
        while let Some(node) = stack.pop() {
            let index = node.index();
            if c.global_dirty[index] {
                continue;
            }
            c.global_dirty[index] = true;

            let mut child = c.first_children[index];
            while !child.is_sentinel() {
                stack.push(child);
                child = c.next_siblings[child.index()];
            }
        }
    }

    /// Number of subtrees waiting for [`update_global_transforms`](Self::update_global_transforms).
    #[must_use]
    pub fn pending_transform_updates(&self) -> usize {
        self.columns.pending_dirty.len()
    }

    /// Refreshes every stale cached global transform.
    ///
    /// Work is proportional to the size of the subtrees dirtied since the
    /// previous call, not to the size of the hierarchy.
    pub fn update_global_transforms(&mut self) {
        let mut pending = std::mem::take(&mut self.columns.pending_dirty);

        for &id in &pending {
            if !self.has(id) || !self.columns.global_dirty[id.index()] {
                continue;
            }

            // Start from the topmost dirty ancestor so parents update first.
            let mut top = id;
            loop {
                let parent = self.columns.parents[top.index()];
                if parent.is_sentinel() || !self.columns.global_dirty[parent.index()] {
                    break;
                }
                top = parent;
            }

            let parent = self.columns.parents[top.index()];
            let parent_global = if parent.is_sentinel() {
                Transform::IDENTITY
            } else {
                self.columns.global_transforms[parent.index()]
            };
            self.update_subtree(top, parent_global);
        }

        // Keep the allocation for the next tick.
        pending.clear();
        self.columns.pending_dirty = pending;
    }

    fn update_subtree(&mut self, top: SceneNodeId, parent_global: Transform) {
        let c = &mut self.columns;
        let mut stack: SmallVec<[(SceneNodeId, Transform); 32]> = SmallVec::new();
        stack.push((top, parent_global));

        while let Some((node, parent_global)) = stack.pop() {
            let index = node.index();
            if !c.global_dirty[index] {
                continue;
            }
            let global = parent_global.compose(&c.local_transforms[index]);
            c.global_transforms[index] = global;
            c.global_dirty[index] = false;

            let mut child = c.first_children[index];
            while !child.is_sentinel() {
                stack.push((child, global));
                child = c.next_siblings[child.index()];
            }
        }
    }

    /// True if the cached global transform of `id` is stale.
    #[must_use]
    pub fn is_global_transform_dirty(&self, id: SceneNodeId) -> bool {
        self.columns.global_dirty[self.slot_or_dummy(id)]
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::core::id::{IdAllocator, MAX_IDS};

    fn nodes() -> SceneNodes {
        let mut nodes = SceneNodes::new();
        nodes.allocate(8);
        nodes
    }

    #[test]
    fn dirty_marking_stops_at_dirty_nodes() {
        let mut nodes = nodes();
        let a = nodes.create("a", Transform::IDENTITY);
        let b = nodes.create("b", Transform::IDENTITY);
        nodes.set_parent(b, a);
        assert!(nodes.is_global_transform_dirty(a) || nodes.is_global_transform_dirty(b));

        nodes.update_global_transforms();
        assert!(!nodes.is_global_transform_dirty(a));
        assert!(!nodes.is_global_transform_dirty(b));

        nodes.set_local_transform(a, Transform::from_translation(Vec3::X));
        assert!(nodes.is_global_transform_dirty(a));
        assert!(nodes.is_global_transform_dirty(b));
    }

    #[test]
    fn update_processes_parents_before_children() {
        let mut nodes = nodes();
        let a = nodes.create("a", Transform::IDENTITY);
        let b = nodes.create("b", Transform::IDENTITY);
        nodes.set_parent(b, a);
        nodes.update_global_transforms();

        // Child first, then parent: both pending, child must see the new parent.
        nodes.set_local_transform(b, Transform::from_translation(Vec3::Y));
        nodes.set_local_transform(a, Transform::from_translation(Vec3::X));
        nodes.update_global_transforms();

        assert_eq!(nodes.pending_transform_updates(), 0);
        assert_eq!(nodes.get_global_transform(b).translation, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn try_create_reports_exhausted_index_space() {
        let mut nodes = nodes();

        // Swap in an allocator with every index taken; columns are never touched.
        let mut full = IdAllocator::<SceneNodeId>::new(MAX_IDS);
        while !full.generate().is_sentinel() {}
        nodes.ids = full;

        assert_eq!(
            nodes.try_create("overflow", Transform::IDENTITY),
            Err(StrataError::CapacityExhausted { table: "SceneNodes" })
        );
        assert!(nodes.create("overflow", Transform::IDENTITY).is_sentinel());
        assert_eq!(nodes.len(), MAX_IDS as usize);
    }

    #[test]
    fn reparented_dirty_node_is_still_refreshed() {
        let mut nodes = nodes();
        let a = nodes.create("a", Transform::from_translation(Vec3::X));
        let b = nodes.create("b", Transform::from_translation(Vec3::Z));
        let c = nodes.create("c", Transform::IDENTITY);
        nodes.set_parent(c, a);
        nodes.set_parent(c, b);
        nodes.update_global_transforms();

        assert!(!nodes.is_global_transform_dirty(c));
        assert_eq!(nodes.get_global_transform(c).translation, Vec3::Z);
    }
}
