//! Scene Hierarchy Integration Tests
//!
//! Tests for:
//! - Parent / child / sibling links and traversal order
//! - Sentinel parenting and cycle rejection
//! - Destruction orphaning children
//! - Lazy global transforms and their propagation
//! - Random reparenting keeping the hierarchy acyclic and consistent
//! - The chainable node wrapper

use std::collections::HashSet;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use strata::EntityId;
use strata::math::Transform;
use strata::scene::{SceneNodeId, SceneNodes};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn nodes_with(count: usize) -> (SceneNodes, Vec<SceneNodeId>) {
    let mut nodes = SceneNodes::new();
    nodes.allocate(count as u32);
    let ids = (0..count).map(|i| nodes.create(format!("n{i}"), Transform::IDENTITY)).collect();
    (nodes, ids)
}

fn collect_all_children(nodes: &SceneNodes, id: SceneNodeId) -> Vec<SceneNodeId> {
    let mut visited = Vec::new();
    nodes.traverse_all_children(id, |child| visited.push(child));
    visited
}

// ============================================================================
// Links and traversal
// ============================================================================

#[test]
fn traversal_visits_every_descendant_once() {
    let (mut nodes, n) = nodes_with(7);
    for child in [n[0], n[4], n[6]] {
        nodes.set_parent(child, n[3]);
    }
    for child in [n[2], n[5]] {
        nodes.set_parent(child, n[4]);
    }
    nodes.set_parent(n[1], n[6]);

    let descendants = collect_all_children(&nodes, n[3]);
    assert_eq!(descendants.len(), 6);
    let unique: HashSet<SceneNodeId> = descendants.iter().copied().collect();
    let expected: HashSet<SceneNodeId> = [n[0], n[4], n[2], n[5], n[6], n[1]].into_iter().collect();
    assert_eq!(unique, expected);

    let mut graph = Vec::new();
    nodes.traverse_graph(n[3], |node| graph.push(node));
    assert_eq!(graph.len(), 7);
    assert_eq!(graph[0], n[3]);
    let graph: HashSet<SceneNodeId> = graph.into_iter().collect();
    assert!(graph.contains(&n[3]));
    assert!(expected.is_subset(&graph));
}

#[test]
fn children_are_listed_most_recent_first() {
    let (mut nodes, n) = nodes_with(4);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[0]);
    nodes.set_parent(n[3], n[0]);
    assert_eq!(nodes.get_children_ids(n[0]), vec![n[3], n[2], n[1]]);

    let mut direct = Vec::new();
    nodes.traverse_children(n[0], |child| direct.push(child));
    assert_eq!(direct, vec![n[3], n[2], n[1]]);
}

#[test]
fn pre_order_places_parents_before_children() {
    let (mut nodes, n) = nodes_with(4);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[1]);
    nodes.set_parent(n[3], n[2]);
    assert_eq!(collect_all_children(&nodes, n[0]), vec![n[1], n[2], n[3]]);
}

#[test]
fn reparenting_removes_from_old_sibling_list() {
    let (mut nodes, n) = nodes_with(4);
    nodes.set_parent(n[2], n[0]);
    nodes.set_parent(n[3], n[0]);
    nodes.set_parent(n[2], n[1]);

    assert_eq!(nodes.get_children_ids(n[0]), vec![n[3]]);
    assert_eq!(nodes.get_children_ids(n[1]), vec![n[2]]);
    assert_eq!(nodes.get_parent_id(n[2]), n[1]);
    assert!(nodes.has_child(n[1], n[2]));
    assert!(!nodes.has_child(n[0], n[2]));
}

#[test]
fn parenting_to_sentinel_makes_a_root() {
    let (mut nodes, n) = nodes_with(2);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[1], SceneNodeId::INVALID);

    assert!(nodes.is_root(n[1]));
    assert!(nodes.get_children_ids(n[0]).is_empty());
    assert!(nodes.get_children_ids(SceneNodeId::INVALID).is_empty());
}

#[test]
fn sentinel_cannot_be_parented() {
    let (mut nodes, n) = nodes_with(2);
    nodes.set_parent(SceneNodeId::INVALID, n[0]);

    assert!(nodes.get_children_ids(SceneNodeId::INVALID).is_empty());
    assert_eq!(nodes.get_parent_id(SceneNodeId::INVALID), SceneNodeId::INVALID);
    assert!(nodes.get_children_ids(n[0]).is_empty());
}

#[test]
fn cycles_are_rejected() {
    let (mut nodes, n) = nodes_with(3);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[1]);

    nodes.set_parent(n[0], n[2]);
    assert!(nodes.is_root(n[0]));
    nodes.set_parent(n[0], n[0]);
    assert!(nodes.is_root(n[0]));
    assert!(nodes.is_ancestor_of(n[0], n[2]));
    assert!(!nodes.is_ancestor_of(n[2], n[0]));
}

#[test]
fn parenting_under_dead_node_is_ignored() {
    let (mut nodes, n) = nodes_with(2);
    nodes.destroy(n[0]);
    nodes.set_parent(n[1], n[0]);
    assert!(nodes.is_root(n[1]));
}

#[test]
fn destroying_a_parent_orphans_its_children() {
    let (mut nodes, n) = nodes_with(4);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[1]);
    nodes.set_parent(n[3], n[1]);

    nodes.destroy(n[1]);
    assert!(!nodes.has(n[1]));
    assert!(nodes.is_root(n[2]));
    assert!(nodes.is_root(n[3]));
    assert!(nodes.get_children_ids(n[0]).is_empty());
    assert!(nodes.get_children_ids(n[1]).is_empty());
}

// ============================================================================
// Global transforms
// ============================================================================

#[test]
fn global_transform_composes_the_chain() {
    let (mut nodes, n) = nodes_with(3);
    nodes.set_local_transform(n[0], Transform::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, 2.0));
    nodes.set_local_transform(
        n[1],
        Transform::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), 1.0),
    );
    nodes.set_local_transform(n[2], Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[1]);

    // Lazily resolved before any update pass.
    let lazy = nodes.get_global_transform(n[2]);
    nodes.update_global_transforms();
    let cached = nodes.get_global_transform(n[2]);

    // n1 sits at (1, 2, 0); its rotation maps +X to -Z and n0 doubles the offset.
    let expected = Vec3::new(1.0, 2.0, -2.0);
    assert!(approx_eq(lazy.translation, expected));
    assert!(approx_eq(cached.translation, expected));
    assert!((cached.scale - 2.0).abs() < EPSILON);
}

#[test]
fn changing_a_parent_dirties_descendants() {
    let (mut nodes, n) = nodes_with(3);
    nodes.set_parent(n[1], n[0]);
    nodes.set_parent(n[2], n[1]);
    nodes.update_global_transforms();
    assert!(!nodes.is_global_transform_dirty(n[2]));

    nodes.set_local_transform(n[0], Transform::from_translation(Vec3::Y));
    assert!(nodes.is_global_transform_dirty(n[0]));
    assert!(nodes.is_global_transform_dirty(n[1]));
    assert!(nodes.is_global_transform_dirty(n[2]));

    nodes.update_global_transforms();
    assert!(!nodes.is_global_transform_dirty(n[2]));
    assert_eq!(nodes.pending_transform_updates(), 0);
    assert!(approx_eq(nodes.get_global_transform(n[2]).translation, Vec3::Y));
}

#[test]
fn repeated_writes_queue_one_pending_update() {
    let (mut nodes, n) = nodes_with(2);
    nodes.set_parent(n[1], n[0]);
    nodes.update_global_transforms();

    for step in 1..=100 {
        nodes.set_local_transform(n[0], Transform::from_translation(Vec3::X * step as f32));
        nodes.set_local_transform(n[1], Transform::from_translation(Vec3::Y * step as f32));
    }
    assert_eq!(nodes.pending_transform_updates(), 1);

    nodes.update_global_transforms();
    assert_eq!(nodes.pending_transform_updates(), 0);
    assert!(approx_eq(nodes.get_global_transform(n[1]).translation, Vec3::new(100.0, 100.0, 0.0)));
}

#[test]
fn moving_a_dirty_child_to_a_clean_parent_still_refreshes_it() {
    let (mut nodes, n) = nodes_with(3);
    nodes.set_local_transform(n[1], Transform::from_translation(Vec3::Z));
    nodes.set_parent(n[2], n[0]);
    nodes.update_global_transforms();

    // n2 is dirty only through n0, then leaves n0's subtree.
    nodes.set_local_transform(n[0], Transform::from_translation(Vec3::X));
    assert!(nodes.is_global_transform_dirty(n[2]));
    nodes.set_parent(n[2], n[1]);

    nodes.update_global_transforms();
    assert!(!nodes.is_global_transform_dirty(n[2]));
    assert!(approx_eq(nodes.get_global_transform(n[2]).translation, Vec3::Z));
}

#[test]
fn set_global_transform_accounts_for_parent() {
    let (mut nodes, n) = nodes_with(2);
    nodes.set_local_transform(n[0], Transform::new(Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY, 2.0));
    nodes.set_parent(n[1], n[0]);

    nodes.set_global_transform(n[1], Transform::from_translation(Vec3::new(1.0, 1.0, 1.0)));
    let global = nodes.get_global_transform(n[1]);
    assert!(approx_eq(global.translation, Vec3::new(1.0, 1.0, 1.0)));
    assert!((global.scale - 1.0).abs() < EPSILON);
    assert!(approx_eq(nodes.get_local_transform(n[1]).translation, Vec3::new(-2.0, 0.5, 0.5)));
}

#[test]
fn orphaned_children_keep_their_local_transform_as_global() {
    let (mut nodes, n) = nodes_with(2);
    nodes.set_local_transform(n[0], Transform::from_translation(Vec3::X * 3.0));
    nodes.set_local_transform(n[1], Transform::from_translation(Vec3::Z));
    nodes.set_parent(n[1], n[0]);
    nodes.update_global_transforms();
    assert!(approx_eq(nodes.get_global_transform(n[1]).translation, Vec3::new(3.0, 0.0, 1.0)));

    nodes.destroy(n[0]);
    nodes.update_global_transforms();
    assert!(approx_eq(nodes.get_global_transform(n[1]).translation, Vec3::Z));
}

#[test]
fn dead_node_reads_identity() {
    let (mut nodes, n) = nodes_with(1);
    nodes.set_local_transform(n[0], Transform::from_translation(Vec3::ONE));
    nodes.destroy(n[0]);
    assert_eq!(nodes.get_global_transform(n[0]), Transform::IDENTITY);
    assert_eq!(nodes.get_local_transform(n[0]), Transform::IDENTITY);
    assert_eq!(nodes.name(n[0]), "");
}

// ============================================================================
// Random hierarchy edits
// ============================================================================

#[test]
fn random_reparenting_keeps_hierarchy_consistent() {
    let mut rng = StdRng::seed_from_u64(0x71ee);
    let (mut nodes, ids) = nodes_with(32);

    for step in 0..2000 {
        let child = ids[rng.random_range(0..ids.len())];
        let parent = if rng.random_bool(0.1) {
            SceneNodeId::INVALID
        } else {
            ids[rng.random_range(0..ids.len())]
        };
        nodes.set_parent(child, parent);

        if step % 100 == 0 {
            nodes.update_global_transforms();
        }
    }

    for &id in &ids {
        // Walking up always terminates at a root within the node count.
        let mut current = id;
        let mut depth = 0;
        while !nodes.is_root(current) {
            current = nodes.get_parent_id(current);
            depth += 1;
            assert!(depth <= ids.len(), "cycle through {id}");
        }

        // Every child names `id` as its parent.
        for child in nodes.children(id) {
            assert_eq!(nodes.get_parent_id(child), id);
        }

        // And `id` appears exactly once among its parent's children.
        let parent = nodes.get_parent_id(id);
        if !parent.is_sentinel() {
            let count = nodes.children(parent).filter(|&c| c == id).count();
            assert_eq!(count, 1);
        }
    }
}

#[test]
fn random_edits_keep_cached_globals_consistent() {
    let mut rng = StdRng::seed_from_u64(42);
    let (mut nodes, ids) = nodes_with(16);

    for _ in 0..500 {
        let node = ids[rng.random_range(0..ids.len())];
        if rng.random_bool(0.5) {
            let offset = Vec3::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), 0.0);
            nodes.set_local_transform(node, Transform::from_translation(offset));
        } else {
            let parent = ids[rng.random_range(0..ids.len())];
            nodes.set_parent(node, parent);
        }
    }

    let lazy: Vec<Transform> = ids.iter().map(|&id| nodes.get_global_transform(id)).collect();
    nodes.update_global_transforms();
    for (&id, expected) in ids.iter().zip(&lazy) {
        assert!(!nodes.is_global_transform_dirty(id));
        assert!(approx_eq(nodes.get_global_transform(id).translation, expected.translation));

        // The cached global equals the explicit walk to the root.
        let mut walked = nodes.get_local_transform(id);
        let mut parent = nodes.get_parent_id(id);
        while !parent.is_sentinel() {
            walked = nodes.get_local_transform(parent).compose(&walked);
            parent = nodes.get_parent_id(parent);
        }
        assert!(approx_eq(nodes.get_global_transform(id).translation, walked.translation));
    }
}

// ============================================================================
// Wrapper
// ============================================================================

#[test]
fn wrapper_chains_edits() {
    let (mut nodes, n) = nodes_with(2);
    let id = nodes
        .node_mut(n[1])
        .set_parent(n[0])
        .set_translation(Vec3::new(0.0, 2.0, 0.0))
        .translate(Vec3::X)
        .set_scale(3.0)
        .set_name("child")
        .id();

    assert_eq!(id, n[1]);
    assert_eq!(nodes.name(n[1]), "child");
    let local = nodes.get_local_transform(n[1]);
    assert!(approx_eq(local.translation, Vec3::new(1.0, 2.0, 0.0)));
    assert!((local.scale - 3.0).abs() < EPSILON);
    assert!(nodes.has_child(n[0], n[1]));
}

#[test]
fn wrapper_look_at_points_forward_at_target() {
    let (mut nodes, n) = nodes_with(1);
    nodes.node_mut(n[0]).set_translation(Vec3::new(0.0, 0.0, 5.0)).look_at(Vec3::ZERO);
    let forward = nodes.get_local_transform(n[0]).forward();
    assert!(approx_eq(forward, Vec3::NEG_Z));
}

#[test]
fn wrapper_on_dead_node_is_a_no_op() {
    let (mut nodes, n) = nodes_with(1);
    nodes.destroy(n[0]);
    nodes.reset_change_notifications();
    nodes.node_mut(n[0]).set_translation(Vec3::ONE).rotate_y(1.0);
    assert!(!nodes.has_changes());
}
