//! Scene Database Tests
//!
//! Tests for:
//! - Allocating and deallocating every table, repeatedly
//! - Database-wide change detection and reset
//! - Cross-table queries: mesh model transforms and scene bounds
//! - Dangling cross-table references

use glam::{Mat4, Vec3};
use strata::assets::mesh_creation::cube;
use strata::assets::{MaterialParams, MeshFlags};
use strata::math::{Aabb, Transform};
use strata::scene::{SceneNodeId, SceneRootId};
use strata::{SceneCapacities, SceneDatabase};

const EPSILON: f32 = 1e-4;

fn database() -> SceneDatabase {
    let mut db = SceneDatabase::new();
    db.allocate(&SceneCapacities::default());
    db
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn allocate_reserves_requested_capacities() {
    let db = database();
    let capacities = SceneCapacities::default();
    assert!(db.scene_nodes.capacity() > capacities.scene_nodes as usize);
    assert!(db.cameras.capacity() > capacities.cameras as usize);
    assert!(db.textures.is_allocated());
    assert!(!db.has_changes());
}

#[test]
fn allocate_is_idempotent() {
    let mut db = database();
    let node = db.scene_nodes.create("Node", Transform::IDENTITY);
    db.allocate(&SceneCapacities {
        scene_nodes: 64,
        ..SceneCapacities::default()
    });
    assert!(db.scene_nodes.has(node));
    assert_eq!(db.scene_nodes.len(), 1);
}

#[test]
fn deallocate_then_allocate_starts_fresh() {
    let mut db = database();
    let node = db.scene_nodes.create("Node", Transform::IDENTITY);
    let material = db.materials.create("M", MaterialParams::default());

    db.deallocate();
    db.deallocate();
    assert!(!db.scene_nodes.is_allocated());
    assert!(!db.scene_nodes.has(node));
    assert!(!db.materials.has(material));
    assert!(!db.has_changes());

    db.allocate(&SceneCapacities::default());
    assert!(db.scene_nodes.is_empty());
    assert!(db.materials.is_empty());
}

// ============================================================================
// Changes
// ============================================================================

#[test]
fn any_table_change_is_a_database_change() {
    let mut db = database();
    db.cameras.create("Camera", SceneRootId::INVALID, Mat4::IDENTITY, Mat4::IDENTITY);
    assert!(db.has_changes());
    db.reset_change_notifications();
    assert!(!db.has_changes());

    db.renderers.create("Renderer", None);
    assert!(db.has_changes());
    assert!(db.cameras.get_changed().next().is_none());
    db.reset_change_notifications();
    assert!(!db.renderers.has_changes());
}

// ============================================================================
// Cross-table queries
// ============================================================================

#[test]
fn mesh_model_transform_follows_its_node() {
    let mut db = database();
    let parent = db.scene_nodes.create("Parent", Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    let node = db.scene_nodes.create("Node", Transform::from_translation(Vec3::X));
    db.scene_nodes.set_parent(node, parent);
    let mesh = cube(&mut db.meshes, 1, MeshFlags::POSITION);
    let material = db.materials.create("M", MaterialParams::default());
    let model = db.mesh_models.create(node, mesh, material);

    let transform = db.mesh_model_transform(model);
    assert!((transform.translation - Vec3::new(1.0, 2.0, 0.0)).length() < EPSILON);

    db.scene_nodes.destroy(node);
    assert_eq!(db.mesh_model_transform(model), Transform::IDENTITY);
}

#[test]
fn bounds_cover_models_below_the_root() {
    let mut db = database();
    let root = db.scene_roots.create("Scene", &mut db.scene_nodes, Vec3::ONE);
    let root_node = db.scene_roots.get_root_node(root);
    let mesh = cube(&mut db.meshes, 1, MeshFlags::POSITION);
    let material = db.materials.create("M", MaterialParams::default());

    let near = db.scene_nodes.create("Near", Transform::from_translation(Vec3::new(-2.0, 0.0, 0.0)));
    let far = db.scene_nodes.create("Far", Transform::from_translation(Vec3::new(0.0, 0.0, 6.0)));
    let outside = db.scene_nodes.create("Outside", Transform::from_translation(Vec3::splat(100.0)));
    db.scene_nodes.set_parent(near, root_node);
    db.scene_nodes.set_parent(far, near);
    db.mesh_models.create(near, mesh, material);
    db.mesh_models.create(far, mesh, material);
    db.mesh_models.create(outside, mesh, material);
    db.mesh_models.create(root_node, mesh, material);

    let bounds = db.compute_bounds(root_node);
    let expected = Aabb::new(Vec3::new(-2.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 6.5));
    assert!(bounds.contains(&expected, EPSILON));
    assert!(expected.contains(&bounds, EPSILON));
}

#[test]
fn bounds_of_empty_hierarchy_are_invalid() {
    let mut db = database();
    let node = db.scene_nodes.create("Empty", Transform::IDENTITY);
    assert!(!db.compute_bounds(node).is_valid());
    assert!(!db.compute_bounds(SceneNodeId::INVALID).is_valid());
}
