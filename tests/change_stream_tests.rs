//! Change Notification Integration Tests
//!
//! Tests for:
//! - Created / destroyed / attribute bits and their deduplication
//! - Reset semantics and deferred index recycling
//! - Per-table change masks on materials, lights, cameras and scene roots

use glam::{Mat4, Vec3};
use strata::EntityId;
use strata::assets::{MaterialChanges, MaterialFlags, MaterialId, MaterialParams, Materials};
use strata::math::Transform;
use strata::scene::{
    CameraChanges, Cameras, LightSourceChanges, LightSources, SceneNodeChanges, SceneNodes, SceneRootChanges,
    SceneRootId, SceneRoots,
};

fn materials() -> Materials {
    let mut materials = Materials::new();
    materials.allocate(4);
    materials
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn each_changed_material_appears_once() {
    let mut materials = materials();
    let m1 = materials.create("M1", MaterialParams::default());
    let m2 = materials.create("M2", MaterialParams::default());
    let m3 = materials.create("M3", MaterialParams::default());

    materials.set_tint(m2, Vec3::new(1.0, 0.0, 0.0));
    materials.set_tint(m2, Vec3::new(0.0, 1.0, 0.0));
    materials.destroy(m3);

    let changed: Vec<(MaterialId, MaterialChanges)> = materials.get_changed_with_masks().collect();
    assert_eq!(
        changed,
        vec![
            (m1, MaterialChanges::CREATED),
            (m2, MaterialChanges::CREATED | MaterialChanges::ATTRIBUTES),
            (m3, MaterialChanges::CREATED | MaterialChanges::DESTROYED),
        ]
    );
    assert_eq!(materials.get_changed().count(), 3);
}

#[test]
fn unchanged_value_still_touches_stream() {
    let mut materials = materials();
    let id = materials.create("M", MaterialParams::default());
    materials.reset_change_notifications();

    let roughness = materials.get_roughness(id);
    materials.set_roughness(id, roughness);
    assert_eq!(materials.get_changes(id), MaterialChanges::ATTRIBUTES);
}

#[test]
fn flags_and_attributes_have_separate_bits() {
    let mut materials = materials();
    let id = materials.create("M", MaterialParams::default());
    materials.reset_change_notifications();

    materials.set_flags(id, MaterialFlags::CUTOUT);
    assert_eq!(materials.get_changes(id), MaterialChanges::FLAGS);
    materials.set_metallic(id, 1.0);
    assert_eq!(materials.get_changes(id), MaterialChanges::FLAGS | MaterialChanges::ATTRIBUTES);
}

#[test]
fn changed_materials_yields_masks() {
    let mut materials = materials();
    let id = materials.create("M", MaterialParams::default());
    materials.reset_change_notifications();
    materials.set_coverage(id, 0.5);

    let changed: Vec<_> = materials.changed_materials().collect();
    assert_eq!(changed, vec![(id, MaterialChanges::ATTRIBUTES)]);
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn reset_empties_the_stream() {
    let mut materials = materials();
    let id = materials.create("M", MaterialParams::default());
    materials.set_specularity(id, 0.5);
    assert!(materials.has_changes());

    materials.reset_change_notifications();
    assert!(!materials.has_changes());
    assert_eq!(materials.get_changed().count(), 0);
    assert!(materials.get_changes(id).is_empty());
}

#[test]
fn destroyed_index_is_not_reused_within_a_tick() {
    let mut materials = materials();
    let first = materials.create("First", MaterialParams::default());
    materials.destroy(first);
    let second = materials.create("Second", MaterialParams::default());
    assert_ne!(first.index(), second.index());

    materials.reset_change_notifications();
    let third = materials.create("Third", MaterialParams::default());
    assert_eq!(third.index(), first.index());
    assert!(!materials.has(first));
    assert!(materials.get_changes(first).is_empty());
    assert_eq!(materials.get_changes(third), MaterialChanges::CREATED);
}

#[test]
fn changes_of_stale_id_are_empty() {
    let mut materials = materials();
    let id = materials.create("M", MaterialParams::default());
    materials.destroy(id);
    // Still reported for the tick it died in.
    assert!(materials.get_changes(id).contains(MaterialChanges::DESTROYED));
    assert!(materials.get_changes(MaterialId::INVALID).is_empty());
}

// ============================================================================
// Other tables
// ============================================================================

#[test]
fn scene_node_transform_and_parent_bits() {
    let mut nodes = SceneNodes::new();
    nodes.allocate(2);
    let parent = nodes.create("Parent", Transform::IDENTITY);
    let child = nodes.create("Child", Transform::IDENTITY);
    nodes.reset_change_notifications();

    nodes.set_parent(child, parent);
    nodes.set_local_transform(child, Transform::from_translation(Vec3::X));
    assert_eq!(nodes.get_changes(child), SceneNodeChanges::PARENT | SceneNodeChanges::TRANSFORM);
    assert!(nodes.get_changes(parent).is_empty());
}

#[test]
fn equal_local_transform_is_not_a_change() {
    let mut nodes = SceneNodes::new();
    nodes.allocate(1);
    let node = nodes.create("Node", Transform::from_translation(Vec3::Y));
    nodes.reset_change_notifications();

    nodes.set_local_transform(node, Transform::from_translation(Vec3::Y));
    assert!(!nodes.has_changes());
}

#[test]
fn light_updates_raise_updated() {
    let mut nodes = SceneNodes::new();
    nodes.allocate(1);
    let node = nodes.create("Light", Transform::IDENTITY);
    let mut lights = LightSources::new();
    lights.allocate(1);
    let light = lights.create_sphere_light(node, Vec3::splat(10.0), 0.5);
    lights.reset_change_notifications();

    lights.set_radius(light, 1.0);
    assert_eq!(lights.get_changes(light), LightSourceChanges::UPDATED);
}

#[test]
fn camera_bits_follow_setters() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let camera = cameras.create("Camera", SceneRootId::INVALID, Mat4::IDENTITY, Mat4::IDENTITY);
    cameras.reset_change_notifications();

    cameras.set_transform(camera, Transform::from_translation(Vec3::Z));
    cameras.set_projection_matrices(camera, Mat4::IDENTITY, Mat4::IDENTITY);
    assert_eq!(cameras.get_changes(camera), CameraChanges::TRANSFORM | CameraChanges::PROJECTION);

    let mut effects = cameras.get_effects_settings(camera);
    effects.tonemapping.mode = effects.tonemapping.mode.next();
    cameras.set_effects_settings(camera, effects);
    assert!(cameras.get_changes(camera).contains(CameraChanges::EFFECTS));
}

#[test]
fn scene_root_environment_bit() {
    let mut nodes = SceneNodes::new();
    nodes.allocate(1);
    let mut roots = SceneRoots::new();
    roots.allocate(1);
    let root = roots.create("Scene", &mut nodes, Vec3::ONE);
    assert_eq!(roots.get_changes(root), SceneRootChanges::CREATED);
    roots.reset_change_notifications();

    roots.set_environment_tint(root, Vec3::new(0.68, 0.92, 1.0));
    assert_eq!(roots.get_changes(root), SceneRootChanges::ENVIRONMENT);
}
