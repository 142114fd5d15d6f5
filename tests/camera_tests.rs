//! Camera Integration Tests
//!
//! Tests for:
//! - Perspective projection and its analytic inverse
//! - View transforms and viewport rays
//! - Paint order by z-index then creation order
//! - Renderer assignment and the first-renderer fallback
//! - Effects settings cycling

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use strata::EntityId;
use strata::math::{Rect, Transform};
use strata::scene::{
    CameraId, Cameras, ExposureMode, RendererHandle, RendererId, SceneRootId, TonemappingMode, compute_perspective_projection,
};
use strata::{SceneCapacities, SceneDatabase};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn mat_approx_eq(a: Mat4, b: Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() < EPSILON)
}

fn camera(cameras: &mut Cameras, name: &str) -> CameraId {
    let (projection, inverse) = compute_perspective_projection(0.1, 100.0, 60f32.to_radians(), 16.0 / 9.0);
    cameras.create(name, SceneRootId::INVALID, projection, inverse)
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn projection_times_inverse_is_identity() {
    for &(near, far, fov, aspect) in &[
        (0.1, 100.0, 60f32.to_radians(), 16.0 / 9.0),
        (0.01, 1000.0, 90f32.to_radians(), 1.0),
        (1.0, 10.0, 30f32.to_radians(), 0.5),
    ] {
        let (projection, inverse) = compute_perspective_projection(near, far, fov, aspect);
        assert!(mat_approx_eq(projection * inverse, Mat4::IDENTITY));
        assert!(mat_approx_eq(inverse * projection, Mat4::IDENTITY));
    }
}

#[test]
fn projection_maps_near_and_far_to_unit_depth() {
    let (projection, _) = compute_perspective_projection(0.5, 50.0, 45f32.to_radians(), 1.0);
    let near = projection.project_point3(Vec3::new(0.0, 0.0, -0.5));
    let far = projection.project_point3(Vec3::new(0.0, 0.0, -50.0));
    assert!(near.z.abs() < EPSILON || (near.z - 1.0).abs() < EPSILON);
    assert!(far.z.abs() < EPSILON || (far.z - 1.0).abs() < EPSILON);
    assert!((near.z - far.z).abs() > 0.5);
}

#[test]
fn inverse_projection_unprojects_clip_points() {
    let (projection, inverse) = compute_perspective_projection(0.1, 100.0, 60f32.to_radians(), 1.5);
    let view_point = Vec4::new(1.0, -2.0, -10.0, 1.0);
    let clip = projection * view_point;
    let back = inverse * clip;
    assert!(approx_eq(back.truncate() / back.w, view_point.truncate()));
}

// ============================================================================
// View & rays
// ============================================================================

#[test]
fn view_transform_inverts_camera_transform() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let id = camera(&mut cameras, "Main");
    let transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7), 1.0);
    cameras.set_transform(id, transform);

    let view = cameras.get_view_transform(id);
    assert!(approx_eq(view.transform_point(Vec3::new(1.0, 2.0, 3.0)), Vec3::ZERO));
    let round_trip = view.compose(&transform);
    assert!(approx_eq(round_trip.transform_point(Vec3::ONE), Vec3::ONE));
}

#[test]
fn center_ray_follows_camera_forward() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let id = camera(&mut cameras, "Main");
    let mut transform = Transform::from_translation(Vec3::new(0.0, 1.0, 5.0));
    transform.look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
    cameras.set_transform(id, transform);

    let ray = cameras.ray_from_viewport_point(id, Vec2::splat(0.5));
    assert!(approx_eq(ray.origin, Vec3::new(0.0, 1.0, 5.0)));
    assert!(approx_eq(ray.direction, Vec3::NEG_Z));
    assert!(approx_eq(ray.at(5.0), Vec3::new(0.0, 1.0, 0.0)));
}

#[test]
fn corner_rays_diverge_symmetrically() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let id = camera(&mut cameras, "Main");

    let left = cameras.ray_from_viewport_point(id, Vec2::new(0.0, 0.5)).direction;
    let right = cameras.ray_from_viewport_point(id, Vec2::new(1.0, 0.5)).direction;
    assert!((left.length() - 1.0).abs() < EPSILON);
    assert!(left.x < 0.0 && right.x > 0.0);
    assert!((left.x + right.x).abs() < EPSILON);
}

// ============================================================================
// Ordering & viewports
// ============================================================================

#[test]
fn z_sort_orders_by_z_index_then_creation() {
    let mut cameras = Cameras::new();
    cameras.allocate(4);
    let main = camera(&mut cameras, "Main");
    let overlay = camera(&mut cameras, "Overlay");
    let second = camera(&mut cameras, "Second");
    cameras.set_z_index(overlay, 1);

    assert_eq!(cameras.get_z_sorted(), vec![main, second, overlay]);

    cameras.set_z_index(main, 2);
    assert_eq!(cameras.get_z_sorted(), vec![second, overlay, main]);
}

#[test]
fn z_sort_skips_destroyed_cameras() {
    let mut cameras = Cameras::new();
    cameras.allocate(2);
    let a = camera(&mut cameras, "A");
    let b = camera(&mut cameras, "B");
    cameras.destroy(a);
    assert_eq!(cameras.get_z_sorted(), vec![b]);
}

#[test]
fn viewport_defaults_to_full_screen() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let id = camera(&mut cameras, "Main");
    assert_eq!(cameras.get_viewport(id), Rect::FULL);

    let picture_in_picture = Rect::new(0.75, 0.75, 0.25, 0.25);
    cameras.set_viewport(id, picture_in_picture);
    assert_eq!(cameras.get_viewport(id), picture_in_picture);
    assert!(picture_in_picture.contains(Vec2::new(0.8, 0.9)));
    assert!(!picture_in_picture.contains(Vec2::new(0.5, 0.9)));
    assert!(Rect::new(0.0, 0.0, 0.0, 1.0).is_empty());
}

// ============================================================================
// Renderers
// ============================================================================

#[test]
fn unassigned_camera_uses_first_renderer() {
    let mut db = SceneDatabase::new();
    db.allocate(&SceneCapacities::default());
    let id = camera(&mut db.cameras, "Main");
    assert_eq!(db.camera_renderer(id), RendererId::INVALID);

    let raster = db.renderers.create("Rasterizer", None);
    let handle: RendererHandle = Arc::new(7_u32);
    let tracer = db.renderers.create("PathTracer", Some(handle));
    assert_eq!(db.camera_renderer(id), raster);

    db.cameras.set_renderer_id(id, tracer);
    assert_eq!(db.camera_renderer(id), tracer);
    assert_eq!(db.renderers.get_implementation_as::<u32>(tracer), Some(&7));

    db.renderers.destroy(tracer);
    assert_eq!(db.camera_renderer(id), raster);
}

#[test]
fn fallback_renderer_ignores_recycled_indices() {
    let mut db = SceneDatabase::new();
    db.allocate(&SceneCapacities::default());
    let id = camera(&mut db.cameras, "Main");

    let a = db.renderers.create("A", None);
    let b = db.renderers.create("B", None);
    db.renderers.destroy(a);
    db.reset_change_notifications();

    // C takes over A's index but is still the newest renderer.
    let c = db.renderers.create("C", None);
    assert_eq!(c.index(), a.index());
    assert_eq!(db.renderers.first(), b);
    assert_eq!(db.camera_renderer(id), b);

    // Cycling follows creation order as well.
    assert_eq!(db.renderers.next_after(b), c);
    assert_eq!(db.renderers.next_after(c), b);
}

#[test]
fn renderer_cycling_wraps_around() {
    let mut db = SceneDatabase::new();
    db.allocate(&SceneCapacities::default());
    let a = db.renderers.create("A", None);
    let b = db.renderers.create("B", None);

    assert_eq!(db.renderers.first(), a);
    assert_eq!(db.renderers.next_after(a), b);
    assert_eq!(db.renderers.next_after(b), a);

    db.renderers.destroy(b);
    assert_eq!(db.renderers.next_after(a), a);
}

// ============================================================================
// Effects
// ============================================================================

#[test]
fn effects_modes_cycle_and_persist() {
    let mut cameras = Cameras::new();
    cameras.allocate(1);
    let id = camera(&mut cameras, "Main");

    let mut effects = cameras.get_effects_settings(id);
    assert_eq!(effects.tonemapping.mode, TonemappingMode::Filmic);
    assert_eq!(effects.exposure.mode, ExposureMode::Histogram);

    effects.tonemapping.mode = effects.tonemapping.mode.next();
    effects.exposure.mode = effects.exposure.mode.next();
    cameras.set_effects_settings(id, effects);

    let stored = cameras.get_effects_settings(id);
    assert_eq!(stored.tonemapping.mode, TonemappingMode::Uncharted2);
    assert_eq!(stored.exposure.mode, ExposureMode::Fixed);
    assert_eq!(TonemappingMode::Uncharted2.next(), TonemappingMode::Linear);
}
