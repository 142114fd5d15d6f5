//! Built-in scenes.
//!
//! Every scene is assembled from the procedural mesh generators, attaches
//! its content below the scene root's node and places the camera. Scenes
//! with moving parts register their own mutating callbacks.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Quat, UVec2, Vec3};
use strata::assets::{
    ImageId, MagnificationFilter, MaterialId, MaterialParams, MeshFlags, MeshId, MinificationFilter, PixelFormat,
    TextureId, WrapMode, mesh_creation,
};
use strata::scene::{CameraId, SceneNodeId, SceneRootId};
use strata::{Engine, SceneDatabase, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScene {
    CornellBox,
    MaterialScene,
    OpacityScene,
    SphereScene,
    SphereLightScene,
    TestScene,
    VeachScene,
}

impl BuiltinScene {
    pub fn all() -> &'static [BuiltinScene] {
        &[
            Self::CornellBox,
            Self::MaterialScene,
            Self::OpacityScene,
            Self::SphereScene,
            Self::SphereLightScene,
            Self::TestScene,
            Self::VeachScene,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CornellBox => "CornellBox",
            Self::MaterialScene => "MaterialScene",
            Self::OpacityScene => "OpacityScene",
            Self::SphereScene => "SphereScene",
            Self::SphereLightScene => "SphereLightScene",
            Self::TestScene => "TestScene",
            Self::VeachScene => "VeachScene",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|scene| scene.name() == name)
    }

    /// Fills the scene `scene` and points `camera` at it.
    pub fn create(self, engine: &mut Engine, camera: CameraId, scene: SceneRootId) {
        log::info!("Creating built-in scene '{}'", self.name());
        match self {
            Self::CornellBox => create_cornell_box(engine.database_mut(), camera, scene),
            Self::MaterialScene => create_material_scene(engine.database_mut(), camera, scene),
            Self::OpacityScene => create_opacity_scene(engine, camera, scene),
            Self::SphereScene => create_sphere_scene(engine.database_mut(), camera, scene),
            Self::SphereLightScene => create_sphere_light_scene(engine, camera, scene),
            Self::TestScene => create_test_scene(engine, camera, scene),
            Self::VeachScene => create_veach_scene(engine.database_mut(), camera, scene),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

const MODEL_FLAGS: MeshFlags = MeshFlags::POSITION.union(MeshFlags::NORMAL).union(MeshFlags::TEXCOORD);

fn place_camera(database: &mut SceneDatabase, camera: CameraId, position: Vec3, target: Vec3) {
    let mut transform = Transform::from_translation(position);
    transform.look_at(target, Vec3::Y);
    database.cameras.set_transform(camera, transform);
}

fn add_node(database: &mut SceneDatabase, name: &str, parent: SceneNodeId, transform: Transform) -> SceneNodeId {
    let node = database.scene_nodes.create(name, transform);
    database.scene_nodes.set_parent(node, parent);
    node
}

fn add_model(
    database: &mut SceneDatabase,
    name: &str,
    parent: SceneNodeId,
    transform: Transform,
    mesh: MeshId,
    material: MaterialId,
) -> SceneNodeId {
    let node = add_node(database, name, parent, transform);
    database.mesh_models.create(node, mesh, material);
    node
}

/// A floor plane of `size` units facing +Y at height `y`.
fn add_floor(database: &mut SceneDatabase, parent: SceneNodeId, size: u32, y: f32, material: MaterialId) -> SceneNodeId {
    let floor = mesh_creation::plane(&mut database.meshes, size, MODEL_FLAGS);
    add_model(
        database,
        "Floor",
        parent,
        Transform::from_translation(Vec3::new(0.0, y, 0.0)),
        floor,
        material,
    )
}

/// An I8 image filled by `coverage(x, y)`, wrapped in a clamped texture.
fn coverage_texture(
    database: &mut SceneDatabase,
    name: &str,
    size: u32,
    coverage: impl Fn(u32, u32) -> u8,
) -> TextureId {
    let image = database.images.create_2d(name, PixelFormat::I8, 1.0, UVec2::splat(size));
    if let Some(pixels) = database.images.get_pixels_mut(image) {
        for (i, pixel) in pixels.iter_mut().enumerate() {
            let i = i as u32;
            *pixel = coverage(i % size, i / size);
        }
    }
    database.textures.create_2d(
        image,
        MagnificationFilter::Linear,
        MinificationFilter::Linear,
        WrapMode::Clamp,
        WrapMode::Clamp,
    )
}

/// A two-tone checkerboard in sRGB.
fn checker_image(database: &mut SceneDatabase, size: u32, cells: u32, a: Vec3, b: Vec3) -> ImageId {
    let image = database.images.create_2d("Checker", PixelFormat::RGB24, 2.2, UVec2::splat(size));
    let cell = (size / cells).max(1);
    for y in 0..size {
        for x in 0..size {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            database.images.set_pixel(image, color.extend(1.0), UVec2::new(x, y));
        }
    }
    image
}

// ============================================================================
// Scenes
// ============================================================================

fn create_cornell_box(database: &mut SceneDatabase, camera: CameraId, scene: SceneRootId) {
    place_camera(database, camera, Vec3::new(0.0, 0.0, 1.5), Vec3::ZERO);
    let root = database.scene_roots.get_root_node(scene);

    let white = database.materials.create("White", MaterialParams::with_tint(Vec3::splat(0.98)));
    let red = database.materials.create("Red", MaterialParams::with_tint(Vec3::new(0.98, 0.02, 0.02)));
    let green = database.materials.create("Green", MaterialParams::with_tint(Vec3::new(0.02, 0.98, 0.02)));

    let wall = mesh_creation::plane(&mut database.meshes, 1, MODEL_FLAGS);
    let walls = [
        ("Floor", Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, white),
        ("Roof", Vec3::new(0.0, 0.5, 0.0), Quat::from_rotation_x(PI), white),
        ("Back", Vec3::new(0.0, 0.0, -0.5), Quat::from_rotation_x(FRAC_PI_2), white),
        ("Left", Vec3::new(-0.5, 0.0, 0.0), Quat::from_rotation_z(-FRAC_PI_2), red),
        ("Right", Vec3::new(0.5, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2), green),
    ];
    for (name, translation, rotation, material) in walls {
        add_model(database, name, root, Transform::new(translation, rotation, 1.0), wall, material);
    }

    let cube = mesh_creation::cube(&mut database.meshes, 1, MODEL_FLAGS);
    add_model(
        database,
        "Big box",
        root,
        Transform::new(Vec3::new(-0.17, -0.275, -0.12), Quat::from_rotation_y(0.35), 0.45),
        cube,
        white,
    );
    add_model(
        database,
        "Small box",
        root,
        Transform::new(Vec3::new(0.2, -0.35, 0.15), Quat::from_rotation_y(-0.3), 0.3),
        cube,
        white,
    );

    let light = add_node(database, "Light", root, Transform::from_translation(Vec3::new(0.0, 0.45, 0.0)));
    database.light_sources.create_sphere_light(light, Vec3::splat(2.0), 0.05);
}

fn create_material_scene(database: &mut SceneDatabase, camera: CameraId, scene: SceneRootId) {
    const COUNT: u32 = 5;

    place_camera(database, camera, Vec3::new(0.0, 1.5, 7.0), Vec3::new(0.0, 0.5, 0.0));
    let root = database.scene_roots.get_root_node(scene);

    let floor_material = database.materials.create("Floor", MaterialParams::with_tint(Vec3::splat(0.4)));
    add_floor(database, root, 12, 0.0, floor_material);

    let sphere = mesh_creation::revolved_sphere(&mut database.meshes, 64, 32, MODEL_FLAGS);
    for metallic in [0.0, 1.0] {
        for i in 0..COUNT {
            let roughness = i as f32 / (COUNT - 1) as f32;
            let params = MaterialParams {
                tint: Vec3::new(1.0, 0.766, 0.336),
                roughness,
                metallic,
                ..MaterialParams::default()
            };
            let name = format!("Roughness {roughness:.2}, metallic {metallic}");
            let material = database.materials.create(name.as_str(), params);
            let position = Vec3::new((i as f32 - 2.0) * 1.2, 0.5, -1.2 * metallic);
            add_model(database, &name, root, Transform::from_translation(position), sphere, material);
        }
    }

    let sun = add_node(
        database,
        "Sun",
        root,
        Transform::from_rotation(Quat::from_rotation_x(-1.1) * Quat::from_rotation_y(0.4)),
    );
    database.light_sources.create_directional_light(sun, Vec3::splat(2.0));
}

fn create_opacity_scene(engine: &mut Engine, camera: CameraId, scene: SceneRootId) {
    let database = engine.database_mut();
    place_camera(database, camera, Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.0, 0.5, 0.0));
    let root = database.scene_roots.get_root_node(scene);

    let floor_material = database.materials.create("Floor", MaterialParams::with_tint(Vec3::splat(0.5)));
    add_floor(database, root, 6, 0.0, floor_material);

    // Binary holes: flagged as a cutout by the viewer's cutout pass.
    let holes = coverage_texture(database, "Holes", 64, |x, y| {
        let centre = |v: u32| (v % 16) as f32 - 7.5;
        if centre(x).hypot(centre(y)) < 5.0 { 0 } else { 255 }
    });
    // A smooth ramp stays a blended material.
    let ramp = coverage_texture(database, "Ramp", 64, |x, _| (x * 4).min(255) as u8);

    let plane = mesh_creation::plane(&mut database.meshes, 1, MODEL_FLAGS);
    let upright = Quat::from_rotation_x(FRAC_PI_2);
    for (name, coverage_texture, x) in [("Holes", holes, -0.6), ("Ramp", ramp, 0.6)] {
        let params = MaterialParams {
            tint: Vec3::new(0.9, 0.5, 0.1),
            coverage_texture,
            ..MaterialParams::default()
        };
        let material = database.materials.create(name, params);
        add_model(
            database,
            name,
            root,
            Transform::new(Vec3::new(x, 0.5, 0.0), upright, 1.0),
            plane,
            material,
        );
    }

    let glass = database.materials.create(
        "Half covered",
        MaterialParams {
            coverage: 0.5,
            ..MaterialParams::with_tint(Vec3::new(0.2, 0.4, 0.9))
        },
    );
    let cube = mesh_creation::cube(&mut database.meshes, 1, MODEL_FLAGS);
    let spinner = add_model(
        database,
        "Spinning cube",
        root,
        Transform::new(Vec3::new(0.0, 0.25, 1.0), Quat::IDENTITY, 0.3),
        cube,
        glass,
    );

    let mut angle = 0.0f32;
    engine.add_mutating_callback(move |engine| {
        angle = (angle + engine.time().scaled_delta() * 0.5) % TAU;
        engine
            .database_mut()
            .scene_nodes
            .node_mut(spinner)
            .set_rotation(Quat::from_rotation_y(angle));
    });
}

fn create_sphere_scene(database: &mut SceneDatabase, camera: CameraId, scene: SceneRootId) {
    place_camera(database, camera, Vec3::new(0.0, 1.0, 2.5), Vec3::new(0.0, 0.5, 0.0));
    let root = database.scene_roots.get_root_node(scene);

    let checker = checker_image(database, 256, 16, Vec3::splat(0.9), Vec3::splat(0.2));
    let checker = database.textures.create_2d_default(checker);
    let floor_material = database.materials.create(
        "Checker",
        MaterialParams {
            tint_texture: checker,
            ..MaterialParams::default()
        },
    );
    add_floor(database, root, 10, 0.0, floor_material);

    let sphere = mesh_creation::revolved_sphere(&mut database.meshes, 128, 64, MODEL_FLAGS);
    let material = database.materials.create(
        "Sphere",
        MaterialParams {
            roughness: 0.2,
            ..MaterialParams::with_tint(Vec3::new(1.0, 0.2, 0.2))
        },
    );
    add_model(database, "Sphere", root, Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)), sphere, material);
}

fn create_sphere_light_scene(engine: &mut Engine, camera: CameraId, scene: SceneRootId) {
    let database = engine.database_mut();
    place_camera(database, camera, Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
    let root = database.scene_roots.get_root_node(scene);
    // The sphere lights should be the only light in the scene.
    database.scene_roots.set_environment_tint(scene, Vec3::ZERO);

    let floor_material = database.materials.create("Floor", MaterialParams::with_tint(Vec3::splat(0.6)));
    add_floor(database, root, 10, 0.0, floor_material);

    let cylinder = mesh_creation::cylinder(&mut database.meshes, 1, 64, MODEL_FLAGS);
    let pillar = database.materials.create("Pillar", MaterialParams::with_tint(Vec3::splat(0.8)));
    add_model(
        database,
        "Pillar",
        root,
        Transform::new(Vec3::new(0.0, 0.75, 0.0), Quat::IDENTITY, 1.5),
        cylinder,
        pillar,
    );

    // Three colored lights circling the pillar on a shared pivot.
    let pivot = add_node(database, "Light pivot", root, Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    let colors = [Vec3::new(8.0, 1.0, 1.0), Vec3::new(1.0, 8.0, 1.0), Vec3::new(1.0, 1.0, 8.0)];
    for (i, power) in colors.into_iter().enumerate() {
        let angle = i as f32 * TAU / 3.0;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 1.5;
        let light = add_node(database, &format!("Light {i}"), pivot, Transform::from_translation(offset));
        database.light_sources.create_sphere_light(light, power, 0.1);
    }

    engine.add_mutating_callback(move |engine| {
        let angle = engine.time().scaled_delta() * 0.75;
        engine.database_mut().scene_nodes.node_mut(pivot).rotate_y(angle);
    });
}

fn create_test_scene(engine: &mut Engine, camera: CameraId, scene: SceneRootId) {
    let database = engine.database_mut();
    place_camera(database, camera, Vec3::new(0.0, 2.0, 6.0), Vec3::new(0.0, 0.5, 0.0));
    let root = database.scene_roots.get_root_node(scene);

    let checker = checker_image(database, 64, 8, Vec3::new(0.9, 0.9, 0.2), Vec3::new(0.1, 0.3, 0.8));
    let checker = database.textures.create_2d_default(checker);
    let floor_material = database.materials.create(
        "Checker floor",
        MaterialParams {
            tint_texture: checker,
            roughness: 0.8,
            ..MaterialParams::default()
        },
    );
    add_floor(database, root, 10, 0.0, floor_material);

    let red = database.materials.create("Red", MaterialParams::with_tint(Vec3::new(0.9, 0.1, 0.1)));
    let chrome = database.materials.create(
        "Chrome",
        MaterialParams {
            metallic: 1.0,
            roughness: 0.05,
            ..MaterialParams::with_tint(Vec3::splat(0.95))
        },
    );

    let cube = mesh_creation::cube(&mut database.meshes, 2, MODEL_FLAGS | MeshFlags::TANGENT);
    let sphere = mesh_creation::revolved_sphere(&mut database.meshes, 32, 16, MODEL_FLAGS);
    let cylinder = mesh_creation::cylinder(&mut database.meshes, 4, 32, MODEL_FLAGS);

    // A small hierarchy: the sphere and cylinder orbit the spinning cube.
    let hub = add_model(database, "Hub", root, Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)), cube, red);
    add_model(database, "Moon", hub, Transform::new(Vec3::new(1.5, 0.0, 0.0), Quat::IDENTITY, 0.6), sphere, chrome);
    add_model(database, "Tower", hub, Transform::new(Vec3::new(-1.5, 0.0, 0.0), Quat::IDENTITY, 0.6), cylinder, red);

    let spot = add_node(database, "Spot", root, Transform::from_translation(Vec3::new(2.0, 3.0, 2.0)));
    database.scene_nodes.node_mut(spot).look_at(Vec3::ZERO);
    database.light_sources.create_spot_light(spot, Vec3::splat(30.0), 0.1, 0.4);
    let bulb = add_node(database, "Bulb", root, Transform::from_translation(Vec3::new(-2.0, 1.0, 1.0)));
    database.light_sources.create_point_light(bulb, Vec3::new(4.0, 3.0, 2.0));

    engine.add_mutating_callback(move |engine| {
        let angle = engine.time().scaled_delta() * 0.4;
        engine.database_mut().scene_nodes.node_mut(hub).rotate_y(angle);
    });
}

fn create_veach_scene(database: &mut SceneDatabase, camera: CameraId, scene: SceneRootId) {
    place_camera(database, camera, Vec3::new(0.0, 2.0, 15.0), Vec3::new(0.0, -1.0, 0.0));
    let root = database.scene_roots.get_root_node(scene);
    database.scene_roots.set_environment_tint(scene, Vec3::ZERO);

    let floor_material = database.materials.create("Floor", MaterialParams::with_tint(Vec3::splat(0.4)));
    add_floor(database, root, 30, -4.0, floor_material);

    // Four glossy plates of decreasing roughness, each tilted a bit more
    // towards the camera.
    let plate = mesh_creation::plane(&mut database.meshes, 1, MODEL_FLAGS);
    let plates = [(0.6, -3.3, 0.35), (0.3, -2.6, 0.5), (0.1, -1.8, 0.65), (0.02, -1.0, 0.8)];
    for (i, (roughness, height, tilt)) in plates.into_iter().enumerate() {
        let material = database.materials.create(
            format!("Plate {i}"),
            MaterialParams {
                roughness,
                metallic: 1.0,
                ..MaterialParams::with_tint(Vec3::splat(0.9))
            },
        );
        let transform = Transform::new(
            Vec3::new(0.0, height, 2.0 - i as f32 * 1.2),
            Quat::from_rotation_x(tilt),
            4.0,
        );
        add_model(database, &format!("Plate {i}"), root, transform, plate, material);
    }

    // Lights of growing radius and equal total power.
    for (i, radius) in [0.03f32, 0.1, 0.3, 0.9].into_iter().enumerate() {
        let x = -3.75 + i as f32 * 2.5;
        let light = add_node(database, &format!("Light {i}"), root, Transform::from_translation(Vec3::new(x, 0.0, 0.0)));
        database.light_sources.create_sphere_light(light, Vec3::splat(100.0), radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &scene in BuiltinScene::all() {
            assert_eq!(BuiltinScene::from_name(scene.name()), Some(scene));
        }
        assert_eq!(BuiltinScene::from_name("scene.obj"), None);
    }

    #[test]
    fn every_scene_has_content() {
        for &builtin in BuiltinScene::all() {
            let mut engine = Engine::new();
            let database = engine.database_mut();
            let scene = database.scene_roots.create("Scene", &mut database.scene_nodes, Vec3::ONE);
            let camera = database.cameras.create("Camera", scene, glam::Mat4::IDENTITY, glam::Mat4::IDENTITY);
            builtin.create(&mut engine, camera, scene);

            let database = engine.database();
            let root = database.scene_roots.get_root_node(scene);
            assert!(!database.scene_nodes.get_children_ids(root).is_empty(), "{}", builtin.name());
            assert!(database.compute_bounds(root).is_valid(), "{}", builtin.name());
        }
    }
}
