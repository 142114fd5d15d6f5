//! Viewer
//!
//! A headless host for the scene database. It builds a scene from the
//! command line, wires camera navigation, projection handling, renderer
//! swapping and tonemapping switching as mutating callbacks, and drives a
//! fixed number of ticks through stub renderers. Input comes from a short
//! scripted tour instead of a window.
//!
//! Usage: cargo run -p viewer -- --scene SphereLightScene --environment-tint [0.2,0.2,0.3]

mod controls;
mod renderers;
mod scenes;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glam::{IVec2, Mat4, UVec2, Vec3};

use strata::assets::{MagnificationFilter, MinificationFilter, PixelFormat, TextureId, WrapMode};
use strata::input::{ButtonState, Key, MouseButton};
use strata::math::parse_rgb;
use strata::scene::{CameraId, RendererHandle, SceneRootId};
use strata::utils::{Clock, CutoutDetector, combine_whole_scene};
use strata::{Engine, Rect, SceneDatabase};

use controls::{CameraHandler, FpsTitle, Navigation, RenderSwapper, TonemappingSwitcher, quit_on_escape};
use renderers::{Backend, RendererInfo, StubRenderer};
use scenes::BuiltinScene;

#[derive(Parser, Debug)]
#[command(name = "viewer", version, about = "Headless viewer for Strata scenes")]
struct Args {
    /// Built-in scene to load: CornellBox, MaterialScene, OpacityScene,
    /// SphereScene, SphereLightScene, TestScene or VeachScene.
    #[arg(short, long)]
    scene: Option<String>,

    /// Latitude-longitude image used as environment light.
    #[arg(short, long, value_name = "IMAGE")]
    environment_map: Option<PathBuf>,

    /// Environment tint written as [r,g,b].
    #[arg(short = 'c', long, value_name = "[R,G,B]", value_parser = parse_rgb, default_value = "[0.68,0.92,1.0]")]
    environment_tint: Vec3,

    /// Only create the path tracer.
    #[arg(short, long, conflicts_with = "rasterizer_only")]
    path_tracing_only: bool,

    /// Only create the rasterizer.
    #[arg(short, long)]
    rasterizer_only: bool,

    /// Merge models sharing a material into one model per material.
    #[arg(long)]
    combine_meshes: bool,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 240)]
    ticks: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut engine = Engine::new();
    engine.window_mut().set_name("Viewer");

    add_renderers(&mut engine, &args);
    if !initialize_scene(&mut engine, &args)? {
        log::error!("No objects in scene.");
        std::process::exit(-1);
    }

    let clock = Clock::new();
    let mut ticks = 0;
    while ticks < args.ticks && !engine.is_quit_requested() {
        drive_input(&mut engine, ticks, args.ticks);
        engine.tick(1.0 / 60.0);
        ticks += 1;
    }

    log::info!(
        "'{}' ran {ticks} ticks in {:.3}s",
        engine.window().name(),
        clock.elapsed().as_secs_f32()
    );
    Ok(())
}

// ============================================================================
// Setup
// ============================================================================

fn add_renderers(engine: &mut Engine, args: &Args) {
    let mut backends = Vec::new();
    if !args.path_tracing_only {
        backends.push(Backend::Rasterizer);
    }
    if !args.rasterizer_only {
        backends.push(Backend::PathTracer);
    }

    for backend in backends {
        let handle: RendererHandle = Arc::new(RendererInfo { backend });
        let id = engine.database_mut().renderers.create(backend.to_string(), Some(handle));
        let mut renderer = StubRenderer::new(id);
        engine.add_non_mutating_callback(move |engine| renderer.render(engine));
    }

    // Logs the changes every renderer saw this tick, before they are reset.
    engine.add_tick_cleanup_callback(|engine| {
        let database = engine.database();
        if database.has_changes() {
            log::trace!(
                "Tick {}: {} nodes, {} models, {} materials, {} cameras changed",
                engine.time().ticks(),
                database.scene_nodes.get_changed().count(),
                database.mesh_models.get_changed().count(),
                database.materials.get_changed().count(),
                database.cameras.get_changed().count()
            );
        }
    });
}

fn load_environment_map(database: &mut SceneDatabase, path: &Path) -> anyhow::Result<TextureId> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load environment map '{}'", path.display()))?
        .into_rgba32f();
    let (width, height) = image.dimensions();
    let image = database.images.create_2d_with_pixels(
        path.display().to_string(),
        PixelFormat::RGBAFloat,
        1.0,
        UVec2::new(width, height),
        bytemuck::cast_slice(image.as_raw()),
    )?;

    Ok(database.textures.create_2d(
        image,
        MagnificationFilter::Linear,
        MinificationFilter::Linear,
        WrapMode::Repeat,
        WrapMode::Clamp,
    ))
}

/// Builds the scene and registers the viewer's callbacks. Returns false if
/// the scene ended up empty.
fn initialize_scene(engine: &mut Engine, args: &Args) -> anyhow::Result<bool> {
    let database = engine.database_mut();
    let scene: SceneRootId = match &args.environment_map {
        Some(path) => {
            let environment = load_environment_map(database, path)?;
            database.scene_roots.create_with_environment_map(
                "Model scene",
                &mut database.scene_nodes,
                environment,
                args.environment_tint,
            )
        }
        None => database
            .scene_roots
            .create("Model scene", &mut database.scene_nodes, args.environment_tint),
    };
    let root = database.scene_roots.get_root_node(scene);

    // Projection matrices are owned by the camera handler.
    let camera = database.cameras.create("Camera", scene, Mat4::IDENTITY, Mat4::IDENTITY);
    let first_renderer = database.renderers.first();
    database.cameras.set_renderer_id(camera, first_renderer);
    let mut camera_handler = CameraHandler::new(engine, camera, 0.1, 100.0);

    match args.scene.as_deref() {
        None => {
            log::info!("No scene given; displaying the Cornell Box.");
            BuiltinScene::CornellBox.create(engine, camera, scene);
        }
        Some(name) => match BuiltinScene::from_name(name) {
            Some(builtin) => builtin.create(engine, camera, scene),
            None => log::error!("'{name}' is not a built-in scene and scene files cannot be loaded."),
        },
    }

    let database = engine.database_mut();
    if database.scene_nodes.get_children_ids(root).is_empty() {
        return Ok(false);
    }

    if args.combine_meshes {
        let merged = combine_whole_scene(database, root);
        log::info!("Combined {merged} groups of models");
    }

    let bounds = database.compute_bounds(root);
    let scene_size = if bounds.is_valid() { bounds.size().length().max(1e-3) } else { 1.0 };
    camera_handler.set_near_and_far(engine, scene_size / 10000.0, scene_size * 3.0);
    log::info!("Scene bounds {:?} .. {:?}", bounds.min, bounds.max);

    let mut navigation = Navigation::new(engine, camera, scene_size * 0.1);
    let mut render_swapper = RenderSwapper::new(camera);
    let mut tonemapping_switcher = TonemappingSwitcher::new(camera);
    let mut fps_title = FpsTitle::new("Viewer");
    let mut cutout_detector = CutoutDetector::new();

    engine.add_mutating_callback(move |engine| camera_handler.handle(engine));
    engine.add_mutating_callback(move |engine| navigation.navigate(engine));
    engine.add_mutating_callback(move |engine| render_swapper.handle(engine));
    engine.add_mutating_callback(move |engine| tonemapping_switcher.handle(engine));
    engine.add_mutating_callback(move |engine| fps_title.update(engine));
    engine.add_mutating_callback(quit_on_escape);
    // Runs last so it sees every coverage image and material written this tick.
    engine.add_mutating_callback(move |engine| {
        let database = engine.database_mut();
        cutout_detector.invalidate_changed(&database.images);
        if database.images.has_changes() || database.textures.has_changes() || database.materials.has_changes() {
            cutout_detector.flag_cutout_materials(database);
        }
    });

    add_picture_in_picture(engine.database_mut(), camera, scene);
    Ok(true)
}

/// A second camera in the top right corner, drawn after the main camera by
/// the next renderer in line.
fn add_picture_in_picture(database: &mut SceneDatabase, camera: CameraId, scene: SceneRootId) {
    let cameras = &mut database.cameras;
    let second = cameras.create(
        "Second camera",
        scene,
        cameras.get_projection_matrix(camera),
        cameras.get_inverse_projection_matrix(camera),
    );
    cameras.set_transform(second, cameras.get_transform(camera));
    cameras.set_viewport(second, Rect::new(0.75, 0.75, 0.25, 0.25));
    cameras.set_z_index(second, 1);

    let renderer = database.renderers.next_after(database.camera_renderer(camera));
    database.cameras.set_renderer_id(second, renderer);
}

// ============================================================================
// Scripted input
// ============================================================================

/// Feeds a short tour through the scene, standing in for window events.
fn drive_input(engine: &mut Engine, tick: u32, tick_count: u32) {
    use ButtonState::{Pressed, Released};

    let keyboard = engine.keyboard_mut();
    match tick {
        1 => keyboard.set_key(Key::W, Pressed),
        45 => keyboard.set_key(Key::W, Released),
        90 => {
            keyboard.set_key(Key::P, Pressed);
            keyboard.set_key(Key::P, Released);
        }
        100 => {
            keyboard.set_key(Key::T, Pressed);
            keyboard.set_key(Key::T, Released);
        }
        110 => {
            keyboard.set_key(Key::E, Pressed);
            keyboard.set_key(Key::E, Released);
        }
        130 | 150 => keyboard.set_key(Key::Space, Pressed),
        131 | 151 => keyboard.set_key(Key::Space, Released),
        _ => {}
    }
    if tick + 1 == tick_count {
        keyboard.set_key(Key::Escape, Pressed);
    }

    let mouse = engine.mouse_mut();
    match tick {
        50 => {
            mouse.set_position(IVec2::new(320, 240));
            mouse.set_button(MouseButton::Left, Pressed);
        }
        51..80 => {
            let step = tick - 50;
            mouse.set_position(UVec2::new(320 + 3 * step, 240 + step).as_ivec2());
        }
        80 => mouse.set_button(MouseButton::Left, Released),
        120 => mouse.add_scroll_delta(2.0),
        _ => {}
    }

    if tick == 160 {
        engine.window_mut().resize(1280, 720);
    }
}
