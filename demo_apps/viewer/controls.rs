//! Mutating callbacks that turn input into scene changes.
//!
//! Each handler owns its state and is registered as a closure, e.g.
//! `engine.add_mutating_callback(move |engine| navigation.navigate(engine))`.

use std::f32::consts::{FRAC_PI_4, PI};

use glam::{Quat, Vec3};
use strata::Engine;
use strata::input::{Key, MouseButton};
use strata::scene::{CameraId, compute_perspective_projection};
use strata::utils::FpsCounter;

// ============================================================================
// Navigation
// ============================================================================

/// First-person camera controls.
///
/// WASD or the arrow keys move, shift moves five times faster, dragging
/// with the left mouse button looks around and space pauses time.
pub struct Navigation {
    camera: CameraId,
    velocity: f32,
    yaw: f32,
    pitch: f32,
}

impl Navigation {
    /// Pitch stays inside +-0.49 PI so the camera never flips over the poles.
    const MAX_PITCH: f32 = PI * 0.49;

    pub fn new(engine: &Engine, camera: CameraId, velocity: f32) -> Self {
        let forward = engine.database().cameras.get_transform(camera).forward();
        Self {
            camera,
            velocity,
            yaw: (-forward.x).atan2(-forward.z),
            pitch: forward.y.clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn navigate(&mut self, engine: &mut Engine) {
        let keyboard = engine.keyboard();
        let mouse = engine.mouse();
        let current = engine.database().cameras.get_transform(self.camera);
        let mut transform = current;

        let axis = |positive: [Key; 2], negative: [Key; 2]| {
            let held = |keys: [Key; 2]| keys.iter().any(|&key| keyboard.is_pressed(key));
            f32::from(u8::from(held(positive))) - f32::from(u8::from(held(negative)))
        };
        let strafing = axis([Key::D, Key::ArrowRight], [Key::A, Key::ArrowLeft]);
        let forward = axis([Key::W, Key::ArrowUp], [Key::S, Key::ArrowDown]);

        if strafing != 0.0 || forward != 0.0 {
            let mut velocity = self.velocity;
            if keyboard.is_pressed(Key::ShiftLeft) || keyboard.is_pressed(Key::ShiftRight) {
                velocity *= 5.0;
            }
            // Paused time still lets the camera fly around.
            let time = engine.time();
            let dt = if time.is_paused() { time.raw_delta() } else { time.smooth_delta() };
            let offset = transform.rotation * Vec3::new(strafing, 0.0, -forward);
            transform.translation += offset.normalize() * velocity * dt;
        }

        if mouse.is_pressed(MouseButton::Left) {
            let delta = mouse.delta().as_vec2();
            self.yaw -= delta.x.to_radians();
            self.pitch = (self.pitch - delta.y.to_radians()).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
            transform.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        }

        let toggle_pause = keyboard.was_pressed(Key::Space);

        if transform != current {
            engine.database_mut().cameras.set_transform(self.camera, transform);
        }
        if toggle_pause {
            let time = engine.time_mut();
            time.toggle_pause();
            log::info!("Time {}", if time.is_paused() { "paused" } else { "resumed" });
        }
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Keeps a camera's projection in sync with the window and the scroll wheel.
pub struct CameraHandler {
    camera: CameraId,
    aspect_ratio: f32,
    field_of_view: f32,
    near: f32,
    far: f32,
}

impl CameraHandler {
    const MIN_FIELD_OF_VIEW: f32 = 0.05;
    const MAX_FIELD_OF_VIEW: f32 = PI * 0.95;

    pub fn new(engine: &mut Engine, camera: CameraId, near: f32, far: f32) -> Self {
        let handler = Self {
            camera,
            aspect_ratio: engine.window().aspect_ratio(),
            field_of_view: FRAC_PI_4,
            near,
            far,
        };
        handler.apply(engine);
        handler
    }

    pub fn set_near_and_far(&mut self, engine: &mut Engine, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.apply(engine);
    }

    pub fn handle(&mut self, engine: &mut Engine) {
        let zoom = engine.mouse().scroll_delta() * engine.time().smooth_delta();
        let field_of_view = (self.field_of_view - zoom).clamp(Self::MIN_FIELD_OF_VIEW, Self::MAX_FIELD_OF_VIEW);
        let aspect_ratio = engine.window().aspect_ratio();

        if aspect_ratio != self.aspect_ratio || field_of_view != self.field_of_view {
            self.aspect_ratio = aspect_ratio;
            self.field_of_view = field_of_view;
            self.apply(engine);
        }
    }

    fn apply(&self, engine: &mut Engine) {
        let (projection, inverse_projection) =
            compute_perspective_projection(self.near, self.far, self.field_of_view, self.aspect_ratio);
        engine
            .database_mut()
            .cameras
            .set_projection_matrices(self.camera, projection, inverse_projection);
    }
}

// ============================================================================
// Renderer & post-process switching
// ============================================================================

/// Releasing P without modifiers moves the camera on to the next renderer.
pub struct RenderSwapper {
    camera: CameraId,
}

impl RenderSwapper {
    pub fn new(camera: CameraId) -> Self {
        Self { camera }
    }

    pub fn handle(&mut self, engine: &mut Engine) {
        let keyboard = engine.keyboard();
        if !keyboard.was_released(Key::P) || keyboard.is_modifiers_pressed() {
            return;
        }

        let database = engine.database_mut();
        let next = database.renderers.next_after(database.camera_renderer(self.camera));
        database.cameras.set_renderer_id(self.camera, next);
        log::info!("Camera '{}' now uses '{}'", database.cameras.name(self.camera), database.renderers.name(next));
    }
}

/// E cycles the exposure mode and T the tonemapping operator.
pub struct TonemappingSwitcher {
    camera: CameraId,
}

impl TonemappingSwitcher {
    pub fn new(camera: CameraId) -> Self {
        Self { camera }
    }

    pub fn handle(&mut self, engine: &mut Engine) {
        let update_exposure = engine.keyboard().was_released(Key::E);
        let update_tonemapping = engine.keyboard().was_released(Key::T);
        if !update_exposure && !update_tonemapping {
            return;
        }

        let cameras = &mut engine.database_mut().cameras;
        let mut settings = cameras.get_effects_settings(self.camera);
        if update_exposure {
            settings.exposure.mode = settings.exposure.mode.next();
        }
        if update_tonemapping {
            settings.tonemapping.mode = settings.tonemapping.mode.next();
        }
        log::info!(
            "Exposure: {}, Tonemapping: {}",
            settings.exposure.mode.name(),
            settings.tonemapping.mode.name()
        );
        cameras.set_effects_settings(self.camera, settings);
    }
}

// ============================================================================
// Window title
// ============================================================================

/// Shows the frame rate in the window name.
pub struct FpsTitle {
    title: String,
    counter: FpsCounter,
}

impl FpsTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            counter: FpsCounter::new(),
        }
    }

    pub fn update(&mut self, engine: &mut Engine) {
        let fps = self.counter.update(engine.time().raw_delta());
        let name = format!("{} - FPS {fps:.1}", self.title);
        engine.window_mut().set_name(name);
    }
}

/// Escape asks the host to stop.
pub fn quit_on_escape(engine: &mut Engine) {
    if engine.keyboard().was_pressed(Key::Escape) {
        engine.request_quit();
    }
}
