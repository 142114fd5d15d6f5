//! Engine Core Module
//!
//! This module contains [`Engine`], the tick coordinator. It owns the
//! [`SceneDatabase`], the input snapshots, the window metrics and the time
//! model, and drives three callback queues. It has no windowing or GPU
//! logic of its own, so it can be driven by any host.
//!
//! # Tick order
//!
//! 1. The host injects input events and window metrics, then calls
//!    [`Engine::tick`] with the real time that passed.
//! 2. Mutating callbacks run in registration order and may change the
//!    scene database.
//! 3. Global transforms are brought up to date.
//! 4. Non-mutating callbacks (renderers) run in registration order with
//!    shared access only.
//! 5. Tick-cleanup callbacks run, then every change stream of the database
//!    is reset and the per-tick input transitions are cleared.
//!
//! # Example
//!
//! ```rust
//! use strata::Engine;
//! use strata::math::Transform;
//!
//! let mut engine = Engine::new();
//! engine.add_mutating_callback(|engine| {
//!     engine.database_mut().scene_nodes.create("Node", Transform::IDENTITY);
//! });
//! engine.add_non_mutating_callback(|engine| {
//!     assert!(engine.database().scene_nodes.has_changes());
//! });
//!
//! engine.tick(1.0 / 60.0);
//! assert!(!engine.database().scene_nodes.has_changes());
//! ```

use std::mem;

use crate::input::{Keyboard, Mouse};
use crate::utils::time::Time;
use crate::world::{SceneCapacities, SceneDatabase};

/// A callback allowed to mutate the engine.
pub type MutatingCallback = Box<dyn FnMut(&mut Engine)>;
/// A callback with shared access, run after every mutating callback.
pub type NonMutatingCallback = Box<dyn FnMut(&Engine)>;

/// Window metrics reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    name: String,
    width: u32,
    height: u32,
}

impl Window {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Width over height. 1 for a zero-height window.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new("Strata", 640, 480)
    }
}

/// The engine instance driven by a host's tick loop.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`] or [`Engine::with_capacities`]
/// 2. Register callbacks
/// 3. Call [`Engine::tick`] once per frame until [`Engine::is_quit_requested`]
pub struct Engine {
    database: SceneDatabase,
    keyboard: Keyboard,
    mouse: Mouse,
    window: Window,
    time: Time,

    mutating_callbacks: Vec<MutatingCallback>,
    non_mutating_callbacks: Vec<NonMutatingCallback>,
    tick_cleanup_callbacks: Vec<MutatingCallback>,
    quit_requested: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("window", &self.window)
            .field("time", &self.time)
            .field("mutating_callbacks", &self.mutating_callbacks.len())
            .field("non_mutating_callbacks", &self.non_mutating_callbacks.len())
            .field("tick_cleanup_callbacks", &self.tick_cleanup_callbacks.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine with the default table capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacities(&SceneCapacities::default())
    }

    #[must_use]
    pub fn with_capacities(capacities: &SceneCapacities) -> Self {
        let mut database = SceneDatabase::new();
        database.allocate(capacities);
        Self {
            database,
            keyboard: Keyboard::new(),
            mouse: Mouse::new(),
            window: Window::default(),
            time: Time::new(),
            mutating_callbacks: Vec::new(),
            non_mutating_callbacks: Vec::new(),
            tick_cleanup_callbacks: Vec::new(),
            quit_requested: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn database(&self) -> &SceneDatabase {
        &self.database
    }

    #[inline]
    pub fn database_mut(&mut self) -> &mut SceneDatabase {
        &mut self.database
    }

    #[inline]
    #[must_use]
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    #[inline]
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    #[inline]
    #[must_use]
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    #[inline]
    pub fn mouse_mut(&mut self) -> &mut Mouse {
        &mut self.mouse
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    #[inline]
    #[must_use]
    pub fn time(&self) -> &Time {
        &self.time
    }

    #[inline]
    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Asks the host to stop ticking.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    #[inline]
    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Registers a callback that runs every tick before the renderers and
    /// may change the scene database. Callback state is whatever the
    /// closure captures.
    pub fn add_mutating_callback(&mut self, callback: impl FnMut(&mut Engine) + 'static) {
        self.mutating_callbacks.push(Box::new(callback));
    }

    /// Registers a callback that runs every tick after all mutating
    /// callbacks. Renderers are registered here.
    pub fn add_non_mutating_callback(&mut self, callback: impl FnMut(&Engine) + 'static) {
        self.non_mutating_callbacks.push(Box::new(callback));
    }

    /// Registers a callback that runs at the end of every tick, before the
    /// database's change notifications are reset.
    pub fn add_tick_cleanup_callback(&mut self, callback: impl FnMut(&mut Engine) + 'static) {
        self.tick_cleanup_callbacks.push(Box::new(callback));
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs one tick after `raw_delta` seconds of real time.
    pub fn tick(&mut self, raw_delta: f32) {
        self.time.tick(raw_delta);

        let mut callbacks = mem::take(&mut self.mutating_callbacks);
        for callback in &mut callbacks {
            callback(self);
        }
        restore(&mut self.mutating_callbacks, callbacks);

        self.database.scene_nodes.update_global_transforms();

        let mut callbacks = mem::take(&mut self.non_mutating_callbacks);
        for callback in &mut callbacks {
            callback(&*self);
        }
        restore(&mut self.non_mutating_callbacks, callbacks);

        let mut callbacks = mem::take(&mut self.tick_cleanup_callbacks);
        for callback in &mut callbacks {
            callback(self);
        }
        restore(&mut self.tick_cleanup_callbacks, callbacks);

        self.database.reset_change_notifications();
        self.keyboard.end_tick();
        self.mouse.end_tick();

        log::trace!("Tick {} done ({:.4}s)", self.time.ticks(), raw_delta);
    }
}

/// Puts a dispatched queue back, keeping callbacks registered while it ran
/// after the existing ones.
fn restore<T>(queue: &mut Vec<T>, mut dispatched: Vec<T>) {
    dispatched.append(queue);
    *queue = dispatched;
}
