//! Platform-agnostic input snapshots.
//!
//! The host translates its window events into [`Keyboard`] and [`Mouse`]
//! updates between ticks. At the end of every tick the engine clears the
//! per-tick edge state, so `was_pressed` / `was_released` report the
//! transitions that happened since the previous tick.

use glam::IVec2;
use rustc_hash::{FxHashMap, FxHashSet};

/// Keyboard key enumeration (platform-agnostic)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    // Letter keys
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Number keys
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Control keys
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,

    // Modifier keys
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,

    // Arrow keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Punctuation
    Comma,
    Period,
    Slash,
    Backslash,
    Semicolon,
    Quote,
    BracketLeft,
    BracketRight,
    Minus,
    Equal,
    Grave,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
    NumpadEnter,
}

impl Key {
    fn modifier(self) -> Modifiers {
        match self {
            Key::ShiftLeft | Key::ShiftRight => Modifiers::SHIFT,
            Key::ControlLeft | Key::ControlRight => Modifiers::CONTROL,
            Key::AltLeft | Key::AltRight => Modifiers::ALT,
            Key::SuperLeft | Key::SuperRight => Modifiers::SUPER,
            _ => Modifiers::empty(),
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Mouse button enumeration
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Pressed state and per-tick transition count of a set of buttons.
#[derive(Debug, Clone)]
struct ButtonStates<B> {
    pressed: FxHashSet<B>,
    // Number of state changes since the start of the tick.
    halftaps: FxHashMap<B, u8>,
}

impl<B> Default for ButtonStates<B> {
    fn default() -> Self {
        Self {
            pressed: FxHashSet::default(),
            halftaps: FxHashMap::default(),
        }
    }
}

impl<B: Copy + Eq + std::hash::Hash> ButtonStates<B> {
    fn set(&mut self, button: B, state: ButtonState) {
        let changed = match state {
            ButtonState::Pressed => self.pressed.insert(button),
            ButtonState::Released => self.pressed.remove(&button),
        };
        if changed {
            let halftaps = self.halftaps.entry(button).or_insert(0);
            *halftaps = halftaps.saturating_add(1);
        }
    }

    fn is_pressed(&self, button: B) -> bool {
        self.pressed.contains(&button)
    }

    fn halftaps(&self, button: B) -> u8 {
        self.halftaps.get(&button).copied().unwrap_or(0)
    }

    fn end_tick(&mut self) {
        self.halftaps.clear();
    }
}

// ============================================================================
// Keyboard
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    keys: ButtonStates<Key>,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-tick transition counts. Called by the engine at the
    /// end of every tick.
    pub fn end_tick(&mut self) {
        self.keys.end_tick();
    }

    /// Injects a key event
    pub fn set_key(&mut self, key: Key, state: ButtonState) {
        self.keys.set(key, state);
    }

    /// Checks whether a key is currently held down
    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.is_pressed(key)
    }

    /// Checks whether a key went down this tick and is still held
    #[must_use]
    pub fn was_pressed(&self, key: Key) -> bool {
        self.is_pressed(key) && self.halftaps(key) > 0
    }

    /// Checks whether a key went up this tick and is still up
    #[must_use]
    pub fn was_released(&self, key: Key) -> bool {
        !self.is_pressed(key) && self.halftaps(key) > 0
    }

    /// Number of times the key changed state this tick.
    #[must_use]
    pub fn halftaps(&self, key: Key) -> u8 {
        self.keys.halftaps(key)
    }

    /// The modifier keys currently held.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.keys
            .pressed
            .iter()
            .fold(Modifiers::empty(), |modifiers, key| modifiers | key.modifier())
    }

    /// True if any modifier key is held.
    #[must_use]
    pub fn is_modifiers_pressed(&self) -> bool {
        !self.modifiers().is_empty()
    }
}

// ============================================================================
// Mouse
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Mouse {
    buttons: ButtonStates<MouseButton>,
    position: Option<IVec2>,
    delta: IVec2,
    scroll_delta: f32,
}

impl Mouse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears transitions, movement and scroll. Called by the engine at the
    /// end of every tick.
    pub fn end_tick(&mut self) {
        self.buttons.end_tick();
        self.delta = IVec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn set_button(&mut self, button: MouseButton, state: ButtonState) {
        self.buttons.set(button, state);
    }

    /// Moves the cursor to `position` in window pixels. The first position
    /// reported does not produce a delta.
    pub fn set_position(&mut self, position: IVec2) {
        if let Some(previous) = self.position {
            self.delta += position - previous;
        }
        self.position = Some(position);
    }

    pub fn add_scroll_delta(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    #[must_use]
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.is_pressed(button)
    }

    #[must_use]
    pub fn was_pressed(&self, button: MouseButton) -> bool {
        self.is_pressed(button) && self.buttons.halftaps(button) > 0
    }

    #[must_use]
    pub fn was_released(&self, button: MouseButton) -> bool {
        !self.is_pressed(button) && self.buttons.halftaps(button) > 0
    }

    #[must_use]
    pub fn halftaps(&self, button: MouseButton) -> u8 {
        self.buttons.halftaps(button)
    }

    /// Last reported cursor position, or the origin before any movement.
    #[must_use]
    pub fn position(&self) -> IVec2 {
        self.position.unwrap_or(IVec2::ZERO)
    }

    /// Cursor movement in pixels since the start of the tick.
    #[must_use]
    pub fn delta(&self) -> IVec2 {
        self.delta
    }

    #[must_use]
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}
