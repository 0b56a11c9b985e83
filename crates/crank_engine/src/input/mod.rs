//! Input management system
//!
//! [`InputState`] keeps per-frame, edge-triggered key and mouse button state
//! fed from backend events. [`PointerState`] turns the primary button and
//! the cursor position into hover/press/release callbacks for a node.

mod pointer;

pub use pointer::{MouseEvent, PointerState};

use std::collections::HashMap;

use crate::foundation::math::Vec2;

/// Input state, rebuilt from backend events once per frame
#[derive(Debug, Clone)]
pub struct InputState {
    keys_down: HashMap<KeyCode, bool>,
    keys_pressed: HashMap<KeyCode, bool>,
    keys_released: HashMap<KeyCode, bool>,

    buttons_down: HashMap<MouseButton, bool>,
    buttons_pressed: HashMap<MouseButton, bool>,
    buttons_released: HashMap<MouseButton, bool>,

    /// Cursor position in drawable pixels, unknown until the first motion
    mouse_position: Option<Vec2>,

    /// Window-to-drawable scale applied to cursor coordinates
    dpi_scale: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Create an input state with nothing held
    pub fn new() -> Self {
        Self {
            keys_down: HashMap::new(),
            keys_pressed: HashMap::new(),
            keys_released: HashMap::new(),
            buttons_down: HashMap::new(),
            buttons_pressed: HashMap::new(),
            buttons_released: HashMap::new(),
            mouse_position: None,
            dpi_scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Begin new frame (resets the pressed/released-this-frame maps)
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
    }

    /// Set the scale applied to incoming cursor coordinates
    pub fn set_dpi_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.dpi_scale = Vec2::new(scale_x, scale_y);
    }

    /// Record a key going down; key repeats do not count as a new press
    pub fn handle_key_down(&mut self, key: KeyCode) {
        if !self.is_key_down(key) {
            self.keys_pressed.insert(key, true);
        }
        self.keys_down.insert(key, true);
    }

    /// Record a key going up
    pub fn handle_key_up(&mut self, key: KeyCode) {
        self.keys_down.insert(key, false);
        self.keys_pressed.insert(key, false);
        self.keys_released.insert(key, true);
    }

    /// Record a mouse button going down
    pub fn handle_mouse_down(&mut self, button: MouseButton) {
        if !self.is_mouse_down(button) {
            self.buttons_pressed.insert(button, true);
        }
        self.buttons_down.insert(button, true);
    }

    /// Record a mouse button going up
    pub fn handle_mouse_up(&mut self, button: MouseButton) {
        self.buttons_down.insert(button, false);
        self.buttons_pressed.insert(button, false);
        self.buttons_released.insert(button, true);
    }

    /// Record cursor movement in window coordinates
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        self.mouse_position = Some(Vec2::new(x * self.dpi_scale.x, y * self.dpi_scale.y));
    }

    /// Whether the key is currently held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        flag(&self.keys_down, key)
    }

    /// Whether the key went down this frame
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        flag(&self.keys_pressed, key)
    }

    /// Whether the key went up this frame
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        flag(&self.keys_released, key)
    }

    /// Whether the button is currently held
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        flag(&self.buttons_down, button)
    }

    /// Whether the button went down this frame
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        flag(&self.buttons_pressed, button)
    }

    /// Whether the button went up this frame
    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        flag(&self.buttons_released, button)
    }

    /// Cursor position in drawable pixels, `None` before the cursor has moved
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }
}

fn flag<K: std::hash::Hash + Eq>(map: &HashMap<K, bool>, key: K) -> bool {
    map.get(&key).copied().unwrap_or(false)
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Any other key, by backend key code
    Other(u32),
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// Extra buttons, by backend index
    Other(u8),
}

impl MouseButton {
    /// The button that drives node hover/press/release callbacks
    pub const PRIMARY: MouseButton = MouseButton::Left;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_is_edge_triggered() {
        let mut input = InputState::new();

        input.begin_frame();
        input.handle_key_down(KeyCode::W);
        assert!(input.is_key_down(KeyCode::W));
        assert!(input.is_key_pressed(KeyCode::W));

        // Held into the next frame, with a key repeat
        input.begin_frame();
        input.handle_key_down(KeyCode::W);
        assert!(input.is_key_down(KeyCode::W));
        assert!(!input.is_key_pressed(KeyCode::W));

        input.begin_frame();
        input.handle_key_up(KeyCode::W);
        assert!(!input.is_key_down(KeyCode::W));
        assert!(input.is_key_released(KeyCode::W));

        input.begin_frame();
        assert!(!input.is_key_released(KeyCode::W));
    }

    #[test]
    fn test_mouse_buttons_tracked_independently() {
        let mut input = InputState::new();

        input.begin_frame();
        input.handle_mouse_down(MouseButton::Right);
        assert!(input.is_mouse_pressed(MouseButton::Right));
        assert!(!input.is_mouse_pressed(MouseButton::PRIMARY));

        input.begin_frame();
        input.handle_mouse_up(MouseButton::Right);
        assert!(input.is_mouse_released(MouseButton::Right));
        assert!(!input.is_mouse_down(MouseButton::Right));
    }

    #[test]
    fn test_cursor_is_unknown_until_it_moves() {
        let mut input = InputState::new();
        assert_eq!(input.mouse_position(), None);

        input.handle_mouse_down(MouseButton::PRIMARY);
        assert_eq!(input.mouse_position(), None);

        input.handle_mouse_move(0.0, 0.0);
        assert_eq!(input.mouse_position(), Some(Vec2::zeros()));
    }

    #[test]
    fn test_mouse_position_is_dpi_scaled() {
        let mut input = InputState::new();
        input.set_dpi_scale(2.0, 1.5);
        input.handle_mouse_move(10.0, 10.0);

        assert_eq!(input.mouse_position(), Some(Vec2::new(20.0, 15.0)));
    }
}
