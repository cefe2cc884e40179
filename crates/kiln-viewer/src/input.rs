//! Input state management

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Tracks keyboard and mouse input state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,

    /// Mouse button state (button index -> pressed)
    mouse_buttons_down: HashSet<u32>,
    /// Mouse buttons pressed this frame
    mouse_buttons_just_pressed: HashSet<u32>,

    /// Current mouse position in window pixels
    pub mouse_position: (f64, f64),
    /// Raw accumulated mouse delta (for cursor-locked mode)
    raw_mouse_delta: (f64, f64),
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_buttons_just_pressed: HashSet::new(),
            mouse_position: (0.0, 0.0),
            raw_mouse_delta: (0.0, 0.0),
        }
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Process mouse button press
    pub fn process_mouse_button_down(&mut self, button: u32) {
        if !self.mouse_buttons_down.contains(&button) {
            self.mouse_buttons_just_pressed.insert(button);
        }
        self.mouse_buttons_down.insert(button);
    }

    /// Process mouse button release
    pub fn process_mouse_button_up(&mut self, button: u32) {
        self.mouse_buttons_down.remove(&button);
    }

    /// Process mouse movement (cursor position mode)
    pub fn process_mouse_move(&mut self, x: f64, y: f64) {
        self.mouse_position = (x, y);
    }

    /// Process raw mouse delta (device motion, for locked cursor)
    pub fn process_mouse_raw_delta(&mut self, dx: f64, dy: f64) {
        self.raw_mouse_delta.0 += dx;
        self.raw_mouse_delta.1 += dy;
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.mouse_buttons_just_pressed.clear();
        self.raw_mouse_delta = (0.0, 0.0);
    }

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Was a key pressed this frame?
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Is a mouse button currently held?
    pub fn is_mouse_button_down(&self, button: u32) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Was a mouse button pressed this frame?
    pub fn is_mouse_button_just_pressed(&self, button: u32) -> bool {
        self.mouse_buttons_just_pressed.contains(&button)
    }

    /// Get the raw mouse delta (accumulated device motion)
    pub fn raw_mouse_delta(&self) -> (f64, f64) {
        self.raw_mouse_delta
    }
}
