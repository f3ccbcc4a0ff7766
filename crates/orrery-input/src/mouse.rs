//! Mouse state for one frame.
//!
//! Position, motion delta, buttons, and wheel are accumulated while the input
//! queue drains and queried by the camera controller afterwards.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        MouseButton::Back => 3,
        MouseButton::Forward | MouseButton::Other(_) => 4,
    }
}

/// Convert a winit wheel delta to lines, positive away from the user.
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}

/// Cursor position, motion, buttons, and wheel for the current frame.
///
/// While the cursor is captured (held right button look), motion comes from
/// raw device deltas and `CursorMoved` only updates the position. Otherwise
/// motion is the difference between successive cursor positions.
#[derive(Debug, Clone)]
pub struct MouseState {
    position: Vec2,
    has_position: bool,
    delta: Vec2,
    buttons: [ButtonFrame; 5],
    scroll: f32,
    captured: bool,
    cursor_in_window: bool,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            has_position: false,
            delta: Vec2::ZERO,
            buttons: [ButtonFrame::default(); 5],
            scroll: 0.0,
            captured: false,
            cursor_in_window: false,
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        // The first reported position is a jump from nowhere, not motion.
        if !self.captured && self.has_position {
            self.delta += new_pos - self.position;
        }
        self.position = new_pos;
        self.has_position = true;
    }

    /// Raw device motion; only counted while captured.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let frame = &mut self.buttons[button_index(button)];
        match state {
            ElementState::Pressed => {
                frame.pressed = true;
                frame.just_pressed = true;
            }
            ElementState::Released => {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += scroll_lines(delta);
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.has_position = false;
    }

    /// Grab and hide the cursor on `window`, or release it.
    ///
    /// Tries `Locked` first and falls back to `Confined` on platforms that
    /// cannot lock.
    pub fn set_captured(&mut self, window: &winit::window::Window, captured: bool) {
        use winit::window::CursorGrabMode;
        if captured {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::Locked) {
                log::debug!("Cursor lock unavailable ({e}), confining instead");
                if let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined) {
                    log::warn!("Failed to grab cursor: {e}");
                }
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("Failed to release cursor: {e}");
        }
        window.set_cursor_visible(!captured);
        self.set_capture_flag(captured);
    }

    /// Change how motion is measured without touching a window.
    pub fn set_capture_flag(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Release every button, e.g. on focus loss.
    pub fn release_all(&mut self) {
        for b in &mut self.buttons {
            if b.pressed {
                b.pressed = false;
                b.just_released = true;
            }
        }
    }

    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Motion accumulated this frame, in pixels.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].pressed
    }

    #[must_use]
    pub fn just_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_pressed
    }

    #[must_use]
    pub fn just_button_released(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_released
    }

    /// Wheel lines this frame, positive away from the user.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}
