//! Window events buffered between frames.
//!
//! Event-loop callbacks only push [`InputEvent`]s. The frame drains them, in
//! arrival order, into an [`InputState`] before anything reads input.

use std::collections::VecDeque;

use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::keyboard::{KeyboardState, RawKeyEvent};
use crate::mouse::MouseState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(RawKeyEvent),
    MouseButton {
        button: MouseButton,
        state: ElementState,
    },
    CursorMoved {
        x: f64,
        y: f64,
    },
    /// Device-level motion, independent of cursor position.
    RawMotion {
        dx: f64,
        dy: f64,
    },
    Wheel(MouseScrollDelta),
    CursorEntered,
    CursorLeft,
    /// Window lost focus; held keys and buttons will never see a release.
    FocusLost,
}

/// Keyboard and mouse state as of the last drain.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => self.keyboard.process_raw(key),
            InputEvent::MouseButton { button, state } => self.mouse.on_button(button, state),
            InputEvent::CursorMoved { x, y } => self.mouse.on_cursor_moved(x, y),
            InputEvent::RawMotion { dx, dy } => self.mouse.on_raw_motion(dx, dy),
            InputEvent::Wheel(delta) => self.mouse.on_scroll(delta),
            InputEvent::CursorEntered => self.mouse.on_cursor_entered(),
            InputEvent::CursorLeft => self.mouse.on_cursor_left(),
            InputEvent::FocusLost => {
                self.keyboard.release_all();
                self.mouse.release_all();
            }
        }
    }

    /// End-of-frame reset of edge flags, motion, and wheel.
    pub fn clear_transients(&mut self) {
        self.keyboard.clear_transients();
        self.mouse.clear_transients();
    }
}

/// FIFO of events received since the last frame.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Apply every pending event to `state` in arrival order. Returns how
    /// many were applied.
    pub fn drain_into(&mut self, state: &mut InputState) -> usize {
        let count = self.events.len();
        for event in self.events.drain(..) {
            state.apply(event);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use winit::keyboard::KeyCode;

    fn key(code: KeyCode, state: ElementState) -> InputEvent {
        InputEvent::Key(RawKeyEvent::code(code, state))
    }

    #[test]
    fn test_drain_applies_in_order_and_empties() {
        let mut queue = InputQueue::new();
        queue.push(key(KeyCode::KeyP, ElementState::Pressed));
        queue.push(key(KeyCode::KeyP, ElementState::Released));
        queue.push(InputEvent::CursorMoved { x: 5.0, y: 5.0 });
        queue.push(InputEvent::CursorMoved { x: 8.0, y: 1.0 });
        assert_eq!(queue.len(), 4);

        let mut state = InputState::new();
        assert_eq!(queue.drain_into(&mut state), 4);
        assert!(queue.is_empty());
        assert!(state.keyboard.just_pressed(KeyCode::KeyP));
        assert!(!state.keyboard.is_pressed(KeyCode::KeyP));
        assert_eq!(state.mouse.delta(), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_nothing_applies_until_drained() {
        let mut queue = InputQueue::new();
        let mut state = InputState::new();
        queue.push(key(KeyCode::KeyW, ElementState::Pressed));
        assert!(!state.keyboard.is_pressed(KeyCode::KeyW));
        queue.drain_into(&mut state);
        assert!(state.keyboard.is_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_focus_lost_releases_everything() {
        let mut queue = InputQueue::new();
        let mut state = InputState::new();
        queue.push(key(KeyCode::KeyW, ElementState::Pressed));
        queue.push(InputEvent::MouseButton {
            button: MouseButton::Right,
            state: ElementState::Pressed,
        });
        queue.drain_into(&mut state);
        state.clear_transients();

        queue.push(InputEvent::FocusLost);
        queue.drain_into(&mut state);
        assert!(!state.keyboard.is_pressed(KeyCode::KeyW));
        assert!(!state.mouse.is_button_pressed(MouseButton::Right));
    }

    #[test]
    fn test_wheel_and_cursor_enter() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::Wheel(MouseScrollDelta::LineDelta(0.0, -2.0)));
        queue.push(InputEvent::CursorEntered);
        let mut state = InputState::new();
        assert_eq!(queue.drain_into(&mut state), 2);
        assert_eq!(state.mouse.scroll(), -2.0);
        assert!(state.mouse.is_cursor_in_window());
    }
}
