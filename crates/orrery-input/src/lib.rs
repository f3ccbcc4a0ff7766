//! Keyboard and mouse input, queued by the window and drained once per frame.

pub mod keyboard;
pub mod mouse;
pub mod queue;

pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::{MouseState, scroll_lines};
pub use queue::{InputEvent, InputQueue, InputState};
