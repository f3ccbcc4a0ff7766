//! The orrery application: window, event loop, and the per-frame driver.

pub mod frame_timer;
pub mod orrery;
pub mod platform;
pub mod window;

pub use frame_timer::{FrameTimer, MAX_FRAME_TIME};
pub use orrery::{FrameOutcome, Orrery};
pub use platform::{AppDirs, PlatformError};
pub use window::{AppState, run};
