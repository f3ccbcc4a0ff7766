//! Camera and simulation controls driven by keyboard and mouse state.

pub mod free_fly;
pub mod sim_controls;

pub use free_fly::FreeFlyController;
pub use sim_controls::{ControlOutcome, SimAction, SimControls};
