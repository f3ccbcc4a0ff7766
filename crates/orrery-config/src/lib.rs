//! Configuration system for the orrery.
//!
//! Runtime settings persist to disk as RON. CLI flags override the loaded
//! file, and `Config::reload` detects edits made while the app is running.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, RenderConfig, SimulationConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
