//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Real-time Solar System visualization")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Simulated days per second.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Start with simulated time paused.
    #[arg(long)]
    pub paused: bool,

    /// Show or hide name labels.
    #[arg(long)]
    pub labels: Option<bool>,

    /// Seed for the asteroid and Kuiper belt layout.
    #[arg(long)]
    pub belt_seed: Option<u64>,

    /// RON body table replacing the built-in Solar System.
    #[arg(long)]
    pub bodies: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(speed) = args.speed {
            self.simulation.days_per_second = speed;
        }
        if args.paused {
            self.simulation.start_paused = true;
        }
        if let Some(labels) = args.labels {
            self.simulation.show_labels = labels;
        }
        if let Some(seed) = args.belt_seed {
            self.simulation.belt_seed = seed;
        }
        if let Some(ref path) = args.bodies {
            self.simulation.body_table = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
