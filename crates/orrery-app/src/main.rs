//! `orrery`: a real-time Solar System.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `orrery --speed 30 --paused`. F5 re-reads the file while
//! running.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::AppDirs;
use orrery_config::{CliArgs, Config};
use orrery_orbit::BodyTable;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match AppDirs::resolve(args.config.as_deref()) {
        Ok(dirs) => Some(dirs),
        Err(e) => {
            eprintln!("{e}, running without a config file");
            None
        }
    };

    let mut config = match &dirs {
        Some(dirs) => Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs.as_ref().and_then(|dirs| match dirs.create_dirs() {
        Ok(()) => Some(dirs.log_dir.clone()),
        Err(e) => {
            eprintln!("{e}, file logging disabled");
            None
        }
    });
    orrery_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let Some(table) = load_body_table(&config) else {
        return ExitCode::FAILURE;
    };

    let config_dir = dirs.map(|dirs| dirs.config_dir);
    match orrery_app::run(config, config_dir, table) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// The configured table, falling back to the built-in Solar System when it
/// cannot be loaded.
fn load_body_table(config: &Config) -> Option<BodyTable> {
    if let Some(path) = &config.simulation.body_table {
        match BodyTable::load(path) {
            Ok(table) => {
                info!("Loaded {} bodies from {}", table.len(), path.display());
                return Some(table);
            }
            Err(e) => error!("Body table {}: {e}; using the built-in table", path.display()),
        }
    }
    match BodyTable::builtin() {
        Ok(table) => Some(table),
        Err(e) => {
            error!("Built-in body table is invalid: {e}");
            None
        }
    }
}
