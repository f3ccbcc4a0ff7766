//! The orrery's settings, stored as `config.ron` in the config directory.
//!
//! Every section and field has a default, so a partial file loads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Free-fly camera settings.
    pub camera: CameraConfig,
    /// Simulation clock, scene content, and toggles.
    pub simulation: SimulationConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Logical pixels.
    pub width: u32,
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Present with Fifo.
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Color the frame is cleared to before anything is drawn (linear RGBA).
    pub clear_color: [f32; 4],
    /// Icosphere subdivision level for body meshes.
    pub sphere_subdivisions: u32,
    /// Number of line segments in an orbit circle.
    pub orbit_segments: u32,
    /// Label height as a fraction of the camera distance to the labelled body.
    pub label_scale: f32,
    /// Ambient light term applied to non-emissive bodies.
    pub ambient: f32,
}

/// Camera and controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial camera position in scene units.
    pub start_position: [f32; 3],
    /// Initial yaw in degrees (0 looks down -Z).
    pub start_yaw_deg: f32,
    /// Initial pitch in degrees.
    pub start_pitch_deg: f32,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Narrowest field of view reachable by zooming in.
    pub min_fov_deg: f32,
    /// Widest field of view reachable by zooming out.
    pub max_fov_deg: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Movement speed in scene units per second.
    pub move_speed: f32,
    /// Speed multiplier while Shift is held.
    pub boost_multiplier: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Invert vertical mouse look.
    pub invert_y: bool,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated Earth days per wall-clock second.
    pub days_per_second: f64,
    /// Multiplier applied per speed-up / slow-down key press.
    pub speed_step: f64,
    /// Lower bound on the magnitude of the speed factor.
    pub min_speed: f64,
    /// Upper bound on the magnitude of the speed factor.
    pub max_speed: f64,
    /// Start with simulated time frozen.
    pub start_paused: bool,
    /// Show floating name labels.
    pub show_labels: bool,
    /// Seed for asteroid/Kuiper belt layout.
    pub belt_seed: u64,
    /// Seed for the skybox starfield.
    pub starfield_seed: u64,
    /// Number of rocks in the asteroid belt.
    pub asteroid_count: u32,
    /// Number of rocks in the Kuiper belt.
    pub kuiper_count: u32,
    /// Optional RON body table replacing the built-in one.
    pub body_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Write JSON logs to the platform data directory in debug builds.
    pub log_to_file: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            sphere_subdivisions: 4,
            orbit_segments: 256,
            label_scale: 0.03,
            ambient: 0.08,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 60.0, 260.0],
            start_yaw_deg: 0.0,
            start_pitch_deg: -12.0,
            fov_deg: 45.0,
            min_fov_deg: 5.0,
            max_fov_deg: 90.0,
            near: 0.1,
            far: 20_000.0,
            move_speed: 40.0,
            boost_multiplier: 6.0,
            mouse_sensitivity: 0.003,
            invert_y: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days_per_second: 1.0,
            speed_step: 2.0,
            min_speed: 1.0 / 64.0,
            max_speed: 4096.0,
            start_paused: false,
            show_labels: true,
            belt_seed: 0x5eed_be17,
            starfield_seed: 42,
            asteroid_count: 2_000,
            kuiper_count: 4_000,
            body_table: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

/// Platform config directory for the orrery (`<config>/orrery`), if one exists.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orrery"))
}

const CONFIG_FILE: &str = "config.ron";

impl Config {
    /// Read `config.ron` from `config_dir`. When there is none, the defaults
    /// are written there and returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Config: {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    /// Write `config.ron`, creating `config_dir` first.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Re-read the file; `None` when it matches `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let new_config = read_config(&config_path)?;

        if &new_config != self {
            log::info!("Reloaded changed config from {}", config_path.display());
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("days_per_second: 1.0"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), render: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(simulation: (days_per_second: 10.0, show_labels: false))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.simulation.days_per_second, 10.0);
        assert!(!config.simulation.show_labels);
        assert_eq!(
            config.simulation.belt_seed,
            SimulationConfig::default().belt_seed
        );
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_body_table_path_roundtrips() {
        let mut config = Config::default();
        config.simulation.body_table = Some(PathBuf::from("bodies/custom.ron"));
        let ron_str = ron::to_string(&config).unwrap();
        let back: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(
            back.simulation.body_table,
            Some(PathBuf::from("bodies/custom.ron"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.simulation.start_paused = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.simulation.days_per_second = 30.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().simulation.days_per_second, 30.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "(window: (width: \"wide\"))").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        match &err {
            ConfigError::Parse { path, .. } => assert!(path.ends_with("config.ron")),
            other => panic!("expected a parse error, got {other:?}"),
        }
        assert!(err.to_string().contains("config.ron"));
    }
}
