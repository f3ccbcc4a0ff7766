//! Where the orrery keeps its config file and logs.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Config and log directories for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// The `--config` override if given, otherwise the platform location.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        let config_dir = match config_override {
            Some(dir) => dir.to_path_buf(),
            None => orrery_config::default_config_dir().ok_or(PlatformError::NoConfigDir)?,
        };
        Ok(Self::rooted_at(&config_dir))
    }

    /// Directories with logs under `config_dir/logs`.
    pub fn rooted_at(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dirs = AppDirs::resolve(Some(Path::new("/tmp/orrery-test"))).unwrap();
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/orrery-test"));
        assert_eq!(dirs.log_dir, Path::new("/tmp/orrery-test").join("logs"));
    }

    #[test]
    fn test_platform_dir_ends_with_app_name() {
        if let Ok(dirs) = AppDirs::resolve(None) {
            assert!(dirs.config_dir.ends_with("orrery"));
            assert!(dirs.config_dir.is_absolute());
        }
    }

    #[test]
    fn test_create_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::rooted_at(&tmp.path().join("nested").join("orrery"));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }
}
