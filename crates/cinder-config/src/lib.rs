//! Configuration management for Cinder
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (CINDER_* prefix, `__` between sections)
//! 2. cinder.local.toml (gitignored, local overrides)
//! 3. cinder.toml (git-tracked, project config)
//! 4. ~/.config/cinder/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! The `[io]` section deserializes straight into [`cinder_io::HandleOptions`].

use anyhow::Result;
use cinder_io::HandleOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Cinder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinderConfig {
    pub io: HandleOptions,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub segment_extension: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cinder/data"),
            segment_extension: "dat".to_string(),
        }
    }
}

impl DataConfig {
    /// Path of segment `segment_num` inside the data directory.
    pub fn segment_path(&self, segment_num: u32) -> PathBuf {
        self.dir.join(format!(
            "segment_{segment_num:06}.{}",
            self.segment_extension
        ))
    }
}

impl CinderConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, ignoring every other source.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the file handle cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io.zero_fill_chunk == 0 {
            return Err(ConfigError::ValidationError(
                "io.zero_fill_chunk must be greater than zero".to_string(),
            ));
        }
        if self.io.default_mode > 0o7777 {
            return Err(ConfigError::ValidationError(format!(
                "io.default_mode {:#o} has bits outside 0o7777",
                self.io.default_mode
            )));
        }
        if self.data.segment_extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "data.segment_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        if self.data.dir.is_relative() {
            self.data.dir = base_dir.as_ref().join(&self.data.dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_io::SparseExtend;

    #[test]
    fn test_default_config() {
        let config = CinderConfig::default();
        assert!(!config.io.sync_on_close);
        assert_eq!(config.io.sparse_extend, SparseExtend::Native);
        assert_eq!(config.io.default_mode, 0o600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_segment_path() {
        let data = DataConfig {
            dir: PathBuf::from("/var/lib/cinder"),
            segment_extension: "idx".to_string(),
        };
        assert_eq!(
            data.segment_path(12),
            PathBuf::from("/var/lib/cinder/segment_000012.idx")
        );
    }

    #[test]
    fn test_validation_rejects_zero_chunk() {
        let mut config = CinderConfig::default();
        config.io.zero_fill_chunk = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_wide_mode() {
        let mut config = CinderConfig::default();
        config.io.default_mode = 0o100_644;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("standalone.toml");
        std::fs::write(
            &path,
            r#"
[io]
sparse_extend = "zero-fill"
zero_fill_chunk = 4096
"#,
        )
        .expect("Failed to write config");

        let config = CinderConfig::from_file(&path).expect("Failed to load config");
        assert_eq!(config.io.sparse_extend, SparseExtend::ZeroFill);
        assert_eq!(config.io.zero_fill_chunk, 4096);
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            CinderConfig::from_file(&missing),
            Err(ConfigError::ReadError { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "[io\nsync_on_close = ").expect("Failed to write config");
        assert!(matches!(
            CinderConfig::from_file(&broken),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_path_resolution() {
        let mut config = CinderConfig::default();
        config.resolve_paths("/home/user/project");
        assert_eq!(
            config.data.dir,
            PathBuf::from("/home/user/project/.cinder/data")
        );
    }
}
