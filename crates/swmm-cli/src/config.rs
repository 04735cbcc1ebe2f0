//! CLI configuration, read from `~/.swmm/config.toml` or `--config`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swmm_io::{ExportOptions, ImportOptions};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SwmmConfig {
    #[serde(default)]
    pub import: ImportOptions,
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `~/.swmm/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Cannot determine home directory"))
        .map(|h| h.join(".swmm").join("config.toml"))
}

impl SwmmConfig {
    /// Load `path`, or the default location when `path` is `None`. Only a
    /// missing default file falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("Invalid log level '{}' in config", self.logging.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default_independently() {
        let config: SwmmConfig = toml::from_str(
            r#"
[import]
crs = "EPSG:4326"

[export]
column_width = 20
"#,
        )
        .unwrap();
        assert_eq!(config.import.crs, "EPSG:4326");
        assert_eq!(config.import.annotation_field, "Description");
        assert_eq!(config.export.column_width, 20);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SwmmConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_invalid_level() {
        let mut config = SwmmConfig::default();
        config.logging.level = "loud".into();
        assert!(config.log_level().is_err());
    }
}
