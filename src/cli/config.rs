//! Configuration management for tuflow-review
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.tuflow_review/config.toml

use crate::analysis::ConvergenceConfig;
use crate::errors::{ReviewError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration for tuflow-review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub convergence: ConvergenceConfig,
    pub output: OutputConfig,
    pub review: ReviewConfig,
}

/// Files written next to each log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub write_plots: bool,
    pub plot_width: f64,
    pub plot_height: f64,
}

/// Run log review settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Initials recorded in the modeler column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modeler: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_plots: true,
            plot_width: 700.0,
            plot_height: 500.0,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ReviewError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ReviewError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tuflow_review").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.convergence.validate()?;

        let dims = [self.output.plot_width, self.output.plot_height];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(ReviewError::ConfigError(
                "plot_width and plot_height must be greater than 0".to_string(),
            ));
        }

        if let Some(modeler) = &self.review.modeler {
            if modeler.contains(['\n', '\r']) {
                return Err(ReviewError::ConfigError(
                    "modeler must be a single line".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReviewError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ReviewError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ReviewError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.convergence.window_size, 500);
        assert_eq!(config.convergence.slope_threshold, 0.01);
        assert_eq!(config.convergence.volume_tolerance, 1);
        assert!(config.output.write_plots);
        assert!(config.review.modeler.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_window() {
        let mut config = Config::default();
        config.convergence.window_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_threshold() {
        let mut config = Config::default();
        config.convergence.slope_threshold = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_plot_size() {
        let mut config = Config::default();
        config.output.plot_height = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[convergence]\nwindow_size = 200\n\n[review]\nmodeler = \"JS\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.convergence.window_size, 200);
        assert_eq!(config.convergence.slope_threshold, 0.01);
        assert_eq!(config.review.modeler.as_deref(), Some("JS"));
        assert!(config.output.write_plots);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[convergence]\nwindow_size = 0\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ReviewError::ConfigError(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.write_plots = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}
