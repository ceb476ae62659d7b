//! Pipeline configuration.
//!
//! A JSON file describes where the example maps come from, how the
//! generator runs and where results go:
//!
//! ```json
//! {
//!   "inputs": { "dir": "maps" },
//!   "generator": { "pattern_size": 3, "out_width": 32, "out_height": 24, "seed": 12345 },
//!   "output": { "csv": "out/cavern.csv", "png": "out/cavern.png" }
//! }
//! ```
//!
//! Missing fields take their defaults; `validate` runs after loading.

use crate::rng::RngKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for catalog building and solving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Pattern size N (clamped to at least 1)
    pub pattern_size: usize,
    /// Wrap at the input borders while extracting patterns
    pub periodic_input: bool,
    /// Output width in pattern cells
    pub out_width: usize,
    /// Output height in pattern cells
    pub out_height: usize,
    /// `None` draws a fresh seed per generation
    pub seed: Option<i32>,
    /// Solver runs before giving up; 1 means fail fast
    pub attempts: usize,
    pub rng: RngKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pattern_size: 3,
            periodic_input: true,
            out_width: 20,
            out_height: 20,
            seed: Some(12345),
            attempts: 1,
            rng: RngKind::Dotnet,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern_size == 0 {
            return Err(ConfigError::Invalid("pattern_size must be at least 1".into()));
        }
        if self.out_width == 0 || self.out_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "output size {}x{} must be at least 1x1",
                self.out_width, self.out_height
            )));
        }
        if self.attempts == 0 {
            return Err(ConfigError::Invalid("attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Where example maps are read from. All listed maps merge into one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Individual CSV files
    pub files: Vec<PathBuf>,
    /// Directory whose `*.csv` files are all loaded
    pub dir: Option<PathBuf>,
}

impl InputConfig {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dir.is_none()
    }
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Generated grid as CSV
    pub csv: Option<PathBuf>,
    /// CSV preceded by a difficulty label line
    pub labeled: Option<PathBuf>,
    /// PNG preview
    pub png: Option<PathBuf>,
    /// Pixels per tile in the PNG preview
    pub pixel_size: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: None,
            labeled: None,
            png: None,
            pixel_size: 8,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inputs: InputConfig,
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON config string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        if self.output.pixel_size == 0 {
            return Err(ConfigError::Invalid("pixel_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.pattern_size, 3);
        assert!(config.periodic_input);
        assert_eq!((config.out_width, config.out_height), (20, 20));
        assert_eq!(config.seed, Some(12345));
        assert_eq!(config.attempts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "inputs": { "dir": "maps" },
                "generator": { "pattern_size": 2, "seed": null, "rng": "std" },
                "output": { "csv": "out.csv" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.inputs.dir, Some(PathBuf::from("maps")));
        assert!(config.inputs.files.is_empty());
        assert_eq!(config.generator.pattern_size, 2);
        assert_eq!(config.generator.seed, None);
        assert_eq!(config.generator.rng, RngKind::Std);
        assert_eq!(config.generator.out_width, 20);
        assert_eq!(config.output.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(config.output.pixel_size, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "generator": { "out_width": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PipelineConfig::from_json_str(r#"{ "generator": { "attempts": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PipelineConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cavern.json");
        std::fs::write(&path, r#"{ "generator": { "out_height": 7 } }"#).unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.generator.out_height, 7);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            PipelineConfig::from_json_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
