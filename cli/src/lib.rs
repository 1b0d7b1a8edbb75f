use footprint::FootprintCommand;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Batch configuration lists no targets")]
    NoTargets,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One FITS file to measure and what to do with it
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Target {
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    pub operation: FootprintCommand,
}

/// Batch configuration: targets are measured independently and reported in order
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatchConfig {
    /// Show warnings for non-standard WCS headers
    #[serde(default)]
    pub show_wcs_warnings: bool,
    pub targets: Vec<Target>,
}

impl BatchConfig {
    /// Load BatchConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load BatchConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        let config: BatchConfig = toml::from_str(content)?;
        config.validated()
    }

    /// Load BatchConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load BatchConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        let config: BatchConfig = serde_json::from_str(content)?;
        config.validated()
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert BatchConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    fn validated(self) -> Result<Self, CliError> {
        if self.targets.is_empty() {
            return Err(CliError::NoTargets);
        }
        Ok(self)
    }
}
