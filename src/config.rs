//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! nrc-export.toml file. It provides a centralized way to configure where
//! activity JSON is read from, where GPX files are written, and which
//! conversion policies apply.
//!
//! Every section is optional; anything left out takes its default value.
//!
//! ```toml
//! [input]
//! paths = ["activities"]
//! runs_only = true
//!
//! [output]
//! directory = "gpx_output"
//! creator = "nrc-exporter"
//!
//! [conversion]
//! duplicate_policy = "reject"
//! pairing_policy = "merge"
//! ```

use crate::align::PairingPolicy;
use crate::extract::DuplicatePolicy;
use crate::track::{ConvertOptions, DEFAULT_CREATOR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "nrc-export.toml";

/// Application configuration loaded from nrc-export.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where activity JSON documents come from
    pub input: InputConfig,
    /// Where GPX documents go
    pub output: OutputConfig,
    /// Conversion policies
    pub conversion: ConversionConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// JSON files, or directories whose `.json` entries are read
    pub paths: Vec<PathBuf>,
    /// Skip activities that are not runs, and manually logged runs
    pub runs_only: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one `<activity id>.gpx` per converted activity
    pub directory: PathBuf,
    /// Value of the GPX root `creator` attribute
    pub creator: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub pairing_policy: PairingPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            paths: vec![PathBuf::from("activities")],
            runs_only: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: PathBuf::from("gpx_output"),
            creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from nrc-export.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file format, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration to `path` as TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Conversion options derived from this configuration
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            duplicate_policy: self.conversion.duplicate_policy,
            pairing_policy: self.conversion.pairing_policy,
            creator: self.output.creator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.paths, vec![PathBuf::from("activities")]);
        assert!(!config.input.runs_only);
        assert_eq!(config.output.directory, PathBuf::from("gpx_output"));
        assert_eq!(config.output.creator, "nrc-exporter");
        assert_eq!(config.conversion.duplicate_policy, DuplicatePolicy::Last);
        assert_eq!(config.conversion.pairing_policy, PairingPolicy::Merge);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.conversion.pairing_policy = PairingPolicy::Strict;
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.conversion.pairing_policy, PairingPolicy::Strict);
        assert_eq!(parsed.output.directory, config.output.directory);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [conversion]
            duplicate_policy = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.conversion.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(parsed.conversion.pairing_policy, PairingPolicy::Merge);
        assert_eq!(parsed.output.creator, "nrc-exporter");
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.output.creator = "my-watch".to_string();
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded.output.creator, "my-watch");
        assert_eq!(loaded.convert_options().creator, "my-watch");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.output.directory, PathBuf::from("gpx_output"));
    }

    #[test]
    fn test_load_invalid_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[conversion]\npairing_policy = \"sideways\"\n").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.conversion.pairing_policy, PairingPolicy::Merge);
    }
}
