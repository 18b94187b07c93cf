/// Application configuration management
/// Stores user preferences in ~/.config/intperf/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::SamplingConfig;
use crate::utils::{
    DEFAULT_COMMAND_TEMPLATE, DEFAULT_INTERVAL_INCREMENT_SECS, DEFAULT_SCALE, DEFAULT_UNIT_LABEL,
    DEFAULT_WAIT_SLICE_MS,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Divisor applied to bits/sec
    pub scale: Option<f64>,
    pub unit_label: Option<String>,
    pub interval_increment_secs: Option<f64>,
    pub wait_slice_ms: Option<u64>,
    /// Directory that relative log file names are placed under
    pub log_directory: Option<PathBuf>,
    /// Directory for the diagnostic trace log
    pub trace_directory: Option<PathBuf>,
    /// Argv template for device commands
    pub command: Option<Vec<String>>,
}

impl AppConfig {
    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine the user config directory")?
            .join("intperf");
        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from the default location; a missing file means defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Rate scaling and loop tunables with defaults filled in
    pub fn sampling(&self) -> Result<SamplingConfig> {
        let increment = self
            .interval_increment_secs
            .unwrap_or(DEFAULT_INTERVAL_INCREMENT_SECS);
        let increment = Duration::try_from_secs_f64(increment)
            .with_context(|| format!("Invalid interval_increment_secs: {}", increment))?;

        let config = SamplingConfig {
            scale: self.scale.unwrap_or(DEFAULT_SCALE),
            unit_label: self
                .unit_label
                .clone()
                .unwrap_or_else(|| DEFAULT_UNIT_LABEL.to_string()),
            interval_increment: increment,
            wait_slice: Duration::from_millis(self.wait_slice_ms.unwrap_or(DEFAULT_WAIT_SLICE_MS)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn command_template(&self) -> Vec<String> {
        self.command.clone().unwrap_or_else(|| {
            DEFAULT_COMMAND_TEMPLATE
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    /// Where the trace log goes: configured, else the user data directory
    pub fn trace_directory(&self) -> PathBuf {
        self.trace_directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("intperf").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        let sampling = config.sampling().unwrap();
        assert_eq!(sampling, SamplingConfig::default());
        assert_eq!(config.command_template(), vec!["vsh", "-c", "{cmd} | json"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "scale = 1000.0").unwrap();
        writeln!(file, "unit_label = \"Kbps\"").unwrap();
        writeln!(file, "interval_increment_secs = 0.5").unwrap();
        writeln!(file, "log_directory = \"/bootflash\"").unwrap();
        writeln!(file, "command = [\"ssh\", \"switch1\", \"{{cmd}} | json\"]").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        let sampling = config.sampling().unwrap();
        assert_eq!(sampling.scale, 1000.0);
        assert_eq!(sampling.unit_label, "Kbps");
        assert_eq!(sampling.interval_increment, Duration::from_millis(500));
        assert_eq!(sampling.wait_slice, Duration::from_millis(200));
        assert_eq!(config.log_directory, Some(PathBuf::from("/bootflash")));
        assert_eq!(config.command_template(), vec!["ssh", "switch1", "{cmd} | json"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = AppConfig {
            scale: Some(-1.0),
            ..AppConfig::default()
        };
        assert!(config.sampling().is_err());

        let config = AppConfig {
            interval_increment_secs: Some(-2.0),
            ..AppConfig::default()
        };
        assert!(config.sampling().is_err());
    }

    #[test]
    fn test_unparseable_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "scale = \"lots\"").unwrap();
        assert!(AppConfig::load_from(file.path()).is_err());
    }
}
