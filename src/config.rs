//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tourstat.toml` files.

use crate::analysis::aggregator::DEFAULT_REGULAR_THRESHOLD;
use crate::analysis::forecast::ForecastSettings;
use crate::report::AnalysisSettings;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".tourstat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Forecast settings.
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("tourstat_report.md")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON snapshot file with the entity records.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("tourstat_data.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Enrollments needed for a contact to count as regular.
    #[serde(default = "default_threshold")]
    pub regular_client_threshold: usize,

    /// Only count active enrollments.
    #[serde(default)]
    pub active_enrollments_only: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            regular_client_threshold: default_threshold(),
            active_enrollments_only: false,
        }
    }
}

fn default_threshold() -> usize {
    DEFAULT_REGULAR_THRESHOLD
}

/// Popularity forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Months forecast past the last historical month.
    #[serde(default = "default_horizon")]
    pub horizon: u32,

    /// Trailing points used to estimate growth.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Historical points required before forecasting.
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            window: default_window(),
            min_history: default_min_history(),
        }
    }
}

fn default_horizon() -> u32 {
    ForecastSettings::default().horizon
}

fn default_window() -> usize {
    ForecastSettings::default().window
}

fn default_min_history() -> usize {
    ForecastSettings::default().min_history
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check the numeric limits the aggregators and forecaster rely on.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.analysis.regular_client_threshold >= 1,
            "analysis.regular_client_threshold must be at least 1"
        );
        ensure!(
            self.forecast.horizon >= 1,
            "forecast.horizon must be at least 1 month"
        );
        ensure!(
            self.forecast.window >= 2,
            "forecast.window must cover at least 2 points"
        );
        ensure!(
            self.forecast.min_history >= 1,
            "forecast.min_history must be at least 1"
        );
        Ok(())
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings when given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(threshold) = args.threshold {
            self.analysis.regular_client_threshold = threshold;
        }
        if let Some(horizon) = args.horizon {
            self.forecast.horizon = horizon;
        }

        // Flags always override
        if args.active_only {
            self.analysis.active_enrollments_only = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Settings for the report assembler.
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            regular_client_threshold: self.analysis.regular_client_threshold,
            active_enrollments_only: self.analysis.active_enrollments_only,
            forecast: ForecastSettings {
                horizon: self.forecast.horizon,
                window: self.forecast.window,
                min_history: self.forecast.min_history,
            },
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.regular_client_threshold, 3);
        assert_eq!(config.forecast.horizon, 3);
        assert_eq!(config.data.path, PathBuf::from("tourstat_data.json"));
        assert_eq!(config.analysis_settings(), AnalysisSettings::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "reports/weekly.md"
verbose = true

[data]
path = "exports/snapshot.json"

[analysis]
regular_client_threshold = 5

[forecast]
horizon = 6
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, PathBuf::from("reports/weekly.md"));
        assert!(config.general.verbose);
        assert_eq!(config.data.path, PathBuf::from("exports/snapshot.json"));
        assert_eq!(config.analysis.regular_client_threshold, 5);
        assert!(!config.analysis.active_enrollments_only);
        assert_eq!(config.forecast.horizon, 6);
        assert_eq!(config.forecast.window, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[forecast]\nmin_history = 4\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.forecast.min_history, 4);

        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(Config::default().validate().is_ok());

        let config: Config =
            toml::from_str("[analysis]\nregular_client_threshold = 0\n[forecast]\nhorizon = 0")
                .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("regular_client_threshold"));

        let config: Config = toml::from_str("[forecast]\nhorizon = 0").unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("horizon"));

        let config: Config = toml::from_str("[forecast]\nwindow = 1").unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("window"));

        let config: Config = toml::from_str("[forecast]\nmin_history = 0").unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("min_history"));
    }

    #[test]
    fn test_load_rejects_invalid_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[analysis]\nregular_client_threshold = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("regular_client_threshold must be at least 1"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::try_parse_from([
            "tourstat",
            "--threshold",
            "4",
            "--horizon",
            "2",
            "--active-only",
            "--output",
            "out.json",
        ])
        .unwrap();

        config.merge_with_args(&args);

        let settings = config.analysis_settings();
        assert_eq!(settings.regular_client_threshold, 4);
        assert_eq!(settings.forecast.horizon, 2);
        assert!(settings.active_enrollments_only);
        assert_eq!(config.general.output, PathBuf::from("out.json"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[forecast]"));
    }
}
