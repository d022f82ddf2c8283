//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// TourStat - analytics and popularity forecasting for tour operators
///
/// Reads a JSON snapshot of tours, contacts, applications and enrollments
/// and produces distribution, ratio and forecast reports.
///
/// Examples:
///   tourstat --data data.json
///   tourstat --data data.json --report predictive --format json --stdout
///   tourstat --data data.json --report overview --today 2025-05-01
///   tourstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON snapshot file with the entity records
    ///
    /// Defaults to the `[data] path` setting of the config file.
    #[arg(short, long, value_name = "FILE", env = "TOURSTAT_DATA")]
    pub data: Option<PathBuf>,

    /// Which report to produce
    #[arg(short, long, default_value = "full", value_name = "KIND")]
    pub report: ReportKind,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    ///
    /// Defaults to the `[general] output` setting of the config file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tourstat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enrollments needed for a client to count as regular
    #[arg(long, value_name = "COUNT")]
    pub threshold: Option<usize>,

    /// Number of months to forecast
    #[arg(long, value_name = "MONTHS")]
    pub horizon: Option<u32>,

    /// Only count active enrollments
    #[arg(long)]
    pub active_only: bool,

    /// Reference date for tour availability (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .tourstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportKind {
    /// Distributions and client ratios
    Analysis,
    /// Seasonal demand, preferences and popularity forecast
    Predictive,
    /// Both bundles in one timestamped report (default)
    #[default]
    Full,
    /// Headline entity counts
    Overview,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(threshold) = self.threshold {
            if threshold == 0 {
                return Err("Regular client threshold must be at least 1".to_string());
            }
        }

        if let Some(horizon) = self.horizon {
            if horizon == 0 {
                return Err("Forecast horizon must be at least 1 month".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
