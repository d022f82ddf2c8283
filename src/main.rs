//! TourStat - analytics and popularity forecasting for tour operators
//!
//! A CLI front end that reads a JSON snapshot of tour operator data and
//! writes analysis, predictive, full or overview reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, unreadable or invalid data file, write failure)

use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tourstat::cli::{Args, OutputFormat, ReportKind};
use tourstat::config::{Config, CONFIG_FILE_NAME};
use tourstat::report::{self, ReportAssembler};
use tourstat::JsonFileStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("TourStat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .tourstat.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the data path, thresholds and forecast horizon.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the requested report and write it out.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    info!("Reading entity data from {}", config.data.path.display());
    let store = JsonFileStore::new(config.data.path.clone());
    let assembler = ReportAssembler::new(store, config.analysis_settings());

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let output = match (args.report, args.format) {
        (ReportKind::Analysis, OutputFormat::Json) => {
            report::generate_json_report(&assembler.get_analysis_bundle().await?)?
        }
        (ReportKind::Analysis, OutputFormat::Markdown) => {
            report::generator::generate_analysis_section(&assembler.get_analysis_bundle().await?)
        }
        (ReportKind::Predictive, OutputFormat::Json) => {
            report::generate_json_report(&assembler.get_predictive_bundle().await?)?
        }
        (ReportKind::Predictive, OutputFormat::Markdown) => {
            report::generator::generate_predictive_section(
                &assembler.get_predictive_bundle().await?,
            )
        }
        (ReportKind::Full, OutputFormat::Json) => {
            report::generate_json_report(&assembler.get_full_report().await?)?
        }
        (ReportKind::Full, OutputFormat::Markdown) => {
            report::generate_markdown_report(&assembler.get_full_report().await?)
        }
        (ReportKind::Overview, OutputFormat::Json) => {
            report::generate_json_report(&assembler.get_overview(today).await?)?
        }
        (ReportKind::Overview, OutputFormat::Markdown) => {
            report::generate_overview_markdown(&assembler.get_overview(today).await?)
        }
    };

    if args.stdout {
        println!("{}", output);
    } else {
        let path = &config.general.output;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        println!("✅ Report saved to: {}", path.display());
    }

    info!(
        "Generated {:?} report in {:.2}s",
        args.report,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
