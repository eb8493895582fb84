//! catstat - Chi-Square independence and Cramér's V reports
//!
//! A CLI tool that cross-tabulates two categorical columns of a CSV file,
//! tests them for independence and writes a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, CSV, configuration, etc.)
//!   2 - The analysis rejected the input (shape mismatch, degenerate table,
//!       numeric fault)

mod analysis;
mod cli;
mod config;
mod error;
mod input;
mod models;
mod report;

use analysis::{AssociationAnalyzer, ContingencyBuilder};
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use error::AnalysisError;
use models::AnalysisReport;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    // Initialize logging
    init_logging(&args);

    info!("catstat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(&args, Path::new(".")) {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(analysis_error) = e.downcast_ref::<AnalysisError>() {
                error!("Analysis rejected input: {}", analysis_error);
                eprintln!("\n❌ {}: {}", analysis_error.kind(), analysis_error);
                std::process::exit(2);
            }

            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .catstat.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize thresholds, missing-value handling and report options.");
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
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {}", e);
    }
}

/// Run the complete workflow: read, cross-tabulate, analyze, report.
///
/// `config_dir` is where `.catstat.toml` is looked up when `--config` is not given.
fn run_analysis(args: &Args, config_dir: &Path) -> Result<()> {
    let mut config = load_config(args, config_dir)?;
    config.merge_with_args(args);
    config.validate()?;

    let row_name = args.row_name();
    let column_name = args.column_name();
    let input_path = args
        .input
        .as_deref()
        .context("--input is required")?;

    // Step 1: Read the two columns
    let mut csv_options = input::CsvOptions::from(&config.table);
    csv_options.delimiter = args.delimiter_byte();
    let (rows, columns) = input::read_columns(input_path, row_name, column_name, &csv_options)?;

    // Step 2: Cross-tabulate and analyze
    let builder = ContingencyBuilder::new()
        .missing(config.table.missing)
        .order(config.table.order);
    let analyzer = AssociationAnalyzer::new(config.analysis.thresholds())
        .with_yates_correction(config.analysis.yates_correction);

    let (table, result) = analysis::analyze_columns(&builder, &analyzer, &rows, &columns)?;

    // Step 3: Render the report
    let chart_path = resolve_chart_path(args, &config);
    let summary = AnalysisReport {
        row_variable: row_name.to_string(),
        column_variable: column_name.to_string(),
        table,
        result,
        chart_path: chart_path.clone(),
        include_table: config.report.include_table,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&summary)?,
        OutputFormat::Markdown => report::generate_markdown_report(&summary),
    };

    if args.dry_run {
        print_summary(&summary);
        println!("\n✅ Dry run complete. No files were written.");
        return Ok(());
    }

    // Step 4: Write outputs
    let output_path = args.output.clone().unwrap_or_else(|| {
        report::default_report_path(row_name, column_name, args.format.extension())
    });
    report::write_report(&output_path, &output)?;

    if let Some(ref chart_data_path) = args.chart_data {
        report::save_chart_data(&summary.table, chart_data_path)?;
        println!("✅ Chart data saved to: {}", chart_data_path.display());
    }

    if !Path::new(&chart_path).exists() {
        warn!(
            "Chart image {} does not exist yet; the report references it anyway",
            chart_path
        );
    }

    print_summary(&summary);
    println!("\n✅ Report saved to: {}", output_path.display());

    Ok(())
}

/// Chart path from --chart, or the default name inside the configured directory.
fn resolve_chart_path(args: &Args, config: &Config) -> String {
    match args.chart {
        Some(ref chart) => chart.clone(),
        None => report::default_chart_path(
            args.row_name(),
            args.column_name(),
            config.report.chart_dir.as_deref(),
        )
        .to_string_lossy()
        .to_string(),
    }
}

/// Print a short console summary of the result.
fn print_summary(summary: &AnalysisReport) {
    let result = &summary.result;

    println!(
        "\n📊 {} vs {} ({} observations, {}x{} table)",
        summary.row_variable,
        summary.column_variable,
        result.observations(),
        summary.table.rows(),
        summary.table.columns()
    );
    println!(
        "   Chi-Square: {:.4} | p-value: {} | dof: {}",
        result.chi_square_statistic(),
        report::generator::format_p_value(result.p_value()),
        result.degrees_of_freedom()
    );
    println!(
        "   Cramér's V: {:.4} | Independence: {} | Strength: {}",
        result.cramers_v(),
        result.independence(),
        result.strength()
    );
}

/// Load configuration from file or use defaults.
///
/// A config file that exists but cannot be read or parsed is an error.
fn load_config(args: &Args, config_dir: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default(config_dir)? {
        Some(config) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
