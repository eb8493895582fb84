//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{CategoryOrder, MissingPolicy};
use clap::Parser;
use std::path::PathBuf;

/// catstat - Chi-Square and Cramér's V reports for categorical data
///
/// Tests whether two categorical columns of a CSV file are independent,
/// measures the strength of their association, and writes a Markdown (or
/// JSON) report referencing a stacked bar chart.
///
/// Examples:
///   catstat --input survey.csv --row Gender --column Purchase
///   catstat --input survey.csv --row Gender --column Purchase --significance 0.01
///   catstat --input survey.csv --row Region --column Plan --format json --include-table
///   catstat --input survey.csv --row Gender --column Purchase --dry-run
///   catstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file with a header row
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Column holding the row variable
    #[arg(short, long, value_name = "NAME", required_unless_present = "init_config")]
    pub row: Option<String>,

    /// Column holding the column variable
    #[arg(short = 'k', long, value_name = "NAME", required_unless_present = "init_config")]
    pub column: Option<String>,

    /// Output file path for the report
    ///
    /// Defaults to stat_analysis_<row>_vs_<column>.md (or .json).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Chart image referenced by the report
    ///
    /// Defaults to stacked_bar_<row>_vs_<column>.png. The chart itself is
    /// produced by an external tool.
    #[arg(long, value_name = "PATH")]
    pub chart: Option<String>,

    /// Write the chart's percentage table as CSV
    #[arg(long, value_name = "FILE")]
    pub chart_data: Option<PathBuf>,

    /// CSV field delimiter
    #[arg(long, default_value = ",", value_name = "CHAR")]
    pub delimiter: char,

    /// Significance level for the independence test
    #[arg(long, value_name = "ALPHA", env = "CATSTAT_SIGNIFICANCE")]
    pub significance: Option<f64>,

    /// Cramér's V at which an association counts as weak
    #[arg(long, value_name = "V")]
    pub weak: Option<f64>,

    /// Cramér's V at which an association counts as moderate
    #[arg(long, value_name = "V")]
    pub moderate: Option<f64>,

    /// Cramér's V at which an association counts as strong
    #[arg(long, value_name = "V")]
    pub strong: Option<f64>,

    /// Apply the Yates continuity correction to 2x2 tables
    #[arg(long)]
    pub yates: bool,

    /// Missing-value handling (drop, category)
    #[arg(long, value_name = "POLICY")]
    pub missing: Option<MissingPolicy>,

    /// Category order in the table (sorted, first-seen)
    #[arg(long, value_name = "ORDER")]
    pub order: Option<CategoryOrder>,

    /// Append the contingency table to the Markdown report
    #[arg(long)]
    pub include_table: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .catstat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Analyze and print a summary without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .catstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
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

impl OutputFormat {
    /// File extension for default output names.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(level) = self.significance {
            if !(level > 0.0 && level < 1.0) {
                return Err("Significance level must be between 0 and 1 (exclusive)".to_string());
            }
        }

        for (flag, value) in [
            ("--weak", self.weak),
            ("--moderate", self.moderate),
            ("--strong", self.strong),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{} must be between 0.0 and 1.0", flag));
                }
            }
        }

        if !self.delimiter.is_ascii() {
            return Err("Delimiter must be a single ASCII character".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if self.row.is_some() && self.row == self.column {
            return Err("--row and --column must name different columns".to_string());
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

    /// Row variable name (validated as present by clap).
    pub fn row_name(&self) -> &str {
        self.row.as_deref().unwrap_or("")
    }

    /// Column variable name (validated as present by clap).
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or("")
    }

    /// Delimiter as a CSV byte.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            row: Some("Gender".to_string()),
            column: Some("Purchase".to_string()),
            output: None,
            format: OutputFormat::Markdown,
            chart: None,
            chart_data: None,
            delimiter: ',',
            significance: None,
            weak: None,
            moderate: None,
            strong: None,
            yates: false,
            missing: None,
            order: None,
            include_table: false,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "catstat",
            "-i",
            "data.csv",
            "-r",
            "Gender",
            "-k",
            "Purchase",
            "--format",
            "json",
            "--order",
            "first-seen",
            "--missing",
            "drop",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("data.csv")));
        assert_eq!(args.row_name(), "Gender");
        assert_eq!(args.column_name(), "Purchase");
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.order, Some(CategoryOrder::FirstSeen));
        assert_eq!(args.missing, Some(MissingPolicy::Drop));
    }

    #[test]
    fn test_columns_required_without_init_config() {
        assert!(Args::try_parse_from(["catstat", "--input", "data.csv"]).is_err());
        assert!(Args::try_parse_from(["catstat", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_thresholds() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.significance = Some(0.0);
        assert!(args.validate().is_err());

        args.significance = Some(0.01);
        args.strong = Some(1.5);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_same_column() {
        let mut args = make_args();
        args.column = Some("Gender".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/data.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
