//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.catstat.toml` files.

use crate::analysis::{
    Thresholds, DEFAULT_MODERATE_THRESHOLD, DEFAULT_SIGNIFICANCE_LEVEL, DEFAULT_STRONG_THRESHOLD,
    DEFAULT_WEAK_THRESHOLD,
};
use crate::models::{CategoryOrder, MissingPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".catstat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Statistical settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Contingency table settings.
    #[serde(default)]
    pub table: TableConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Classification thresholds and test options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// p-value at or below which the result is significant.
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,

    /// Lower bound of a weak association (Cramér's V).
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: f64,

    /// Lower bound of a moderate association.
    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold: f64,

    /// Lower bound of a strong association.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,

    /// Apply the Yates continuity correction to 2x2 tables.
    #[serde(default)]
    pub yates_correction: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: default_significance_level(),
            weak_threshold: default_weak_threshold(),
            moderate_threshold: default_moderate_threshold(),
            strong_threshold: default_strong_threshold(),
            yates_correction: false,
        }
    }
}

fn default_significance_level() -> f64 {
    DEFAULT_SIGNIFICANCE_LEVEL
}

fn default_weak_threshold() -> f64 {
    DEFAULT_WEAK_THRESHOLD
}

fn default_moderate_threshold() -> f64 {
    DEFAULT_MODERATE_THRESHOLD
}

fn default_strong_threshold() -> f64 {
    DEFAULT_STRONG_THRESHOLD
}

impl AnalysisConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            significance_level: self.significance_level,
            weak: self.weak_threshold,
            moderate: self.moderate_threshold,
            strong: self.strong_threshold,
        }
    }
}

/// How the contingency table is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Missing-value handling.
    #[serde(default)]
    pub missing: MissingPolicy,

    /// Category order.
    #[serde(default)]
    pub order: CategoryOrder,

    /// Cell values read as missing.
    #[serde(default = "default_missing_tokens")]
    pub missing_tokens: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            missing: MissingPolicy::default(),
            order: CategoryOrder::default(),
            missing_tokens: default_missing_tokens(),
        }
    }
}

pub fn default_missing_tokens() -> Vec<String> {
    vec!["", "NA", "NaN", "null", "None"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Append the contingency table to Markdown reports.
    #[serde(default)]
    pub include_table: bool,

    /// Directory the default chart path points into.
    #[serde(default)]
    pub chart_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.catstat.toml` from `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default(dir: &Path) -> Result<Option<Self>> {
        let default_path = dir.join(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(&default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(level) = args.significance {
            self.analysis.significance_level = level;
        }
        if let Some(weak) = args.weak {
            self.analysis.weak_threshold = weak;
        }
        if let Some(moderate) = args.moderate {
            self.analysis.moderate_threshold = moderate;
        }
        if let Some(strong) = args.strong {
            self.analysis.strong_threshold = strong;
        }
        if args.yates {
            self.analysis.yates_correction = true;
        }

        if let Some(missing) = args.missing {
            self.table.missing = missing;
        }
        if let Some(order) = args.order {
            self.table.order = order;
        }

        if args.include_table {
            self.report.include_table = true;
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.analysis
            .thresholds()
            .validate()
            .map_err(anyhow::Error::msg)
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
        assert_eq!(config.analysis.significance_level, 0.05);
        assert_eq!(config.analysis.weak_threshold, 0.1);
        assert_eq!(config.analysis.moderate_threshold, 0.3);
        assert_eq!(config.analysis.strong_threshold, 0.5);
        assert!(!config.analysis.yates_correction);
        assert_eq!(config.table.missing, MissingPolicy::Drop);
        assert_eq!(config.table.order, CategoryOrder::Sorted);
        assert!(config.table.missing_tokens.contains(&"NA".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[analysis]
significance_level = 0.01
strong_threshold = 0.6
yates_correction = true

[table]
missing = "category"
order = "first-seen"
missing_tokens = ["", "?"]

[report]
include_table = true
chart_dir = "charts"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.analysis.significance_level, 0.01);
        assert_eq!(config.analysis.weak_threshold, 0.1);
        assert_eq!(config.analysis.strong_threshold, 0.6);
        assert!(config.analysis.yates_correction);
        assert_eq!(config.table.missing, MissingPolicy::Category);
        assert_eq!(config.table.order, CategoryOrder::FirstSeen);
        assert_eq!(config.table.missing_tokens, vec!["", "?"]);
        assert!(config.report.include_table);
        assert_eq!(config.report.chart_dir, Some(PathBuf::from("charts")));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let config: Config = toml::from_str("[analysis]\nweak_threshold = 0.7\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::try_parse_from([
            "catstat",
            "--input",
            "data.csv",
            "--row",
            "Gender",
            "--column",
            "Purchase",
            "--significance",
            "0.1",
            "--missing",
            "category",
            "--yates",
        ])
        .unwrap();

        let mut config: Config = toml::from_str("[table]\norder = \"first-seen\"\n").unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.analysis.significance_level, 0.1);
        assert_eq!(config.analysis.strong_threshold, 0.5);
        assert!(config.analysis.yates_correction);
        assert_eq!(config.table.missing, MissingPolicy::Category);
        // Not given on the command line, so the file wins.
        assert_eq!(config.table.order, CategoryOrder::FirstSeen);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[analysis]\nsignificance_level = 0.02\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.significance_level, 0.02);

        std::fs::write(&path, "[analysis\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_default_in_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load_default(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[table]\norder = \"first-seen\"\n").unwrap();
        let config = Config::load_default(dir.path()).unwrap().unwrap();
        assert_eq!(config.table.order, CategoryOrder::FirstSeen);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis]\nweak_threshold = \"x\"\n").unwrap();
        assert!(Config::load_default(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[table]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.analysis.significance_level, 0.05);
    }
}
