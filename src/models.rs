//! Data models for the association analysis.
//!
//! This module contains the core data structures that flow through the
//! pipeline: categorical columns, the contingency table, the analysis result
//! and the report value handed to the formatter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for missing values under [`MissingPolicy::Category`], unless
/// the column already holds this text as a real value.
pub const MISSING_LABEL: &str = "(missing)";

/// How missing values in either column are handled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Drop the whole observation pair when either side is missing.
    #[default]
    Drop,
    /// Count missing values under their own `(missing)` category.
    Category,
}

/// Order of row and column categories in the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryOrder {
    /// Lexicographic (byte-wise) order.
    #[default]
    Sorted,
    /// Order of first occurrence in the input.
    FirstSeen,
}

/// A named categorical variable, one value per observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalColumn {
    /// Variable name (CSV header).
    pub name: String,
    /// Observed labels; `None` marks a missing value.
    pub values: Vec<Option<String>>,
}

impl CategoricalColumn {
    /// Creates a column from labels that are all present.
    #[allow(dead_code)] // Used by in-memory callers and tests
    pub fn new<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    /// Creates a column that may contain missing values.
    pub fn with_missing(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Cross-tabulation of two categorical variables.
///
/// Counts are stored row-major; `counts[i][j]` is the number of observations
/// with row label `row_labels[i]` and column label `column_labels[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Builds a table from an explicit count matrix.
    ///
    /// Fails with `ShapeMismatch` if the matrix is not `rows x columns`.
    #[allow(dead_code)] // Entry point for pre-tabulated counts
    pub fn from_counts(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self, crate::error::AnalysisError> {
        if counts.len() != row_labels.len() {
            return Err(crate::error::AnalysisError::ShapeMismatch {
                rows: counts.len(),
                columns: row_labels.len(),
            });
        }
        if let Some(bad) = counts.iter().find(|r| r.len() != column_labels.len()) {
            return Err(crate::error::AnalysisError::ShapeMismatch {
                rows: bad.len(),
                columns: column_labels.len(),
            });
        }

        Ok(Self {
            row_labels,
            column_labels,
            counts,
        })
    }

    /// Shorthand for tests and callers that only care about counts; labels
    /// become `r0..` and `c0..`.
    #[allow(dead_code)]
    pub fn from_matrix(counts: Vec<Vec<u64>>) -> Result<Self, crate::error::AnalysisError> {
        let rows = counts.len();
        let cols = counts.first().map_or(0, Vec::len);
        Self::from_counts(
            (0..rows).map(|i| format!("r{}", i)).collect(),
            (0..cols).map(|j| format!("c{}", j)).collect(),
            counts,
        )
    }

    pub(crate) fn from_parts(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Self {
        Self {
            row_labels,
            column_labels,
            counts,
        }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Number of row categories (R).
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of column categories (C).
    pub fn columns(&self) -> usize {
        self.column_labels.len()
    }

    /// Count at a row/column index pair.
    pub fn count(&self, row: usize, column: usize) -> u64 {
        self.counts[row][column]
    }

    /// Count for a pair of labels; 0 if either label is unknown.
    #[allow(dead_code)] // Lookup by label for library callers
    pub fn get(&self, row: &str, column: &str) -> u64 {
        let i = self.row_labels.iter().position(|l| l == row);
        let j = self.column_labels.iter().position(|l| l == column);
        match (i, j) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.columns()];
        for row in &self.counts {
            for (j, &c) in row.iter().enumerate() {
                totals[j] += c;
            }
        }
        totals
    }

    /// Grand total of all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Expected frequencies under independence: `row_i * col_j / total`.
    ///
    /// Returns a zero matrix for an empty table.
    pub fn expected_frequencies(&self) -> Vec<Vec<f64>> {
        let total = self.total() as f64;
        let row_totals = self.row_totals();
        let column_totals = self.column_totals();

        row_totals
            .iter()
            .map(|&r| {
                column_totals
                    .iter()
                    .map(|&c| {
                        if total == 0.0 {
                            0.0
                        } else {
                            (r as f64) * (c as f64) / total
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Each cell as a percentage of the grand total (stacked bar heights).
    pub fn percent_of_total(&self) -> Vec<Vec<f64>> {
        let total = self.total();
        self.counts
            .iter()
            .map(|row| row.iter().map(|&c| percentage(c, total)).collect())
            .collect()
    }

    /// Each cell as a percentage of its row total (stacked bar labels).
    pub fn percent_of_row(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let row_total: u64 = row.iter().sum();
                row.iter().map(|&c| percentage(c, row_total)).collect()
            })
            .collect()
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Outcome of the independence test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Independence {
    /// p-value at or below the significance level.
    Significant,
    NotSignificant,
}

impl fmt::Display for Independence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Independence::Significant => write!(f, "Significant"),
            Independence::NotSignificant => write!(f, "Not significant"),
        }
    }
}

/// Strength of association derived from Cramér's V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::None => write!(f, "None"),
            Strength::Weak => write!(f, "Weak"),
            Strength::Moderate => write!(f, "Moderate"),
            Strength::Strong => write!(f, "Strong"),
        }
    }
}

/// Result of one association analysis. Built once by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationResult {
    chi_square_statistic: f64,
    p_value: f64,
    degrees_of_freedom: usize,
    cramers_v: f64,
    independence: Independence,
    strength: Strength,
    observations: u64,
    significance_level: f64,
    yates_corrected: bool,
    low_expected_cells: usize,
}

/// Raw values the analyzer hands to [`AssociationResult::new`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResultParts {
    pub chi_square_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub cramers_v: f64,
    pub independence: Independence,
    pub strength: Strength,
    pub observations: u64,
    pub significance_level: f64,
    pub yates_corrected: bool,
    pub low_expected_cells: usize,
}

impl AssociationResult {
    pub(crate) fn new(parts: ResultParts) -> Self {
        Self {
            chi_square_statistic: parts.chi_square_statistic,
            p_value: parts.p_value,
            degrees_of_freedom: parts.degrees_of_freedom,
            cramers_v: parts.cramers_v,
            independence: parts.independence,
            strength: parts.strength,
            observations: parts.observations,
            significance_level: parts.significance_level,
            yates_corrected: parts.yates_corrected,
            low_expected_cells: parts.low_expected_cells,
        }
    }

    pub fn chi_square_statistic(&self) -> f64 {
        self.chi_square_statistic
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    pub fn cramers_v(&self) -> f64 {
        self.cramers_v
    }

    pub fn independence(&self) -> Independence {
        self.independence
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Grand total of the analyzed table.
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Significance level the independence conclusion was drawn at.
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Whether the Yates continuity correction was applied.
    pub fn yates_corrected(&self) -> bool {
        self.yates_corrected
    }

    /// Cells with an expected frequency below 5.
    #[allow(dead_code)] // Serialized with the result; getter for library callers
    pub fn low_expected_cells(&self) -> usize {
        self.low_expected_cells
    }
}

/// Everything the formatter needs to render one report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Name of the row variable.
    pub row_variable: String,
    /// Name of the column variable.
    pub column_variable: String,
    /// The analyzed table.
    pub table: ContingencyTable,
    /// Statistical result.
    pub result: AssociationResult,
    /// Path of the externally generated chart image.
    pub chart_path: String,
    /// Append the contingency table section to Markdown output.
    #[serde(skip)]
    pub include_table: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_table_totals() {
        let table = ContingencyTable::from_matrix(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.columns(), 3);
        assert_eq!(table.row_totals(), vec![6, 15]);
        assert_eq!(table.column_totals(), vec![5, 7, 9]);
        assert_eq!(table.total(), 21);
        assert_eq!(table.get("r1", "c2"), 6);
        assert_eq!(table.get("r9", "c2"), 0);
    }

    #[test]
    fn test_from_counts_rejects_ragged_matrix() {
        let err = ContingencyTable::from_counts(
            vec!["a".to_string(), "b".to_string()],
            vec!["x".to_string(), "y".to_string()],
            vec![vec![1, 2], vec![3]],
        )
        .unwrap_err();
        assert_eq!(err, AnalysisError::ShapeMismatch { rows: 1, columns: 2 });

        let err = ContingencyTable::from_counts(
            vec!["a".to_string()],
            vec!["x".to_string()],
            vec![vec![1], vec![2]],
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_expected_frequencies() {
        let table = ContingencyTable::from_matrix(vec![vec![10, 20], vec![30, 40]]).unwrap();
        let expected = table.expected_frequencies();
        assert!((expected[0][0] - 12.0).abs() < 1e-12);
        assert!((expected[0][1] - 18.0).abs() < 1e-12);
        assert!((expected[1][0] - 28.0).abs() < 1e-12);
        assert!((expected[1][1] - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentages() {
        let table = ContingencyTable::from_matrix(vec![vec![1, 3], vec![0, 0]]).unwrap();
        assert_eq!(table.percent_of_total()[0], vec![25.0, 75.0]);
        assert_eq!(table.percent_of_row()[0], vec![25.0, 75.0]);
        assert_eq!(table.percent_of_row()[1], vec![0.0, 0.0]);
    }

    #[test]
    fn test_column_missing_count() {
        let column = CategoricalColumn::with_missing(
            "Gender",
            vec![Some("M".to_string()), None, Some("F".to_string())],
        );
        assert_eq!(column.len(), 3);
        assert_eq!(column.missing_count(), 1);
        assert!(!column.is_empty());
    }

    #[test]
    fn test_strength_ordering() {
        assert!(Strength::None < Strength::Weak);
        assert!(Strength::Weak < Strength::Moderate);
        assert!(Strength::Moderate < Strength::Strong);
    }
}
