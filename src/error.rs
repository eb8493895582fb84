//! Error types for the statistical core.
//!
//! Glue code (config, CSV, file writes) uses `anyhow`; the analysis itself
//! reports failures through [`AnalysisError`] so callers can tell a rejected
//! input apart from an I/O problem.

use thiserror::Error;

/// Failure of the contingency/association pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Column lengths differ, a column is empty, or a count matrix is not
    /// rectangular.
    #[error("{}", shape_message(.rows, .columns))]
    ShapeMismatch { rows: usize, columns: usize },

    /// Fewer than two categories on an axis, or no observations at all.
    #[error(
        "contingency table is degenerate: {rows} row categories x {columns} column categories, {total} observations (need at least 2x2 with a non-zero total)"
    )]
    DegenerateTable {
        rows: usize,
        columns: usize,
        total: u64,
    },

    /// Internal consistency fault in the Chi-Square computation.
    #[error("numeric instability: {detail}")]
    NumericInstability { detail: String },
}

fn shape_message(rows: &usize, columns: &usize) -> String {
    if *rows == 0 && *columns == 0 {
        "input has no observations: both columns are empty".to_string()
    } else if *rows == 0 || *columns == 0 {
        format!(
            "a column is empty: {} row values vs {} column values",
            rows, columns
        )
    } else {
        format!(
            "column lengths do not match: {} row values vs {} column values",
            rows, columns
        )
    }
}

impl AnalysisError {
    /// Stable name of the error kind, printed by the CLI.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ShapeMismatch { .. } => "ShapeMismatchError",
            AnalysisError::DegenerateTable { .. } => "DegenerateTableError",
            AnalysisError::NumericInstability { .. } => "NumericInstabilityFault",
        }
    }
}
