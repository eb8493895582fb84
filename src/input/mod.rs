//! Reading categorical columns from CSV files.
//!
//! This module turns two named columns of a headered CSV file into
//! [`CategoricalColumn`]s. Cells are trimmed; cells matching one of the
//! configured missing tokens become missing values.

use crate::models::CategoricalColumn;
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Settings for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Cell values treated as missing (after trimming).
    pub missing_tokens: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_tokens: crate::config::default_missing_tokens(),
        }
    }
}

impl From<&crate::config::TableConfig> for CsvOptions {
    fn from(config: &crate::config::TableConfig) -> Self {
        Self {
            delimiter: b',',
            missing_tokens: config.missing_tokens.clone(),
        }
    }
}

/// Read two columns from a CSV file.
pub fn read_columns(
    path: &Path,
    row_column: &str,
    column_column: &str,
    options: &CsvOptions,
) -> Result<(CategoricalColumn, CategoricalColumn)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let columns = read_columns_from(file, row_column, column_column, options)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    info!(
        "Read {} observations of `{}` and `{}` from {}",
        columns.0.len(),
        row_column,
        column_column,
        path.display()
    );
    Ok(columns)
}

/// Read two columns from any CSV source.
pub fn read_columns_from<R: io::Read>(
    reader: R,
    row_column: &str,
    column_column: &str,
    options: &CsvOptions,
) -> Result<(CategoricalColumn, CategoricalColumn)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let row_index = find_header(&headers, row_column)?;
    let column_index = find_header(&headers, column_column)?;

    let mut row_values = Vec::new();
    let mut column_values = Vec::new();

    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        row_values.push(cell(&record, row_index, options));
        column_values.push(cell(&record, column_index, options));
    }

    let rows = CategoricalColumn::with_missing(row_column, row_values);
    let columns = CategoricalColumn::with_missing(column_column, column_values);

    debug!(
        "Missing values: {} in `{}`, {} in `{}`",
        rows.missing_count(),
        row_column,
        columns.missing_count(),
        column_column
    );

    Ok((rows, columns))
}

fn find_header(headers: &[String], name: &str) -> Result<usize> {
    match headers.iter().position(|h| h == name) {
        Some(index) => Ok(index),
        None => bail!(
            "Column `{}` not found. Available columns: {}",
            name,
            headers.join(", ")
        ),
    }
}

fn cell(record: &csv::StringRecord, index: usize, options: &CsvOptions) -> Option<String> {
    let value = record.get(index)?;
    if options.missing_tokens.iter().any(|token| token == value) {
        None
    } else {
        Some(value.to_string())
    }
}
