//! Contingency table construction.
//!
//! Cross-tabulates two categorical columns into a [`ContingencyTable`].
//! Only categories actually observed on each axis become rows/columns;
//! combinations that never occur are counted as 0.

use crate::error::AnalysisError;
use crate::models::{
    CategoricalColumn, CategoryOrder, ContingencyTable, MissingPolicy, MISSING_LABEL,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds contingency tables from paired categorical observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContingencyBuilder {
    missing: MissingPolicy,
    order: CategoryOrder,
}

impl ContingencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how missing values are handled.
    pub fn missing(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Set the order of row/column categories.
    pub fn order(mut self, order: CategoryOrder) -> Self {
        self.order = order;
        self
    }

    /// Cross-tabulate two columns.
    ///
    /// Both columns must have the same, non-zero length. The resulting table
    /// may still be degenerate (a single category, or no pairs left after
    /// dropping missing values); the analyzer rejects those.
    pub fn build(
        &self,
        rows: &CategoricalColumn,
        columns: &CategoricalColumn,
    ) -> Result<ContingencyTable, AnalysisError> {
        if rows.len() != columns.len() || rows.is_empty() {
            return Err(AnalysisError::ShapeMismatch {
                rows: rows.len(),
                columns: columns.len(),
            });
        }

        let (row_missing, column_missing) = match self.missing {
            MissingPolicy::Category => (missing_label(rows), missing_label(columns)),
            MissingPolicy::Drop => (String::new(), String::new()),
        };

        let mut row_axis = Axis::default();
        let mut column_axis = Axis::default();
        let mut cells: HashMap<(usize, usize), u64> = HashMap::new();
        let mut dropped = 0usize;

        for (r, c) in rows.values.iter().zip(&columns.values) {
            let resolved = (
                self.resolve(r, &row_missing),
                self.resolve(c, &column_missing),
            );
            let (r, c) = match resolved {
                (Some(r), Some(c)) => (r, c),
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            let i = row_axis.index_of(r);
            let j = column_axis.index_of(c);
            *cells.entry((i, j)).or_insert(0) += 1;
        }

        let (row_labels, row_map) = row_axis.finish(self.order);
        let (column_labels, column_map) = column_axis.finish(self.order);

        let mut counts = vec![vec![0u64; column_labels.len()]; row_labels.len()];
        for ((i, j), n) in cells {
            counts[row_map[i]][column_map[j]] = n;
        }

        debug!(
            "Built {}x{} table for {} vs {} ({} observations dropped as missing)",
            row_labels.len(),
            column_labels.len(),
            rows.name,
            columns.name,
            dropped
        );

        Ok(ContingencyTable::from_parts(row_labels, column_labels, counts))
    }

    fn resolve<'a>(&self, value: &'a Option<String>, missing: &'a str) -> Option<&'a str> {
        match (value, self.missing) {
            (Some(v), _) => Some(v.as_str()),
            (None, MissingPolicy::Category) => Some(missing),
            (None, MissingPolicy::Drop) => None,
        }
    }
}

/// Label for missing values of `column` that no observed value uses.
///
/// Normally [`MISSING_LABEL`]; a numeric suffix is added when the column
/// already holds that text as a real category.
fn missing_label(column: &CategoricalColumn) -> String {
    let taken = |label: &str| column.values.iter().flatten().any(|v| v == label);

    if !taken(MISSING_LABEL) {
        return MISSING_LABEL.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{} {}", MISSING_LABEL, n);
        if !taken(&candidate) {
            warn!(
                "Column {} already contains the value {:?}; missing values are labelled {:?}",
                column.name, MISSING_LABEL, candidate
            );
            return candidate;
        }
        n += 1;
    }
}

/// Category labels of one axis in first-seen order.
#[derive(Default)]
struct Axis<'a> {
    labels: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Axis<'a> {
    fn index_of(&mut self, label: &'a str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.labels.len();
        self.labels.push(label);
        self.index.insert(label, i);
        i
    }

    /// Final labels plus a map from first-seen index to output position.
    fn finish(self, order: CategoryOrder) -> (Vec<String>, Vec<usize>) {
        let mut positions: Vec<usize> = (0..self.labels.len()).collect();
        if order == CategoryOrder::Sorted {
            positions.sort_by(|&a, &b| self.labels[a].cmp(self.labels[b]));
        }

        let mut map = vec![0usize; self.labels.len()];
        for (out, &seen) in positions.iter().enumerate() {
            map[seen] = out;
        }

        let labels = positions
            .iter()
            .map(|&seen| self.labels[seen].to_string())
            .collect();
        (labels, map)
    }
}
