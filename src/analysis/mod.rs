//! Statistical core: contingency tables and association measures.

pub mod association;
pub mod contingency;

pub use association::*;
pub use contingency::*;

use crate::error::AnalysisError;
use crate::models::{AssociationResult, CategoricalColumn, ContingencyTable};

/// Cross-tabulate two columns and analyze the resulting table.
pub fn analyze_columns(
    builder: &ContingencyBuilder,
    analyzer: &AssociationAnalyzer,
    rows: &CategoricalColumn,
    columns: &CategoricalColumn,
) -> Result<(ContingencyTable, AssociationResult), AnalysisError> {
    let table = builder.build(rows, columns)?;
    let result = analyzer.analyze(&table)?;
    Ok((table, result))
}
