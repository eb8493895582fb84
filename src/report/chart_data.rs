//! Percentage table for an external stacked bar chart renderer.
//!
//! Bar segment heights are each cell's share of the grand total; segment
//! labels are each cell's share of its row.

use crate::models::ContingencyTable;
use anyhow::{Context, Result};
use csv::Writer;
use std::io;
use std::path::Path;

/// Write the chart data as CSV to any writer.
pub fn write_chart_data<W: io::Write>(table: &ContingencyTable, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["row", "column", "count", "percent_of_total", "percent_of_row"])?;

    let of_total = table.percent_of_total();
    let of_row = table.percent_of_row();

    for (i, row_label) in table.row_labels().iter().enumerate() {
        for (j, column_label) in table.column_labels().iter().enumerate() {
            wtr.write_record([
                row_label.clone(),
                column_label.clone(),
                table.count(i, j).to_string(),
                format!("{:.2}", of_total[i][j]),
                format!("{:.2}", of_row[i][j]),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write the chart data CSV to `path`.
pub fn save_chart_data(table: &ContingencyTable, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    write_chart_data(table, &mut buffer)?;
    let content = String::from_utf8(buffer).context("Chart data is not valid UTF-8")?;
    super::write_report(path, &content)
        .with_context(|| format!("Failed to write chart data to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_chart_data() {
        let table = ContingencyTable::from_counts(
            vec!["F".to_string(), "M".to_string()],
            vec!["No".to_string(), "Yes".to_string()],
            vec![vec![4, 1], vec![0, 5]],
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_chart_data(&table, &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "row,column,count,percent_of_total,percent_of_row");
        assert_eq!(lines[1], "F,No,4,40.00,80.00");
        assert_eq!(lines[2], "F,Yes,1,10.00,20.00");
        assert_eq!(lines[3], "M,No,0,0.00,0.00");
        assert_eq!(lines[4], "M,Yes,5,50.00,100.00");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_save_chart_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chart.csv");
        let table = ContingencyTable::from_matrix(vec![vec![1, 1], vec![2, 0]]).unwrap();

        save_chart_data(&table, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("row,column,count"));
        assert!(content.contains("r1,c0,2,50.00,100.00"));
    }
}
