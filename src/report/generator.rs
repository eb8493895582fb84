//! Markdown and JSON report generation.
//!
//! Rendering is deterministic: the same [`AnalysisReport`] always produces
//! byte-identical text. Nothing here touches the filesystem.

use crate::models::{AnalysisReport, AssociationResult, ContingencyTable, Independence, Strength};
use anyhow::Result;

/// p-values below this are rendered in scientific notation.
pub const SCIENTIFIC_P_VALUE_THRESHOLD: f64 = 1e-4;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# 📊 Statistical Analysis: `{}` vs `{}`\n\n",
        report.row_variable, report.column_variable
    ));

    output.push_str(&generate_chi_square_section(report));
    output.push_str(&generate_cramers_v_section(&report.result));
    output.push_str(&generate_visualization_section(&report.chart_path));

    if report.include_table {
        output.push_str(&generate_table_section(report));
    }

    output
}

/// Generate the Chi-Square test section.
fn generate_chi_square_section(report: &AnalysisReport) -> String {
    let result = &report.result;
    let mut section = String::new();

    section.push_str("## 1️⃣ Chi-Square Test for Independence\n");
    section.push_str(&format!(
        "- **Chi-Square Statistic**: {:.4}\n",
        result.chi_square_statistic()
    ));
    section.push_str(&format!("- **p-value**: {}\n", format_p_value(result.p_value())));
    section.push_str(&format!(
        "- **Degrees of Freedom**: {}\n",
        result.degrees_of_freedom()
    ));
    if result.yates_corrected() {
        section.push_str("- *Yates continuity correction applied*\n");
    }
    section.push('\n');

    section.push_str(&independence_sentence(
        result.independence(),
        result.significance_level(),
        &report.row_variable,
        &report.column_variable,
    ));
    section.push_str("\n\n");

    section
}

/// Generate the Cramér's V section.
fn generate_cramers_v_section(result: &AssociationResult) -> String {
    let mut section = String::new();

    section.push_str("## 2️⃣ Cramér's V (Strength of Association)\n");
    section.push_str(&format!("- **Cramér's V**: {:.4}\n\n", result.cramers_v()));
    section.push_str(strength_sentence(result.strength()));
    section.push_str("\n\n");

    section
}

fn generate_visualization_section(chart_path: &str) -> String {
    format!("## 3️⃣ Visualization\n![Stacked Bar Chart]({})\n", chart_path)
}

/// Generate the optional contingency table section.
fn generate_table_section(report: &AnalysisReport) -> String {
    let table: &ContingencyTable = &report.table;
    let mut section = String::new();

    section.push_str("\n## 4️⃣ Contingency Table\n\n");

    section.push_str(&format!("| {} \\ {} |", report.row_variable, report.column_variable));
    for label in table.column_labels() {
        section.push_str(&format!(" {} |", label));
    }
    section.push_str(" **Total** |\n");

    section.push_str("|:---|");
    for _ in 0..=table.columns() {
        section.push_str(":---:|");
    }
    section.push('\n');

    let row_totals = table.row_totals();
    for (i, label) in table.row_labels().iter().enumerate() {
        section.push_str(&format!("| {} |", label));
        for count in &table.counts()[i] {
            section.push_str(&format!(" {} |", count));
        }
        section.push_str(&format!(" **{}** |\n", row_totals[i]));
    }

    section.push_str("| **Total** |");
    for total in table.column_totals() {
        section.push_str(&format!(" **{}** |", total));
    }
    section.push_str(&format!(" **{}** |\n", table.total()));

    section
}

/// Plain-language conclusion for the independence test.
pub fn independence_sentence(
    independence: Independence,
    significance_level: f64,
    row_variable: &str,
    column_variable: &str,
) -> String {
    match independence {
        Independence::Significant => format!(
            "**Conclusion:** `{}` and `{}` **are statistically related** (p-value ≤ {}).",
            row_variable, column_variable, significance_level
        ),
        Independence::NotSignificant => format!(
            "**Conclusion:** No significant relationship between `{}` and `{}` (p-value > {}).",
            row_variable, column_variable, significance_level
        ),
    }
}

/// Plain-language conclusion for the association strength.
pub fn strength_sentence(strength: Strength) -> &'static str {
    match strength {
        Strength::None => "🔹 **Conclusion:** The association is **very weak or negligible**.",
        Strength::Weak => "🔹 **Conclusion:** There is a **weak association**.",
        Strength::Moderate => "🔹 **Conclusion:** There is a **moderate association**.",
        Strength::Strong => "🔹 **Conclusion:** The association is **strong**.",
    }
}

/// Format a p-value: 4 decimals, or 4 significant digits in scientific
/// notation (`1.234e-05`) below [`SCIENTIFIC_P_VALUE_THRESHOLD`].
pub fn format_p_value(p_value: f64) -> String {
    if p_value == 0.0 || p_value >= SCIENTIFIC_P_VALUE_THRESHOLD {
        return format!("{:.4}", p_value);
    }

    let raw = format!("{:.3e}", p_value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => raw,
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
