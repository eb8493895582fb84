//! Default file names derived from variable names.

use std::path::{Path, PathBuf};

/// Replace every run of non-word characters with a single `_`.
///
/// Word characters are Unicode alphanumerics and `_`.
pub fn sanitize_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out
}

fn stem(row_variable: &str, column_variable: &str) -> String {
    format!(
        "{}_vs_{}",
        sanitize_filename(row_variable),
        sanitize_filename(column_variable)
    )
}

/// `stat_analysis_<row>_vs_<column>.<extension>`
pub fn default_report_path(row_variable: &str, column_variable: &str, extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "stat_analysis_{}.{}",
        stem(row_variable, column_variable),
        extension
    ))
}

/// `stacked_bar_<row>_vs_<column>.png`, optionally inside `dir`.
pub fn default_chart_path(row_variable: &str, column_variable: &str, dir: Option<&Path>) -> PathBuf {
    let name = format!("stacked_bar_{}.png", stem(row_variable, column_variable));
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Gender"), "Gender");
        assert_eq!(sanitize_filename("purchase made?"), "purchase_made_");
        assert_eq!(sanitize_filename("a / b - c"), "a_b_c");
        assert_eq!(sanitize_filename("snake_case"), "snake_case");
        assert_eq!(sanitize_filename("Größe"), "Größe");
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(
            default_report_path("Gender", "Purchase", "md"),
            PathBuf::from("stat_analysis_Gender_vs_Purchase.md")
        );
        assert_eq!(
            default_report_path("Age Group", "Plan", "json"),
            PathBuf::from("stat_analysis_Age_Group_vs_Plan.json")
        );
        assert_eq!(
            default_chart_path("Gender", "Purchase", None),
            PathBuf::from("stacked_bar_Gender_vs_Purchase.png")
        );
        assert_eq!(
            default_chart_path("Gender", "Purchase", Some(Path::new("charts"))),
            PathBuf::from("charts/stacked_bar_Gender_vs_Purchase.png")
        );
    }
}
