//! Report rendering and output.

pub mod chart_data;
pub mod generator;
pub mod naming;
pub mod writer;

pub use chart_data::save_chart_data;
pub use generator::{generate_json_report, generate_markdown_report};
pub use naming::{default_chart_path, default_report_path};
pub use writer::write_report;
