//! Presentation types for agent output
//!
//! Structured results are turned into markdown reports here; failures are
//! rendered as a single line in place of the report.

mod report;

pub use report::{ReportLayout, format_number, render, render_failure};
