//! Output module for audit results and reports
//!
//! This module handles:
//! - Computing batch statistics over audit results
//! - Exporting results as JSON
//! - Generating markdown summaries of an audit run

mod json;
mod markdown;
pub mod stats;
mod summary;

pub use json::{results_to_json, write_results, ResultRecord};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, BatchStatistics};
pub use summary::{AuditSummary, OutputError, OutputResult};
