//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of an audit run,
//! including run metadata, batch statistics and one table row per page.

use crate::audit::PageAuditResult;
use crate::links::PAIR_SLOTS;
use crate::output::summary::{AuditSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of an audit run
///
/// # Arguments
///
/// * `summary` - Run metadata and statistics
/// * `results` - The audit results, in input order
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    summary: &AuditSummary,
    results: &[PageAuditResult],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary, results);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Summary written to {}", output_path.display());
    Ok(())
}

/// Formats an audit run as markdown
pub fn format_markdown_summary(summary: &AuditSummary, results: &[PageAuditResult]) -> String {
    let stats = &summary.statistics;
    let mut md = String::new();

    md.push_str("# Link-Auditor Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages audited | {} |\n", stats.total));
    md.push_str(&format!("| Reachable (200), fully checked | {} |\n", stats.checked_ok));
    md.push_str(&format!(
        "| Reachable (200), check errors | {} |\n",
        stats.check_errors
    ));
    md.push_str(&format!("| Request errors | {} |\n", stats.request_errors));
    md.push_str(&format!("| TLS verification disabled | {} |\n", stats.tls_fallbacks));
    md.push_str(&format!("| Other final status | {} |\n", stats.other_status));
    for slot in 0..PAIR_SLOTS {
        md.push_str(&format!(
            "| URL {} found / anchor matches | {} / {} |\n",
            slot + 1,
            stats.urls_found[slot],
            stats.anchors_matched[slot]
        ));
    }
    md.push_str(&format!("\n**Success Rate**: {:.2}%\n\n", stats.success_rate()));

    // Pages
    if !results.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| # | URL | Final Status | Link 1 | Link 2 | Link 3 | Error |\n");
        md.push_str("|---|-----|--------------|--------|--------|--------|-------|\n");

        for (i, result) in results.iter().enumerate() {
            let links: Vec<String> = result
                .links
                .iter()
                .map(|link| format!("{} / {}", link.found, link.anchor_matches))
                .collect();
            let error = result
                .error
                .as_deref()
                .or(result.seo_check_error.as_deref())
                .or(result.link_check_error.as_deref())
                .unwrap_or("");

            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                i + 1,
                escape_cell(&result.url),
                result.final_status_code,
                links[0],
                links[1],
                links[2],
                escape_cell(error)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
