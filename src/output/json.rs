//! JSON export of audit results

use crate::audit::{AuditRow, PageAuditResult};
use crate::fetch::RedirectHop;
use crate::links::Presence;
use crate::output::{OutputError, OutputResult};
use crate::seo::IndexingDirective;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Flat, serializable view of one [`PageAuditResult`]
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub url: &'a str,
    pub status_code: u16,
    pub redirect_chain: &'a [RedirectHop],
    pub final_url: &'a str,
    pub final_status_code: u16,
    pub error: Option<&'a str>,
    pub tls_fallback_used: bool,
    pub robots_allowed_star: Option<bool>,
    pub robots_allowed_googlebot: Option<bool>,
    pub indexing_directive: Option<&'a IndexingDirective>,
    pub canonical_url: Option<&'a str>,
    pub canonical_differs: Option<bool>,
    pub seo_check_error: Option<&'a str>,
    pub url1_found: Presence,
    pub anchor1_matches: Presence,
    pub url1_rel: Option<&'a str>,
    pub url2_found: Presence,
    pub anchor2_matches: Presence,
    pub url2_rel: Option<&'a str>,
    pub url3_found: Presence,
    pub anchor3_matches: Presence,
    pub url3_rel: Option<&'a str>,
    pub link_check_error: Option<&'a str>,
    /// The input row
    pub input: &'a AuditRow,
}

impl<'a> From<&'a PageAuditResult> for ResultRecord<'a> {
    fn from(result: &'a PageAuditResult) -> Self {
        let [link1, link2, link3] = &result.links;

        Self {
            url: &result.url,
            status_code: result.status_code,
            redirect_chain: &result.redirect_chain,
            final_url: &result.final_url,
            final_status_code: result.final_status_code,
            error: result.error.as_deref(),
            tls_fallback_used: result.tls_fallback_used,
            robots_allowed_star: result.seo.robots_allowed_star,
            robots_allowed_googlebot: result.seo.robots_allowed_googlebot,
            indexing_directive: result.seo.indexing_directive.as_ref(),
            canonical_url: result.seo.canonical_url.as_deref(),
            canonical_differs: result.seo.canonical_differs,
            seo_check_error: result.seo_check_error.as_deref(),
            url1_found: link1.found,
            anchor1_matches: link1.anchor_matches,
            url1_rel: link1.rel_attributes.as_deref(),
            url2_found: link2.found,
            anchor2_matches: link2.anchor_matches,
            url2_rel: link2.rel_attributes.as_deref(),
            url3_found: link3.found,
            anchor3_matches: link3.anchor_matches,
            url3_rel: link3.rel_attributes.as_deref(),
            link_check_error: result.link_check_error.as_deref(),
            input: &result.row,
        }
    }
}

/// Serializes results as a pretty-printed JSON array
pub fn results_to_json(results: &[PageAuditResult]) -> OutputResult<String> {
    let records: Vec<ResultRecord<'_>> = results.iter().map(ResultRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Writes results to `output_path` as a JSON array
///
/// # Arguments
///
/// * `results` - The audit results, in input order
/// * `output_path` - Path where the JSON file should be written
pub fn write_results(results: &[PageAuditResult], output_path: &Path) -> OutputResult<()> {
    let write_error = |source: std::io::Error| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    };

    let records: Vec<ResultRecord<'_>> = results.iter().map(ResultRecord::from).collect();
    let file = File::create(output_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    tracing::info!("Wrote {} results to {}", records.len(), output_path.display());
    Ok(())
}
