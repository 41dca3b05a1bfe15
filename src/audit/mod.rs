//! Page audit aggregation
//!
//! Combines the fetch engine, the SEO extractor and the link resolver into
//! one [`PageAuditResult`] per input row.

mod auditor;
mod types;

pub use auditor::PageAuditor;
pub use types::{AuditRow, PageAuditResult};

use crate::config::{validate, Config};
use crate::fetch::{FetchEngine, FetchSettings, HttpTransport};

/// Audits every row of a configuration over the network
///
/// # Returns
///
/// * `Ok(Vec<PageAuditResult>)` - One result per audited row, in order
/// * `Err(AuditError)` - The configuration is invalid or the HTTP client
///   could not be built
pub async fn audit_config(config: &Config) -> crate::Result<Vec<PageAuditResult>> {
    validate(config)?;

    let transport = HttpTransport::new(&config.http.user_agent)?;
    let settings = FetchSettings::from(&config.http);
    let auditor = PageAuditor::new(FetchEngine::new(transport, settings));

    let rows = config.audit_rows();
    tracing::info!("Auditing {} pages", rows.len());
    Ok(auditor.audit_batch(&rows).await)
}
