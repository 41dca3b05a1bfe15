use crate::audit::{AuditRow, PageAuditResult};
use crate::fetch::{FetchEngine, PageContent, Transport};
use crate::links::check_links;
use crate::robots::{check_permissions, RobotsPermissions};
use crate::seo::{extract_seo_signals, X_ROBOTS_TAG};
use scraper::Html;

/// Audits pages one at a time
pub struct PageAuditor<T> {
    engine: FetchEngine<T>,
}

impl<T: Transport> PageAuditor<T> {
    pub fn new(engine: FetchEngine<T>) -> Self {
        Self { engine }
    }

    /// Audits a single row
    ///
    /// Never fails: every problem is recorded in the returned result. The
    /// page body is only downloaded when the HEAD resolution ends with a
    /// final 200; otherwise all SEO and link fields keep their defaults.
    pub async fn audit_page(&self, row: &AuditRow) -> PageAuditResult {
        if !row.has_url() {
            tracing::warn!("Skipping row with empty URL");
            return PageAuditResult::unfetched(row, "URL is empty");
        }

        let url = row.url.trim();
        tracing::info!("Auditing {}", url);

        let outcome = self.engine.resolve(url).await;
        if !outcome.is_ok() {
            tracing::info!(
                "{} ended with status {}, skipping content checks",
                outcome.final_url,
                outcome.final_status_code
            );
            return PageAuditResult::from_outcome(row, outcome);
        }

        let verify_tls = outcome.verify_tls();
        let fetched = self.engine.fetch_page(&outcome).await;
        let mut result = PageAuditResult::from_outcome(row, outcome);

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                let message = if verify_tls {
                    format!("GET request failed: {}", e)
                } else {
                    format!("GET request failed (TLS verification disabled): {}", e)
                };
                tracing::warn!("{}", message);
                result.seo_check_error = Some(message.clone());
                result.link_check_error = Some(message);
                return result;
            }
        };

        let robots = check_permissions(&self.engine, &page.url, verify_tls).await;
        analyze_page(&mut result, &page, robots);
        result
    }

    /// Audits every row in order, returning one result per row
    pub async fn audit_batch(&self, rows: &[AuditRow]) -> Vec<PageAuditResult> {
        let mut results = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, rows.len(), row.url);
            results.push(self.audit_page(row).await);
        }

        results
    }
}

/// Runs the SEO extractor and the link resolver over one parsed document
fn analyze_page(result: &mut PageAuditResult, page: &PageContent, robots: RobotsPermissions) {
    let document = Html::parse_document(&page.html);
    let x_robots_tag = page.header(X_ROBOTS_TAG);

    let (seo, seo_error) =
        extract_seo_signals(&page.url, x_robots_tag.as_deref(), &document, robots);
    result.seo = seo;
    result.seo_check_error = seo_error.map(|e| e.to_string());

    let check = check_links(&document, &page.url, &result.row.pairs());
    result.links = check.results;
    result.link_check_error = check.error.map(|e| e.to_string());

    for (slot, link) in result.links.iter().enumerate() {
        tracing::debug!(
            "Pair {}: found = {}, anchor matches = {}, rel = {}",
            slot + 1,
            link.found,
            link.anchor_matches,
            link.rel_attributes.as_deref().unwrap_or("-")
        );
    }
}
