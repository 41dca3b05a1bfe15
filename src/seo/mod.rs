//! SEO signal extraction
//!
//! Derives crawl permission, indexing directives and the canonical target
//! of a fetched page. Extraction failures are reported alongside whatever
//! signals could still be derived; they never abort an audit.

mod canonical;
mod directives;

pub use canonical::{check_canonical, Canonical};
pub use directives::{check_indexing_directives, IndexingDirective, X_ROBOTS_TAG};

use crate::robots::RobotsPermissions;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while deriving SEO signals
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid page URL '{url}': {message}")]
    InvalidPageUrl { url: String, message: String },

    #[error("Cannot resolve canonical href '{href}': {message}")]
    InvalidCanonical { href: String, message: String },
}

/// SEO signals of one audited page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeoSignals {
    pub robots_allowed_star: Option<bool>,
    pub robots_allowed_googlebot: Option<bool>,
    pub indexing_directive: Option<IndexingDirective>,
    pub canonical_url: Option<String>,
    /// Whether the canonical target differs from the page URL
    pub canonical_differs: Option<bool>,
}

/// Derives SEO signals from a parsed page
///
/// # Arguments
///
/// * `page_url` - The final URL of the page
/// * `x_robots_tag` - The `X-Robots-Tag` response header, if any
/// * `document` - The parsed page
/// * `robots` - robots.txt permissions already evaluated for the page
///
/// # Returns
///
/// The derived signals and the first extraction error, if any. Signals that
/// could be derived before or after a failure are still returned.
pub fn extract_seo_signals(
    page_url: &str,
    x_robots_tag: Option<&str>,
    document: &Html,
    robots: RobotsPermissions,
) -> (SeoSignals, Option<ExtractionError>) {
    let mut signals = SeoSignals {
        robots_allowed_star: Some(robots.star),
        robots_allowed_googlebot: Some(robots.googlebot),
        ..SeoSignals::default()
    };
    let mut error = None;

    match check_indexing_directives(x_robots_tag, document) {
        Ok(directive) => signals.indexing_directive = Some(directive),
        Err(e) => {
            tracing::warn!("Indexing directive check failed for {}: {}", page_url, e);
            error = Some(e);
        }
    }

    match check_canonical(page_url, document) {
        Ok(Some(canonical)) => {
            signals.canonical_url = Some(canonical.url);
            signals.canonical_differs = Some(canonical.differs);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Canonical check failed for {}: {}", page_url, e);
            error.get_or_insert(e);
        }
    }

    (signals, error)
}
