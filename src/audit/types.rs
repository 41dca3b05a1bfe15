use crate::fetch::{FetchOutcome, RedirectHop};
use crate::links::{ExpectedLinkPair, PairMatchResult, PAIR_SLOTS};
use crate::seo::SeoSignals;
use serde::{Deserialize, Serialize};

/// One page to audit, with up to three expected link pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRow {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url3: Option<String>,
}

impl AuditRow {
    /// Creates a row for `url` without expected pairs
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the expected pair for a slot (1-based)
    pub fn with_pair(mut self, slot: usize, anchor: &str, url: &str) -> Self {
        let (anchor_field, url_field) = match slot {
            1 => (&mut self.anchor1, &mut self.url1),
            2 => (&mut self.anchor2, &mut self.url2),
            3 => (&mut self.anchor3, &mut self.url3),
            _ => return self,
        };
        *anchor_field = Some(anchor.to_string());
        *url_field = Some(url.to_string());
        self
    }

    /// The expected pairs in slot order; blank cells count as absent
    pub fn pairs(&self) -> [ExpectedLinkPair; PAIR_SLOTS] {
        [
            pair(&self.anchor1, &self.url1),
            pair(&self.anchor2, &self.url2),
            pair(&self.anchor3, &self.url3),
        ]
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

fn pair(anchor: &Option<String>, url: &Option<String>) -> ExpectedLinkPair {
    ExpectedLinkPair {
        anchor_text: present(anchor),
        target_url: present(url),
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Everything learned about one audited page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAuditResult {
    pub url: String,
    /// Status of the first response, 0 if none was received
    pub status_code: u16,
    pub redirect_chain: Vec<RedirectHop>,
    pub final_url: String,
    pub final_status_code: u16,
    /// Resolution failure or TLS fallback note
    pub error: Option<String>,
    pub tls_fallback_used: bool,
    pub seo: SeoSignals,
    pub seo_check_error: Option<String>,
    pub links: [PairMatchResult; PAIR_SLOTS],
    pub link_check_error: Option<String>,
    /// The input row, kept for correlation
    pub row: AuditRow,
}

impl PageAuditResult {
    /// Result for a row that was never fetched
    pub fn unfetched(row: &AuditRow, error: impl Into<String>) -> Self {
        Self {
            url: row.url.clone(),
            status_code: 0,
            redirect_chain: Vec::new(),
            final_url: row.url.clone(),
            final_status_code: 0,
            error: Some(error.into()),
            tls_fallback_used: false,
            seo: SeoSignals::default(),
            seo_check_error: None,
            links: Default::default(),
            link_check_error: None,
            row: row.clone(),
        }
    }

    /// Result carrying only the resolution outcome
    pub fn from_outcome(row: &AuditRow, outcome: FetchOutcome) -> Self {
        Self {
            url: row.url.clone(),
            status_code: outcome.initial_status_code,
            redirect_chain: outcome.redirect_chain,
            final_url: outcome.final_url,
            final_status_code: outcome.final_status_code,
            error: outcome.error,
            tls_fallback_used: outcome.tls_fallback_used,
            seo: SeoSignals::default(),
            seo_check_error: None,
            links: Default::default(),
            link_check_error: None,
            row: row.clone(),
        }
    }

    /// Whether the page was reached with a final 200
    pub fn is_reachable(&self) -> bool {
        self.final_status_code == 200
    }

    /// Whether SEO or link checks reported a problem
    pub fn has_check_error(&self) -> bool {
        self.seo_check_error.is_some() || self.link_check_error.is_some()
    }
}
