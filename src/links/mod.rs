//! Link/anchor matching
//!
//! Verifies whether up to three expected (anchor text, URL) pairs appear on
//! a page. Anchors are collected once in document order, then resolved in a
//! single forward pass: exact matches are claimed first and irrevocably,
//! and a same-URL/wrong-text anchor is kept as a diagnostic fallback.

mod anchors;
mod resolver;

pub use anchors::{collect_anchors, AnchorCandidate, REPORTED_REL_TOKENS};
pub use resolver::resolve_pairs;

use scraper::Html;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of expected pairs per audited page
pub const PAIR_SLOTS: usize = 3;

/// Tri-state answer for one pair field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Yes,
    No,
    /// The pair was not supplied or the page was not checked
    #[default]
    NotApplicable,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// An expected link on the audited page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedLinkPair {
    pub anchor_text: Option<String>,
    pub target_url: Option<String>,
}

impl ExpectedLinkPair {
    pub fn new(anchor_text: Option<&str>, target_url: Option<&str>) -> Self {
        Self {
            anchor_text: anchor_text.map(str::to_string),
            target_url: target_url.map(str::to_string),
        }
    }

    /// Whether the pair carries a target URL to look for
    pub fn is_checkable(&self) -> bool {
        self.target_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Result for one pair slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairMatchResult {
    pub found: Presence,
    pub anchor_matches: Presence,
    /// Reported rel tokens of the matching anchor, joined with ", "
    pub rel_attributes: Option<String>,
}

impl PairMatchResult {
    /// Result for a slot that was checked and not found
    pub fn not_found() -> Self {
        Self {
            found: Presence::No,
            anchor_matches: Presence::No,
            rel_attributes: None,
        }
    }

    /// Default result before any anchor was inspected
    pub fn initial(pair: &ExpectedLinkPair) -> Self {
        if pair.is_checkable() {
            Self::not_found()
        } else {
            Self::default()
        }
    }
}

/// Errors raised while scanning a page for links
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkCheckError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid page URL '{url}': {message}")]
    InvalidPageUrl { url: String, message: String },
}

/// Outcome of checking the expected pairs on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheck {
    pub results: [PairMatchResult; PAIR_SLOTS],
    pub error: Option<LinkCheckError>,
}

/// Checks the expected pairs against a parsed page
///
/// On a scan error every slot keeps its initial value (`No` for pairs with
/// a target URL, `NotApplicable` otherwise) and the error is reported.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `page_url` - The final page URL, used to resolve relative hrefs
/// * `pairs` - The expected pairs in slot order
pub fn check_links(
    document: &Html,
    page_url: &str,
    pairs: &[ExpectedLinkPair; PAIR_SLOTS],
) -> LinkCheck {
    match collect_anchors(document, page_url) {
        Ok(anchors) => {
            tracing::debug!("Scanning {} anchors on {}", anchors.len(), page_url);
            LinkCheck {
                results: resolve_pairs(&anchors, pairs),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!("Link check failed for {}: {}", page_url, e);
            LinkCheck {
                results: std::array::from_fn(|slot| PairMatchResult::initial(&pairs[slot])),
                error: Some(e),
            }
        }
    }
}
