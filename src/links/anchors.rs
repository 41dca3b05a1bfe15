use crate::links::LinkCheckError;
use crate::normalize::{normalize_text, resolve_href};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// rel tokens that are reported back for a matching anchor
pub const REPORTED_REL_TOKENS: [&str; 3] = ["nofollow", "noindex", "sponsored"];

/// One `<a href>` element, pre-normalized for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCandidate {
    /// Position among the page's `<a href>` elements
    pub index: usize,
    pub normalized_href: String,
    pub normalized_text: String,
    /// Reported rel tokens present on the element
    pub rel_tokens: BTreeSet<&'static str>,
    pub raw_href: String,
    pub raw_text: String,
}

impl AnchorCandidate {
    /// Reported rel tokens joined with ", ", or `None` if there are none
    pub fn rel_attributes(&self) -> Option<String> {
        if self.rel_tokens.is_empty() {
            None
        } else {
            Some(self.rel_tokens.iter().copied().collect::<Vec<_>>().join(", "))
        }
    }
}

/// Collects every `<a href>` of the document in document order
///
/// Hrefs that cannot be joined onto the page URL are skipped, but still
/// occupy their index.
pub fn collect_anchors(
    document: &Html,
    page_url: &str,
) -> Result<Vec<AnchorCandidate>, LinkCheckError> {
    const ANCHOR_SELECTOR: &str = "a[href]";
    let selector = Selector::parse(ANCHOR_SELECTOR).map_err(|e| LinkCheckError::Selector {
        selector: ANCHOR_SELECTOR.to_string(),
        message: e.to_string(),
    })?;

    let base = Url::parse(page_url).map_err(|e| LinkCheckError::InvalidPageUrl {
        url: page_url.to_string(),
        message: e.to_string(),
    })?;

    let anchors = document
        .select(&selector)
        .enumerate()
        .filter_map(|(index, element)| {
            let raw_href = element.value().attr("href")?;
            let Some(normalized_href) = resolve_href(&base, raw_href) else {
                tracing::debug!("Skipping unresolvable href '{}'", raw_href);
                return None;
            };
            let raw_text = anchor_text(&element);

            Some(AnchorCandidate {
                index,
                normalized_href,
                normalized_text: normalize_text(&raw_text),
                rel_tokens: rel_tokens(&element),
                raw_href: raw_href.to_string(),
                raw_text,
            })
        })
        .collect();

    Ok(anchors)
}

/// Concatenates the element's text nodes, each trimmed
fn anchor_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn rel_tokens(element: &ElementRef<'_>) -> BTreeSet<&'static str> {
    let Some(rel) = element.value().attr("rel") else {
        return BTreeSet::new();
    };

    rel.split_whitespace()
        .filter_map(|token| {
            REPORTED_REL_TOKENS
                .iter()
                .copied()
                .find(|reported| token.eq_ignore_ascii_case(reported))
        })
        .collect()
}
