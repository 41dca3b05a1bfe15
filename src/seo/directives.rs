use crate::seo::ExtractionError;
use scraper::{Html, Selector};
use serde::Serialize;

/// Response header carrying indexing directives
pub const X_ROBOTS_TAG: &str = "X-Robots-Tag";

/// noindex/nofollow flags and the surface they came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexingDirective {
    pub noindex: bool,
    pub nofollow: bool,
    /// `X-Robots-Tag`, `Meta Googlebot` or `Meta Robots`
    pub source: Option<String>,
}

impl IndexingDirective {
    /// Applies a directive list from one surface; returns whether it set anything
    fn apply(&mut self, content: &str, source: &str) -> bool {
        let content = content.to_lowercase();
        let noindex = content.contains("noindex");
        let nofollow = content.contains("nofollow");

        self.noindex |= noindex;
        self.nofollow |= nofollow;
        if noindex || nofollow {
            self.source.get_or_insert_with(|| source.to_string());
        }
        noindex || nofollow
    }
}

/// Checks the `X-Robots-Tag` header and robots meta tags for directives
///
/// The header is checked first; if it yields any directive, meta tags are
/// not consulted. Otherwise `<meta name="googlebot">` is preferred over
/// `<meta name="robots">`.
pub fn check_indexing_directives(
    x_robots_tag: Option<&str>,
    document: &Html,
) -> Result<IndexingDirective, ExtractionError> {
    let mut directive = IndexingDirective::default();

    if let Some(header) = x_robots_tag {
        tracing::debug!("Found {}: {}", X_ROBOTS_TAG, header);
        if directive.apply(header, X_ROBOTS_TAG) {
            return Ok(directive);
        }
    }

    if let Some((name, content)) = find_robots_meta(document)? {
        tracing::debug!("Found meta {}: {}", name, content);
        directive.apply(&content, &format!("Meta {}", name));
    }

    Ok(directive)
}

/// Finds the robots meta tag to honor, returning its display name and content
fn find_robots_meta(document: &Html) -> Result<Option<(&'static str, String)>, ExtractionError> {
    const META_SELECTOR: &str = "meta[name]";
    let selector = Selector::parse(META_SELECTOR).map_err(|e| ExtractionError::Selector {
        selector: META_SELECTOR.to_string(),
        message: e.to_string(),
    })?;

    let mut googlebot = None;
    let mut robots = None;
    for element in document.select(&selector) {
        let name = element.value().attr("name").unwrap_or_default().trim();
        if googlebot.is_none() && name.eq_ignore_ascii_case("googlebot") {
            googlebot = Some(element);
        } else if robots.is_none() && name.eq_ignore_ascii_case("robots") {
            robots = Some(element);
        }
    }

    let chosen = googlebot
        .map(|element| ("Googlebot", element))
        .or_else(|| robots.map(|element| ("Robots", element)));

    Ok(chosen.and_then(|(name, element)| {
        element
            .value()
            .attr("content")
            .filter(|content| !content.trim().is_empty())
            .map(|content| (name, content.to_string()))
    }))
}
