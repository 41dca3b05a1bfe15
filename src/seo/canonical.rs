use crate::normalize::normalize_url;
use crate::seo::ExtractionError;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use url::Url;

/// The canonical target declared by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    /// Absolute, normalized canonical URL
    pub url: String,
    /// Whether it differs from the page URL once both are percent-decoded
    pub differs: bool,
}

/// Reads `<link rel="canonical">` and resolves it against the page URL
///
/// Returns `Ok(None)` when the page declares no canonical link (or the first
/// one has no href).
pub fn check_canonical(
    page_url: &str,
    document: &Html,
) -> Result<Option<Canonical>, ExtractionError> {
    const LINK_SELECTOR: &str = "link[rel]";
    let selector = Selector::parse(LINK_SELECTOR).map_err(|e| ExtractionError::Selector {
        selector: LINK_SELECTOR.to_string(),
        message: e.to_string(),
    })?;

    let current = normalize_url(page_url);
    let base = Url::parse(&current).map_err(|e| ExtractionError::InvalidPageUrl {
        url: page_url.to_string(),
        message: e.to_string(),
    })?;

    let Some(link) = document.select(&selector).find(|element| {
        element
            .value()
            .attr("rel")
            .map(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("canonical")))
            .unwrap_or(false)
    }) else {
        tracing::debug!("No canonical link on {}", page_url);
        return Ok(None);
    };

    let Some(href) = link.value().attr("href").filter(|h| !h.trim().is_empty()) else {
        return Ok(None);
    };

    let resolved = base.join(href).map_err(|e| ExtractionError::InvalidCanonical {
        href: href.to_string(),
        message: e.to_string(),
    })?;
    let url = normalize_url(resolved.as_str());
    let differs = decoded(&url) != decoded(&current);

    if differs {
        tracing::info!("Canonical {} differs from page URL {}", url, current);
    } else {
        tracing::debug!("Canonical matches page URL {}", current);
    }

    Ok(Some(Canonical { url, differs }))
}

fn decoded(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}
