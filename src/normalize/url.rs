use url::Url;

/// Normalizes a URL for comparison
///
/// The URL is parsed and reassembled; an empty path becomes `/` and an
/// empty query or fragment is dropped. Parsing also lowercases the host,
/// removes default ports, resolves dot segments and percent-encodes
/// non-ASCII path characters. Anything that does not parse as an absolute
/// URL is returned unchanged, as is empty input.
///
/// # Examples
///
/// ```
/// use link_auditor::normalize::normalize_url;
///
/// assert_eq!(normalize_url("http://example.com"), "http://example.com/");
/// assert_eq!(normalize_url("https://a.com/p?q=1#f"), "https://a.com/p?q=1#f");
/// assert_eq!(normalize_url("https://a.com/p?#"), "https://a.com/p");
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    match Url::parse(value) {
        Ok(mut url) => {
            if url.path().is_empty() && !url.cannot_be_a_base() {
                url.set_path("/");
            }
            if url.query() == Some("") {
                url.set_query(None);
            }
            if url.fragment() == Some("") {
                url.set_fragment(None);
            }
            url.to_string()
        }
        Err(_) => value.to_string(),
    }
}

/// Resolves an href against the page URL and normalizes the result
///
/// Returns `None` when the href cannot be joined onto the base.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    base.join(href)
        .ok()
        .map(|absolute| normalize_url(absolute.as_str()))
}
