use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Normalizes text for anchor comparison
///
/// Lowercases, applies compatibility decomposition (NFKD), drops every
/// combining mark so diacritics disappear in any script, collapses runs of
/// whitespace to a single space and trims both ends. Empty input yields an
/// empty string.
///
/// # Examples
///
/// ```
/// use link_auditor::normalize::normalize_text;
///
/// assert_eq!(normalize_text("  Café\n  Crème "), "cafe creme");
/// ```
pub fn normalize_text(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    // Compatibility forms can decompose to uppercase letters (ℌ -> H), so
    // fold a second time to keep the result stable under re-normalization.
    let folded = strip_marks(&strip_marks(value));

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_marks(value: &str) -> String {
    value
        .to_lowercase()
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect()
}
