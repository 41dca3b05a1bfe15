//! Normalization primitives
//!
//! Small pure helpers every other component depends on:
//! - Text canonicalization for anchor comparison
//! - URL canonicalization for href comparison
//! - Charset detection for undeclared page encodings
//! - TLS failure recognition for the fetch fallback

mod encoding;
mod text;
mod url;

pub use self::encoding::{
    decode_html, detect_encoding, detect_encoding_with, CharsetDetector, StatisticalDetector,
};
pub use self::text::normalize_text;
pub use self::url::{normalize_url, resolve_href};

/// Keywords that mark a transport failure as TLS-related
const TLS_KEYWORDS: &[&str] = &[
    "ssl",
    "certificate",
    "cert",
    "handshake",
    "verify",
    "verification",
    "certificate_verify_failed",
];

/// Checks whether an error message describes a TLS/certificate failure
///
/// The match is a case-insensitive substring search against a fixed
/// keyword set.
///
/// # Examples
///
/// ```
/// use link_auditor::normalize::is_tls_error;
///
/// assert!(is_tls_error("invalid peer certificate: UnknownIssuer"));
/// assert!(!is_tls_error("connection refused"));
/// ```
pub fn is_tls_error(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TLS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
