use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Label reported for pure 7-bit input
const ASCII: &str = "ascii";

/// Encoding assumed for ASCII-classified pages carrying high bytes
const CYRILLIC_FALLBACK: &str = "windows-1251";

/// Encoding used when nothing could be detected
const DEFAULT_ENCODING: &str = "utf-8";

/// A statistical charset guesser
///
/// Returns a lowercase encoding label, `"ascii"` for 7-bit input, or `None`
/// when nothing can be inferred.
pub trait CharsetDetector {
    fn detect(&self, bytes: &[u8]) -> Option<String>;
}

/// Charset detector backed by `chardetng`
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalDetector;

impl CharsetDetector for StatisticalDetector {
    fn detect(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        if bytes.is_ascii() {
            return Some(ASCII.to_string());
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        Some(detector.guess(None, true).name().to_ascii_lowercase())
    }
}

/// Detects the encoding of a page body with the default detector
pub fn detect_encoding(bytes: &[u8]) -> String {
    detect_encoding_with(&StatisticalDetector, bytes)
}

/// Detects the encoding of a page body
///
/// An `ascii` verdict is overridden to `windows-1251` when any byte is
/// `0xC0` or above, since undeclared Cyrillic pages are commonly
/// misclassified that way. No verdict at all means `utf-8`.
pub fn detect_encoding_with<D: CharsetDetector + ?Sized>(detector: &D, bytes: &[u8]) -> String {
    match detector.detect(bytes) {
        Some(label) if label == ASCII && bytes.iter().any(|b| *b >= 0xC0) => {
            CYRILLIC_FALLBACK.to_string()
        }
        Some(label) if !label.is_empty() => label,
        _ => DEFAULT_ENCODING.to_string(),
    }
}

/// Decodes a page body, replacing malformed sequences
///
/// Returns the decoded text and the name of the encoding actually used.
/// Unknown labels fall back to UTF-8.
pub fn decode_html(bytes: &[u8]) -> (String, &'static str) {
    let label = detect_encoding(bytes);
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    let (text, used, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), used.name())
}
