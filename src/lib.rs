//! Link-Auditor: a backlink and SEO signal checker
//!
//! This crate audits a list of pages: each page URL is resolved to its final
//! reachable destination (following redirects, with a one-shot fallback when
//! TLS verification fails), then the rendered page is checked for up to three
//! expected anchor-text/URL pairs and for crawl directives and canonical tags.

pub mod audit;
pub mod config;
pub mod fetch;
pub mod links;
pub mod normalize;
pub mod output;
pub mod robots;
pub mod seo;

use thiserror::Error;

/// Main error type for Link-Auditor operations
///
/// Per-page failures never surface here; they are recorded in
/// [`audit::PageAuditResult`]. This type covers setup only.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Link-Auditor operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use audit::{AuditRow, PageAuditResult, PageAuditor};
pub use config::Config;
pub use fetch::{FetchEngine, FetchOutcome, HttpTransport};
pub use links::{ExpectedLinkPair, PairMatchResult, Presence};
pub use normalize::{normalize_text, normalize_url};
