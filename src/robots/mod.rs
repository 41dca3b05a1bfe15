//! Robots.txt handling module
//!
//! This module fetches and evaluates robots.txt for an audited page. Every
//! failure fails open: an unreadable robots.txt never blocks an audit.

mod parser;

pub use parser::ParsedRobots;

use crate::fetch::{FetchEngine, Transport};
use crate::normalize::normalize_url;
use url::Url;

/// Wildcard agent evaluated for every page
pub const STAR_AGENT: &str = "*";

/// Google's crawler agent evaluated for every page
pub const GOOGLEBOT_AGENT: &str = "Googlebot";

/// Crawl permission for the two audited agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotsPermissions {
    pub star: bool,
    pub googlebot: bool,
}

/// Builds the robots.txt URL for a page (`{scheme}://{host}/robots.txt`)
///
/// # Examples
///
/// ```
/// use link_auditor::robots::robots_url;
///
/// assert_eq!(
///     robots_url("https://example.com:8443/a/b?c=d"),
///     Some("https://example.com:8443/robots.txt".to_string())
/// );
/// ```
pub fn robots_url(page_url: &str) -> Option<String> {
    Url::parse(&normalize_url(page_url))
        .and_then(|url| url.join("/robots.txt"))
        .ok()
        .map(|url| url.to_string())
}

/// Fetches robots.txt for the host of a page
///
/// # Status handling
///
/// | Outcome | Result |
/// |---------|--------|
/// | HTTP 200 | Parsed content |
/// | HTTP 404 | Allow all |
/// | Other status | Allow all |
/// | Transport error | Allow all |
///
/// # Arguments
///
/// * `engine` - The fetch engine (its robots timeout is used)
/// * `page_url` - The final URL of the audited page
/// * `verify_tls` - Whether to verify certificates, as for the page fetch
pub async fn fetch_robots<T: Transport>(
    engine: &FetchEngine<T>,
    page_url: &str,
    verify_tls: bool,
) -> ParsedRobots {
    let Some(robots_url) = robots_url(page_url) else {
        tracing::warn!("Cannot derive robots.txt URL from {}, assuming allowed", page_url);
        return ParsedRobots::allow_all();
    };

    match engine
        .get(&robots_url, verify_tls, engine.settings().robots_timeout)
        .await
    {
        Ok(response) if response.status == 200 => {
            ParsedRobots::from_content(&String::from_utf8_lossy(&response.body))
        }
        Ok(response) if response.status == 404 => {
            tracing::debug!("No robots.txt at {} (404), crawling allowed", robots_url);
            ParsedRobots::allow_all()
        }
        Ok(response) => {
            tracing::warn!(
                "Could not read {} (status {}), assuming allowed",
                robots_url,
                response.status
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("robots.txt request failed for {}: {}, assuming allowed", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Fetches robots.txt once and evaluates it for `*` and `Googlebot`
pub async fn check_permissions<T: Transport>(
    engine: &FetchEngine<T>,
    page_url: &str,
    verify_tls: bool,
) -> RobotsPermissions {
    let robots = fetch_robots(engine, page_url, verify_tls).await;
    let target = normalize_url(page_url);

    let permissions = RobotsPermissions {
        star: robots.is_allowed(&target, STAR_AGENT),
        googlebot: robots.is_allowed(&target, GOOGLEBOT_AGENT),
    };
    tracing::debug!(
        "robots.txt for {}: * allowed = {}, Googlebot allowed = {}",
        target,
        permissions.star,
        permissions.googlebot
    );
    permissions
}
