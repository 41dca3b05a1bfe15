//! Fetch state machine
//!
//! Resolves an audited URL to its final reachable state:
//!
//! ```text
//! START -> HEAD_PRIMARY -> SUCCESS
//!                       -> (TLS error) HEAD_FALLBACK -> SUCCESS | FAILED
//!                       -> (other error) FAILED
//! ```
//!
//! Only one fallback is ever attempted. A successful resolution whose final
//! status is 200 may then be downloaded with [`FetchEngine::fetch_page`],
//! using the same TLS verification setting that succeeded for HEAD.

use crate::config::HttpConfig;
use crate::fetch::transport::{
    joined_header, FetchErrorKind, RequestMethod, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use crate::normalize::{decode_html, normalize_url};
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Timeouts and limits used by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub head_timeout: Duration,
    pub get_timeout: Duration,
    pub robots_timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            head_timeout: Duration::from_secs(10),
            get_timeout: Duration::from_secs(15),
            robots_timeout: Duration::from_secs(5),
            max_redirects: 30,
        }
    }
}

impl From<&HttpConfig> for FetchSettings {
    fn from(config: &HttpConfig) -> Self {
        Self {
            head_timeout: Duration::from_secs(config.head_timeout_secs),
            get_timeout: Duration::from_secs(config.get_timeout_secs),
            robots_timeout: Duration::from_secs(config.robots_timeout_secs),
            max_redirects: config.max_redirects,
        }
    }
}

/// One redirect taken while resolving a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectHop {
    /// Normalized URL that answered with a redirect
    pub url: String,
    pub status_code: u16,
}

/// Result of following redirects from a starting URL
#[derive(Debug, Clone)]
pub struct Traversal {
    /// Status of the very first response
    pub initial_status: u16,
    /// Redirect responses in traversal order
    pub hops: Vec<RedirectHop>,
    /// The final, non-redirect response
    pub response: TransportResponse,
}

/// Outcome of resolving one audited URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub initial_url: String,
    pub final_url: String,
    /// 0 when no response was received
    pub initial_status_code: u16,
    /// 0 when no response was received
    pub final_status_code: u16,
    pub redirect_chain: Vec<RedirectHop>,
    pub tls_fallback_used: bool,
    pub error: Option<String>,
}

impl FetchOutcome {
    fn resolved(
        url: &str,
        traversal: Traversal,
        tls_fallback_used: bool,
        error: Option<String>,
    ) -> Self {
        let final_url = if traversal.hops.is_empty() {
            normalize_url(url)
        } else {
            normalize_url(&traversal.response.url)
        };

        Self {
            initial_url: url.to_string(),
            final_url,
            initial_status_code: traversal.initial_status,
            final_status_code: traversal.response.status,
            redirect_chain: traversal.hops,
            tls_fallback_used,
            error,
        }
    }

    fn failed(url: &str, error: String, tls_fallback_used: bool) -> Self {
        Self {
            initial_url: url.to_string(),
            final_url: url.to_string(),
            initial_status_code: 0,
            final_status_code: 0,
            redirect_chain: Vec::new(),
            tls_fallback_used,
            error: Some(error),
        }
    }

    /// TLS verification setting that produced this outcome
    pub fn verify_tls(&self) -> bool {
        !self.tls_fallback_used
    }

    /// Whether the page is eligible for content checks
    pub fn is_ok(&self) -> bool {
        self.final_status_code == 200
    }
}

/// A downloaded and decoded page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// The resolved page URL (base for relative links)
    pub url: String,
    pub headers: HeaderMap,
    pub html: String,
}

impl PageContent {
    /// Returns all values of a response header joined with ", "
    pub fn header(&self, name: &str) -> Option<String> {
        joined_header(&self.headers, name)
    }
}

/// Phases of the HEAD state machine
#[derive(Debug)]
enum FetchPhase {
    HeadPrimary,
    HeadFallback { primary_error: TransportError },
}

/// Resolves and downloads audited pages over a [`Transport`]
#[derive(Debug, Clone)]
pub struct FetchEngine<T> {
    transport: T,
    settings: FetchSettings,
}

impl<T: Transport> FetchEngine<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves a URL with HEAD requests
    ///
    /// Never fails: transport problems are reported in
    /// [`FetchOutcome::error`] with both status codes set to 0.
    pub async fn resolve(&self, url: &str) -> FetchOutcome {
        let mut phase = FetchPhase::HeadPrimary;

        loop {
            phase = match phase {
                FetchPhase::HeadPrimary => match self.head(url, true).await {
                    Ok(traversal) => {
                        let outcome = FetchOutcome::resolved(url, traversal, false, None);
                        log_resolution(&outcome);
                        return outcome;
                    }
                    Err(error) if error.is_tls() => {
                        tracing::warn!("TLS error for {}: {}", url, error);
                        tracing::info!("Retrying {} with TLS verification disabled", url);
                        FetchPhase::HeadFallback {
                            primary_error: error,
                        }
                    }
                    Err(error) => {
                        tracing::warn!("HEAD request failed for {}: {}", url, error);
                        return FetchOutcome::failed(url, error.message, false);
                    }
                },
                FetchPhase::HeadFallback { primary_error } => {
                    return match self.head(url, false).await {
                        Ok(traversal) => {
                            let note = format!("TLS verification disabled: {}", primary_error);
                            let outcome = FetchOutcome::resolved(url, traversal, true, Some(note));
                            log_resolution(&outcome);
                            outcome
                        }
                        Err(error) => {
                            let message = format!(
                                "{}; HEAD failed with TLS verification disabled: {}",
                                primary_error, error
                            );
                            tracing::warn!("{}", message);
                            FetchOutcome::failed(url, message, true)
                        }
                    };
                }
            };
        }
    }

    /// Downloads and decodes the final page of a resolved outcome
    ///
    /// Uses the TLS setting recorded in the outcome. A final status outside
    /// 2xx is reported as an [`FetchErrorKind::HttpStatus`] error.
    pub async fn fetch_page(&self, outcome: &FetchOutcome) -> Result<PageContent, TransportError> {
        let traversal = self
            .follow(
                RequestMethod::Get,
                &outcome.final_url,
                outcome.verify_tls(),
                self.settings.get_timeout,
            )
            .await?;

        let response = traversal.response;
        if !(200..300).contains(&response.status) {
            return Err(TransportError::new(
                FetchErrorKind::HttpStatus,
                format!("{} status for url: {}", response.status, response.url),
            ));
        }

        let (html, encoding) = decode_html(&response.body);
        tracing::debug!(
            "Fetched {} ({} bytes, {})",
            outcome.final_url,
            response.body.len(),
            encoding
        );

        Ok(PageContent {
            url: outcome.final_url.clone(),
            headers: response.headers,
            html,
        })
    }

    /// Sends a GET following redirects and returns the final response
    pub async fn get(
        &self,
        url: &str,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.follow(RequestMethod::Get, url, verify_tls, timeout)
            .await
            .map(|traversal| traversal.response)
    }

    async fn head(&self, url: &str, verify_tls: bool) -> Result<Traversal, TransportError> {
        self.follow(RequestMethod::Head, url, verify_tls, self.settings.head_timeout)
            .await
    }

    /// Follows redirects hop by hop, recording each redirect response
    ///
    /// The request method is kept across hops. More than `max_redirects`
    /// redirects is a transport failure.
    pub async fn follow(
        &self,
        method: RequestMethod,
        url: &str,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<Traversal, TransportError> {
        let mut current = url.to_string();
        let mut hops = Vec::new();
        let mut initial_status = None;

        loop {
            let request = TransportRequest {
                method,
                url: current,
                verify_tls,
                timeout,
            };
            let response = self.transport.send(&request).await?;
            let initial = *initial_status.get_or_insert(response.status);

            let location = if is_redirect(response.status) {
                response.header("location")
            } else {
                None
            };

            let Some(location) = location else {
                return Ok(Traversal {
                    initial_status: initial,
                    hops,
                    response,
                });
            };

            if hops.len() >= self.settings.max_redirects {
                return Err(TransportError::new(
                    FetchErrorKind::Transport,
                    format!("Exceeded {} redirects.", self.settings.max_redirects),
                ));
            }

            let next = Url::parse(&response.url)
                .and_then(|base| base.join(&location))
                .map_err(|e| {
                    TransportError::new(
                        FetchErrorKind::Transport,
                        format!("Invalid redirect location '{}': {}", location, e),
                    )
                })?;

            tracing::debug!(
                "{} {} -> {} ({})",
                method,
                response.url,
                next,
                response.status
            );
            hops.push(RedirectHop {
                url: normalize_url(&response.url),
                status_code: response.status,
            });
            current = next.to_string();
        }
    }
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn log_resolution(outcome: &FetchOutcome) {
    for (i, hop) in outcome.redirect_chain.iter().enumerate() {
        tracing::info!("  {}. {} -> {}", i + 1, hop.url, hop.status_code);
    }
    tracing::info!(
        "Final URL{}: {} -> {}",
        if outcome.tls_fallback_used {
            " (TLS verification disabled)"
        } else {
            ""
        },
        outcome.final_url,
        outcome.final_status_code
    );
}
