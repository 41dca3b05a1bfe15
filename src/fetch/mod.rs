//! Fetch engine for resolving audited pages
//!
//! This module contains everything that touches the network:
//! - The `Transport` seam over a single HTTP exchange
//! - Redirect following with an observable hop trail
//! - The HEAD state machine with its one-shot TLS fallback
//! - The GET that downloads and decodes the page body

mod engine;
mod transport;

pub use engine::{FetchEngine, FetchOutcome, FetchSettings, PageContent, RedirectHop, Traversal};
pub use transport::{
    classify_reqwest_error, FetchErrorKind, HttpTransport, RequestMethod, Transport,
    TransportError, TransportRequest, TransportResponse,
};

/// Desktop browser User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.6167.184 Safari/537.36";
