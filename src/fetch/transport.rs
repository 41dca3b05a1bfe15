//! HTTP transport boundary
//!
//! A `Transport` performs exactly one HTTP exchange: it never follows
//! redirects and it classifies failures into [`FetchErrorKind`] so that the
//! retry policy above it does not have to inspect error strings.

use crate::normalize::is_tls_error;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// HTTP method used by the auditor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Head,
    Get,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "HEAD"),
            Self::Get => write!(f, "GET"),
        }
    }
}

/// A single HTTP exchange to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: RequestMethod,
    pub url: String,
    /// Whether the server certificate must be verified
    pub verify_tls: bool,
    pub timeout: Duration,
}

/// The response of a single HTTP exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// URL that produced this response
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw body bytes (always empty for HEAD)
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns all values of a header joined with ", ", or `None` if absent
    pub fn header(&self, name: &str) -> Option<String> {
        joined_header(&self.headers, name)
    }
}

/// Joins every value of a header with ", "; `None` when the header is absent
pub(crate) fn joined_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Classification of a failed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS, timeout or protocol failure
    Transport,
    /// Certificate or handshake failure; eligible for the TLS fallback
    Tls,
    /// A response arrived but its status is not acceptable
    HttpStatus,
}

/// A classified transport failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_tls(&self) -> bool {
        self.kind == FetchErrorKind::Tls
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for TransportError {}

/// Performs single HTTP exchanges
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request without following redirects
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by reqwest
///
/// Holds two clients because certificate verification is a client-level
/// setting in reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    verified: Client,
    unverified: Client,
}

impl HttpTransport {
    /// Builds both clients with the given User-Agent
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The User-Agent header sent with every request
    ///
    /// # Returns
    ///
    /// * `Ok(HttpTransport)` - Successfully built clients
    /// * `Err(reqwest::Error)` - Failed to build a client
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            verified: build_client(user_agent, true)?,
            unverified: build_client(user_agent, false)?,
        })
    }
}

fn build_client(user_agent: &str, verify_tls: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::none()) // Redirects are followed by the engine
        .danger_accept_invalid_certs(!verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let client = if request.verify_tls {
            &self.verified
        } else {
            &self.unverified
        };

        let builder = match request.method {
            RequestMethod::Head => client.head(&request.url),
            RequestMethod::Get => client.get(&request.url),
        };

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let body = match request.method {
            RequestMethod::Head => Vec::new(),
            RequestMethod::Get => response
                .bytes()
                .await
                .map_err(|e| classify_reqwest_error(&e))?
                .to_vec(),
        };

        Ok(TransportResponse {
            url,
            status,
            headers,
            body,
        })
    }
}

/// Classifies a reqwest error
///
/// Timeouts are always plain transport failures. Otherwise the error's
/// source chain is checked for TLS keywords; the top-level message is left
/// out of the check because it embeds the request URL.
pub fn classify_reqwest_error(error: &reqwest::Error) -> TransportError {
    let causes = source_messages(error);

    let kind = if error.is_timeout() {
        FetchErrorKind::Transport
    } else if causes.iter().any(|cause| is_tls_error(cause)) {
        FetchErrorKind::Tls
    } else {
        FetchErrorKind::Transport
    };

    let mut message = error.to_string();
    for cause in &causes {
        if !message.contains(cause.as_str()) {
            message.push_str(": ");
            message.push_str(cause);
        }
    }

    TransportError::new(kind, message)
}

fn source_messages(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        messages.push(cause.to_string());
        current = cause.source();
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, LOCATION};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fatal `handshake_failure` alert record
    const HANDSHAKE_FAILURE_ALERT: [u8; 7] = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];

    fn head_request(url: String, timeout: Duration) -> TransportRequest {
        TransportRequest {
            method: RequestMethod::Head,
            url,
            verify_tls: true,
            timeout,
        }
    }

    /// Accepts connections and rejects every ClientHello with an alert
    async fn spawn_alerting_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    if socket.read(&mut buf).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let _ = socket.write_all(&HANDSHAKE_FAILURE_ALERT).await;
                    let _ = socket.flush().await;
                    while socket.read(&mut buf).await.unwrap_or(0) > 0 {}
                });
            }
        });

        format!("https://{}/", addr)
    }

    #[test]
    fn test_build_http_transport() {
        let transport = HttpTransport::new(crate::fetch::DEFAULT_USER_AGENT);
        assert!(transport.is_ok());
    }

    #[test]
    fn test_header_joins_values() {
        let mut headers = HeaderMap::new();
        headers.append("x-robots-tag", HeaderValue::from_static("noindex"));
        headers.append("x-robots-tag", HeaderValue::from_static("nofollow"));
        headers.insert(LOCATION, HeaderValue::from_static("/next"));

        let response = TransportResponse {
            url: "https://example.com/".to_string(),
            status: 200,
            headers,
            body: Vec::new(),
        };

        assert_eq!(
            response.header("X-Robots-Tag"),
            Some("noindex, nofollow".to_string())
        );
        assert_eq!(response.header("location"), Some("/next".to_string()));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::new(FetchErrorKind::Tls, "invalid peer certificate");
        assert!(error.is_tls());
        assert_eq!(error.to_string(), "invalid peer certificate");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = HttpTransport::new(crate::fetch::DEFAULT_USER_AGENT).unwrap();
        let request = head_request("http://127.0.0.1:1/".to_string(), Duration::from_secs(5));

        let error = transport.send(&request).await.unwrap_err();
        assert_eq!(error.kind, FetchErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(crate::fetch::DEFAULT_USER_AGENT).unwrap();
        let request = head_request(format!("{}/slow", server.uri()), Duration::from_secs(1));

        let error = transport.send(&request).await.unwrap_err();
        assert_eq!(error.kind, FetchErrorKind::Transport);
        assert!(!error.is_tls());
    }

    #[tokio::test]
    async fn test_handshake_failure_is_tls_error() {
        let url = spawn_alerting_server().await;
        let transport = HttpTransport::new(crate::fetch::DEFAULT_USER_AGENT).unwrap();

        let error = transport
            .send(&head_request(url, Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert_eq!(error.kind, FetchErrorKind::Tls, "{}", error);
        assert!(error.message.to_lowercase().contains("handshake"));
    }
}
