//! Transports that carry a store request and bring back its response.
//!
//! The request executor builds fully-formed requests; a transport only moves
//! bytes. Two implementations ship: [`HttpTransport`] for direct HTTP(S) and,
//! on unix, [`UnixSocketTransport`] for a local forwarding proxy.

mod http;
#[cfg(unix)]
mod unix;

pub use http::HttpTransport;
#[cfg(unix)]
pub use unix::UnixSocketTransport;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// HTTP methods the store API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-formed request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// First header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failures that prevent a response from being obtained at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Moves one request to the store and returns its response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send `request`, returning whatever status the store answered with.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
