//! HTTP transport seam.
//!
//! The executor describes each attempt as a plain-data [`HttpRequest`] and
//! hands it to an [`HttpTransport`]. The production implementation is
//! [`ReqwestTransport`]; tests substitute scripted transports.
//!
//! The per-attempt deadline is enforced by the executor, which drops the
//! future returned by [`HttpTransport::send`] when the timeout fires. Any
//! connection or handle owned by that future is released by `Drop`.

mod http;

pub use http::ReqwestTransport;

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// One fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query string.
    pub url: reqwest::Url,
    /// Final header set (auth included).
    pub headers: HeaderMap,
    /// Serialized JSON body.
    pub body: Option<String>,
}

/// A completed response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body text.
    pub body: String,
}

impl HttpResponse {
    /// Convenience constructor used by scripted transports.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure before a complete response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not connect (DNS failure, refused, reset during connect).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport's own timer fired.
    #[error("transport timed out")]
    Timeout,

    /// Any other I/O or protocol failure.
    #[error("{0}")]
    Other(String),
}

/// Issues HTTP requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and read the full response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
