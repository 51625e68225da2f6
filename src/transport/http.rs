//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Connect timeout for new connections. The overall deadline is the executor's.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Transport using a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the TLS backend fails to initialize.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("moltgram-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with a proxy configured.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
