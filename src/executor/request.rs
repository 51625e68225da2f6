//! Outbound request description and resolution.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Serialize;

use crate::config::SecretString;
use crate::error::MoltgramError;
use crate::transport::Method;

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One outbound call.
///
/// Built per call by the facades and consumed by
/// [`RequestExecutor::execute`](super::RequestExecutor::execute).
///
/// # Example
///
/// ```
/// use moltgram::executor::RequestSpec;
///
/// let spec = RequestSpec::get("/posts")
///     .query("sort", "hot")
///     .query_opt("community", None::<&str>)
///     .query("limit", 25);
/// assert_eq!(spec.endpoint(), "GET /posts");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

impl RequestSpec {
    /// Create a request for `method` on `path` (relative to the base URL).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// GET `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST `path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// PATCH `path`.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// DELETE `path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a query parameter. Empty strings are sent as `key=`.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), Some(value.to_string())));
        self
    }

    /// Add a query parameter that is omitted from the URL when `None`.
    #[must_use]
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `payload` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a configuration error (`INVALID_REQUEST`) if `payload` cannot
    /// be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, MoltgramError> {
        let value = serde_json::to_value(payload)
            .map_err(|e| MoltgramError::invalid_request(format!("unserializable body: {e}")))?;
        Ok(self.body(value))
    }

    /// Add a per-call header. Wins over a static header with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body_value(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// `METHOD path`, used as the metrics and log key.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Resolve the absolute URL against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error (`INVALID_REQUEST`) if the joined URL
    /// does not parse.
    pub fn build_url(&self, base_url: &str) -> Result<Url, MoltgramError> {
        let joined = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| MoltgramError::invalid_request(format!("invalid URL '{joined}': {e}")))?;

        let mut present = self
            .query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .peekable();
        if present.peek().is_some() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    /// Serialized body text.
    pub(crate) fn body_text(&self) -> Result<Option<String>, MoltgramError> {
        self.body
            .as_ref()
            .map(|b| {
                serde_json::to_string(b)
                    .map_err(|e| MoltgramError::invalid_request(format!("unserializable body: {e}")))
            })
            .transpose()
    }

    /// Build the final header set.
    ///
    /// Order: static headers, per-call overrides, content type for bodies,
    /// request id, then the bearer credential when one is configured.
    pub(crate) fn build_headers(
        &self,
        static_headers: &[(String, String)],
        credential: Option<&SecretString>,
        request_id: &str,
    ) -> Result<HeaderMap, MoltgramError> {
        let mut headers = HeaderMap::new();
        for (name, value) in static_headers.iter().chain(&self.headers) {
            headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
        }

        if self.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            parse_header_value(REQUEST_ID_HEADER, request_id)?,
        );

        if let Some(key) = credential.filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose()))
                .map_err(|_| MoltgramError::invalid_request("credential is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, MoltgramError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| MoltgramError::invalid_request(format!("invalid header name '{name}'")))
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, MoltgramError> {
    HeaderValue::from_str(value)
        .map_err(|_| MoltgramError::invalid_request(format!("invalid value for header '{name}'")))
}
