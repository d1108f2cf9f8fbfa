//! HTTP transport seam
//!
//! The harness never talks to `reqwest` directly. Everything goes through
//! [`HttpTransport`] so that tests can drive the full scenario against an
//! in-memory service.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::common::{Error, Result};

/// HTTP methods used by the story API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
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
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully resolved outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the transport's base URL, e.g. `/api/Story/All`
    pub path: String,
    pub body: Option<Value>,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status and body of one HTTP exchange
///
/// Transient: built per call and dropped once the step has validated it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub status: u16,
    pub body: String,
}

impl ResponseRecord {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the body carries any content
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Structured view of the body, if it parses as JSON
    pub fn json(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Capability that sends one request and returns its response
///
/// Implementations perform no retries. Failures below HTTP semantics
/// (connection refused, DNS, TLS) are returned as `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseRecord>;

    /// Release underlying resources. Called once at teardown.
    fn close(&self) {}
}

/// Production transport backed by a `reqwest::Client`
///
/// `close` drops the client and its connection pool; any request after
/// that is refused.
pub struct ReqwestTransport {
    client: Mutex<Option<reqwest::Client>>,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("story-harness/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Handle to the live client; the lock is not held across the request
    fn live_client(&self) -> Result<reqwest::Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::Internal("transport already closed".to_string()))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseRecord> {
        let client = self.live_client()?;
        let url = self.url_for(&request.path);
        trace!(method = %request.method, %url, "Sending request");

        let mut builder = client.request(request.method.into(), &url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Error::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Transport)?;

        trace!(status, bytes = body.len(), "Received response");
        Ok(ResponseRecord { status, body })
    }

    fn close(&self) {
        let released = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!(base_url = %self.base_url, "Connection pool released");
        }
    }
}
