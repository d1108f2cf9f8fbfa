//! Authenticated client
//!
//! Wraps a transport so every request carries the run's bearer token, and
//! owns the transport's release at teardown.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::auth::Credential;
use super::transport::{ApiRequest, HttpTransport, Method, ResponseRecord};
use crate::common::Result;

/// Client shared by every step of a run
///
/// The transport is released exactly once: by [`AuthenticatedClient::close`]
/// or, if that never runs, when the client is dropped.
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    credential: Option<Credential>,
    closed: bool,
}

impl AuthenticatedClient {
    pub fn new(transport: Arc<dyn HttpTransport>, credential: Option<Credential>) -> Self {
        Self {
            transport,
            credential,
            closed: false,
        }
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Send one request with the bearer token attached
    ///
    /// Transport faults propagate; HTTP error statuses are returned as
    /// ordinary records.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ResponseRecord> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        if let Some(credential) = &self.credential {
            request = request.with_bearer(credential.token());
        }

        let response = self.transport.execute(request).await?;
        debug!(%method, %path, status = response.status, "Request completed");
        Ok(response)
    }

    /// Release the transport
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport.close();
            debug!("Client closed");
        }
    }
}

impl Drop for AuthenticatedClient {
    fn drop(&mut self) {
        self.release();
    }
}
