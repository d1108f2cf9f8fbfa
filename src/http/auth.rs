//! Credential provider
//!
//! Performs the single login exchange of a run and extracts the bearer
//! token from the response.

use std::fmt;

use serde_json::json;
use tracing::{debug, warn};

use super::transport::{ApiRequest, HttpTransport, Method};
use crate::common::{Error, Result};

/// Login endpoint of the story API
pub const LOGIN_PATH: &str = "/api/User/Authentication";

/// Response field holding the bearer token
pub const TOKEN_FIELD: &str = "accessToken";

/// Opaque bearer token
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// What the login exchange produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Acquired(Credential),
    /// Login answered, but without a usable token
    Missing { status: u16, reason: String },
}

impl TokenOutcome {
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            TokenOutcome::Acquired(credential) => Some(credential),
            TokenOutcome::Missing { .. } => None,
        }
    }

    /// Strict policy: a missing token becomes an error
    pub fn require(self) -> Result<Credential> {
        match self {
            TokenOutcome::Acquired(credential) => Ok(credential),
            TokenOutcome::Missing { status, reason } => Err(Error::MissingToken { status, reason }),
        }
    }
}

/// Performs the login exchange
#[derive(Debug, Clone, Default)]
pub struct CredentialProvider {
    login_path: Option<String>,
}

impl CredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different login endpoint
    pub fn with_login_path(path: impl Into<String>) -> Self {
        Self {
            login_path: Some(path.into()),
        }
    }

    /// Send one unauthenticated login request and extract the token
    ///
    /// The status code is not inspected: a rejected login shows up as
    /// `Missing`, and the authenticated steps then fail on their own.
    pub async fn acquire_token(
        &self,
        transport: &dyn HttpTransport,
        username: &str,
        password: &str,
    ) -> Result<TokenOutcome> {
        let path = self.login_path.as_deref().unwrap_or(LOGIN_PATH);
        debug!(%path, %username, "Logging in");

        let request = ApiRequest::new(Method::Post, path)
            .with_body(json!({ "username": username, "password": password }));
        let response = transport.execute(request).await?;

        let outcome = match response.json() {
            Ok(body) => match body.get(TOKEN_FIELD).and_then(|v| v.as_str()) {
                Some(token) if !token.is_empty() => TokenOutcome::Acquired(Credential::new(token)),
                Some(_) => TokenOutcome::Missing {
                    status: response.status,
                    reason: format!("'{}' is empty", TOKEN_FIELD),
                },
                None => TokenOutcome::Missing {
                    status: response.status,
                    reason: format!("'{}' missing or not a string", TOKEN_FIELD),
                },
            },
            Err(e) => TokenOutcome::Missing {
                status: response.status,
                reason: format!("login body is not JSON: {}", e),
            },
        };

        if let TokenOutcome::Missing { status, reason } = &outcome {
            warn!(status, %reason, "Login did not return an access token");
        } else {
            debug!(status = response.status, "Access token acquired");
        }

        Ok(outcome)
    }
}
