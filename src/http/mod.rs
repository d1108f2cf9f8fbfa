//! HTTP plumbing: transport seam, login, and the authenticated client

pub mod auth;
pub mod client;
pub mod transport;

pub use auth::{Credential, CredentialProvider, TokenOutcome};
pub use client::AuthenticatedClient;
pub use transport::{ApiRequest, HttpTransport, Method, ReqwestTransport, ResponseRecord};
