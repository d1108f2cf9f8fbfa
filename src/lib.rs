//! Story Harness - conformance checks for the story spoiler HTTP API
//!
//! This library logs in once, then drives an ordered scenario of dependent
//! requests against the story endpoints, threading the bearer token and
//! captured resource ids through every step.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod http;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::Harness;
pub use http::{AuthenticatedClient, CredentialProvider, HttpTransport, Method, ResponseRecord};
pub use scenario::{RunReport, Scenario, ScenarioState, StepExecutor, StepFailure, StepOutcome};
