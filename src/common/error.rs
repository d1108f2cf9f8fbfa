//! Error types for the story harness
//!
//! These are setup-level and fatal errors. Failures that belong to a single
//! scenario step are recorded as data in `scenario::StepFailure` instead.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the story harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Scenario Errors ===
    #[error("Invalid scenario '{name}': {reason}")]
    Scenario { name: String, reason: String },

    // === Transport Errors ===
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // === Authentication Errors ===
    #[error("Login did not yield an access token (status {status}): {reason}")]
    MissingToken { status: u16, reason: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a scenario validation error
    pub fn scenario(name: &str, reason: impl Into<String>) -> Self {
        Self::Scenario {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a file read error from an IO failure
    pub fn file_read(path: &std::path::Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
