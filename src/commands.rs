//! CLI command definitions
//!
//! Defines the clap commands for the story harness CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and run the scenario against the story API
    Run(RunArgs),

    /// Load a YAML scenario file and check its step ordering and dependencies
    Validate {
        /// Path to the YAML scenario file
        path: PathBuf,
    },

    /// List the steps of a scenario in execution order
    Steps {
        /// YAML scenario file (default: built-in story lifecycle)
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the service under test
    #[arg(long, env = "STORY_HARNESS_BASE_URL")]
    pub base_url: Option<String>,

    /// Login username
    #[arg(long, short, env = "STORY_HARNESS_USERNAME")]
    pub username: Option<String>,

    /// Login password
    #[arg(long, short, env = "STORY_HARNESS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Abort if login returns no access token
    #[arg(long)]
    pub require_token: bool,

    /// YAML scenario file (default: built-in story lifecycle)
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}
