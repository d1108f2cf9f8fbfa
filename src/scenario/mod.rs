//! Stateful scenario execution
//!
//! A scenario is an ordered chain of named steps. Each step builds a
//! request (possibly from values earlier steps captured), sends it through
//! the authenticated client, and validates the response against a
//! structured expectation.

pub mod canonical;
mod config;
mod executor;
mod outcome;
mod report;
mod state;
mod validator;

pub use config::*;
pub use executor::StepExecutor;
pub use outcome::{AssertionFailure, StepFailure, StepOutcome};
pub use report::{RunReport, StepReport};
pub use state::{ScenarioState, StateError, CREATED_RESOURCE_ID};
pub use validator::ResponseValidator;
