//! Step executor
//!
//! Runs a scenario's steps strictly in order against one authenticated
//! client. Every step runs once per call and yields exactly one outcome; a
//! failed step never stops the steps after it. A step whose inputs were
//! never produced fails its own precondition check instead, and a failed
//! step clears the state keys it owns.

use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};

use super::config::{Scenario, StepDefinition};
use super::outcome::{StepFailure, StepOutcome};
use super::report::{RunReport, StepReport};
use super::state::ScenarioState;
use super::validator::ResponseValidator;
use crate::http::{AuthenticatedClient, ResponseRecord};

#[derive(Debug, Clone, Default)]
pub struct StepExecutor {
    validator: ResponseValidator,
}

impl StepExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute every step of `scenario` in `order` order
    ///
    /// `state` is read and written in place, so running the same scenario
    /// twice with one state carries values across both runs.
    pub async fn run(
        &self,
        scenario: &Scenario,
        client: &AuthenticatedClient,
        state: &mut ScenarioState,
    ) -> RunReport {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");

        let mut reports = Vec::with_capacity(scenario.steps.len());
        for step in scenario.ordered_steps() {
            let span = info_span!("step", name = %step.name, order = step.order);
            let report = self.run_step(step, client, state).instrument(span).await;
            reports.push(report);
        }

        let report = RunReport::new(&scenario.name, client.is_authenticated(), reports);
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            "Scenario finished"
        );
        report
    }

    async fn run_step(
        &self,
        step: &StepDefinition,
        client: &AuthenticatedClient,
        state: &mut ScenarioState,
    ) -> StepReport {
        let started = Instant::now();
        let (path, outcome) = match step.request.resolve(state) {
            Err(failure) => (step.request.path.clone(), StepOutcome::Failed(failure)),
            Ok(request) => {
                debug!(method = %request.method, path = %request.path, "Sending");
                let outcome = match client.send(request.method, &request.path, request.body).await {
                    Ok(response) => self.settle(step, &response, state),
                    Err(e) => StepOutcome::Failed(StepFailure::Transport {
                        message: e.to_string(),
                    }),
                };
                (request.path, outcome)
            }
        };

        match &outcome {
            StepOutcome::Passed => info!("Step passed"),
            StepOutcome::Failed(failure) => {
                warn!(%failure, "Step failed");
                // Values from an earlier run must not outlive a failed producer
                for key in step.provides() {
                    if state.invalidate(&key, &step.name) {
                        debug!(%key, "Invalidated stale value");
                    }
                }
            }
        }

        StepReport {
            name: step.name.clone(),
            order: step.order,
            method: step.request.method,
            path,
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Validate the response, then write captures into state
    ///
    /// Captures are extracted before any is written, so a failing capture
    /// leaves state untouched.
    fn settle(
        &self,
        step: &StepDefinition,
        response: &ResponseRecord,
        state: &mut ScenarioState,
    ) -> StepOutcome {
        if let Err(failure) = self.validator.validate(response, &step.expect) {
            return StepOutcome::Failed(failure.into());
        }

        let mut captured = Vec::with_capacity(step.capture.len());
        for capture in &step.capture {
            match self.validator.capture(response, capture) {
                Ok(value) => captured.push((capture.into.as_str(), value)),
                Err(failure) => return StepOutcome::Failed(failure.into()),
            }
        }

        for (key, value) in captured {
            debug!(%key, %value, "Captured");
            if let Err(e) = state.set(key, value, &step.name) {
                return StepOutcome::Failed(StepFailure::assertion(
                    format!("sole writer of '{}'", key),
                    e.to_string(),
                ));
            }
        }

        StepOutcome::Passed
    }
}
