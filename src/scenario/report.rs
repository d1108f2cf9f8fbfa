//! Run reports

use colored::Colorize;
use serde::Serialize;

use super::outcome::StepOutcome;
use crate::http::Method;

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub order: u32,
    pub method: Method,
    /// Resolved path, or the template when resolution failed
    pub path: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Result of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    /// Whether the client carried a bearer token
    pub authenticated: bool,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new(scenario: &str, authenticated: bool, steps: Vec<StepReport>) -> Self {
        Self {
            scenario: scenario.to_string(),
            authenticated,
            steps,
        }
    }

    /// True when every step passed
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_passed())
    }

    pub fn passed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.steps.len() - self.passed_count()
    }

    /// Look up a step's outcome by name
    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.outcome)
    }

    /// Pass/fail per step, in execution order
    pub fn pattern(&self) -> Vec<bool> {
        self.steps.iter().map(|s| s.outcome.is_passed()).collect()
    }

    /// Print a human-readable summary to stdout
    pub fn print(&self, verbose: bool) {
        println!(
            "\n{} {}",
            "Running Scenario:".blue().bold(),
            self.scenario.white().bold()
        );
        if !self.authenticated {
            println!(
                "  {}",
                "warning: no access token, requests were sent unauthenticated".yellow()
            );
        }

        println!("\n{}", "Steps:".cyan());
        for step in &self.steps {
            let request = format!("{} {}", step.method, step.path);
            match &step.outcome {
                StepOutcome::Passed => {
                    print!(
                        "  {} Step {}: {} ({})",
                        "✓".green(),
                        step.order,
                        step.name,
                        request.dimmed()
                    );
                    if verbose {
                        print!(" {}", format!("[{} ms]", step.elapsed_ms).dimmed());
                    }
                    println!();
                }
                StepOutcome::Failed(failure) => {
                    println!(
                        "  {} Step {}: {} ({})",
                        "✗".red(),
                        step.order,
                        step.name,
                        request.dimmed()
                    );
                    println!("      {}", failure.to_string().red());
                }
            }
        }

        let summary = format!(
            "{} passed, {} failed, {} total",
            self.passed_count(),
            self.failed_count(),
            self.steps.len()
        );
        if self.passed() {
            println!("\n{} {}\n", "✓".green().bold(), summary.green().bold());
        } else {
            println!("\n{} {}\n", "✗".red().bold(), summary.red().bold());
        }
    }
}
