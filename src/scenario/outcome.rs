//! Per-step results

use std::fmt;

use serde::Serialize;

/// Expected vs. actual for a failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    pub expected: String,
    pub actual: String,
}

impl AssertionFailure {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.actual)
    }
}

/// Why a step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepFailure {
    /// The step needs a state value no earlier step produced
    Precondition { key: String },
    /// Status or body did not match
    Assertion(AssertionFailure),
    /// No HTTP response was obtained
    Transport { message: String },
}

impl StepFailure {
    pub fn precondition(key: impl Into<String>) -> Self {
        Self::Precondition { key: key.into() }
    }

    pub fn assertion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Assertion(AssertionFailure::new(expected, actual))
    }
}

impl From<AssertionFailure> for StepFailure {
    fn from(failure: AssertionFailure) -> Self {
        Self::Assertion(failure)
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::Precondition { key } => {
                write!(f, "precondition not met: '{}' was never produced", key)
            }
            StepFailure::Assertion(failure) => write!(f, "assertion failed: {}", failure),
            StepFailure::Transport { message } => write!(f, "transport fault: {}", message),
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed(StepFailure),
}

impl StepOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepOutcome::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let failure = StepFailure::precondition("createdResourceId");
        assert_eq!(
            failure.to_string(),
            "precondition not met: 'createdResourceId' was never produced"
        );

        let failure = StepFailure::assertion("status 201", "status 400");
        assert_eq!(
            failure.to_string(),
            "assertion failed: expected status 201, got status 400"
        );
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let passed = serde_json::to_value(StepOutcome::Passed).unwrap();
        assert_eq!(passed["status"], "passed");

        let failed = serde_json::to_value(StepOutcome::Failed(StepFailure::Transport {
            message: "connection refused".to_string(),
        }))
        .unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["failure"]["kind"], "transport");
        assert_eq!(failed["failure"]["message"], "connection refused");
    }
}
