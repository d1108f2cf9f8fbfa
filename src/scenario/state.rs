//! Scenario state
//!
//! Values produced by one step and consumed by later ones. The state is an
//! explicit object handed to the executor, never a global.

use std::collections::HashMap;

use thiserror::Error;

use super::outcome::StepFailure;

/// Well-known key for the id of the story created by the scenario
pub const CREATED_RESOURCE_ID: &str = "createdResourceId";

/// Rejected state write
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("key '{key}' is owned by step '{owner}', step '{writer}' may not write it")]
    ForeignWriter {
        key: String,
        owner: String,
        writer: String,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    writer: String,
}

/// Mapping from logical names to values produced during a run
///
/// Each key has a single writer: the first step that sets it owns it and
/// may overwrite it later; any other step is rejected.
#[derive(Debug, Clone, Default)]
pub struct ScenarioState {
    entries: HashMap<String, Entry>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        writer: &str,
    ) -> Result<(), StateError> {
        let key = key.into();
        if let Some(existing) = self.entries.get(&key) {
            if existing.writer != writer {
                return Err(StateError::ForeignWriter {
                    key,
                    owner: existing.writer.clone(),
                    writer: writer.to_string(),
                });
            }
        }
        self.entries.insert(
            key,
            Entry {
                value: value.into(),
                writer: writer.to_string(),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// Read a value a step depends on; absence is a precondition failure
    pub fn require(&self, key: &str) -> Result<&str, StepFailure> {
        self.get(key).ok_or_else(|| StepFailure::precondition(key))
    }

    /// Drop `key` if `writer` owns it; returns whether a value was removed
    pub fn invalidate(&mut self, key: &str, writer: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.writer == writer => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Step that wrote `key`
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.writer.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
