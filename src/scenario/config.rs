//! Scenario definition types
//!
//! Defines the data structures for scenarios, either built in code or
//! deserialized from YAML files.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outcome::StepFailure;
use super::state::ScenarioState;
use crate::common::{Error, Result};
use crate::http::Method;

/// A complete scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    #[serde(default)]
    pub description: Option<String>,
    /// Steps, executed by ascending `order`
    pub steps: Vec<StepDefinition>,
}

/// One named unit of the scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    /// Position in the run; unique within a scenario
    pub order: u32,
    pub request: RequestTemplate,
    pub expect: Expectation,
    /// Response fields copied into state when the step passes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capture: Vec<Capture>,
}

/// Request whose path and string body values may contain `{key}` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// What the response must look like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    /// Required status code
    pub status: u16,
    /// Body checks, evaluated in order after the status matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<BodyCheck>,
}

/// A body assertion and whether it is skipped on an empty body
///
/// Deserialized through `RawBodyCheck` so that a misspelled key is an
/// error rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBodyCheck")]
pub struct BodyCheck {
    #[serde(flatten)]
    pub assertion: BodyAssertion,
    /// Only check when the body is non-empty
    #[serde(default = "default_if_present")]
    pub if_present: bool,
}

fn default_if_present() -> bool {
    true
}

/// Kinds of body assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyAssertion {
    /// Raw body contains `text`
    Contains { text: String },
    /// Body is a JSON array with at least `min` elements
    ArrayMinLen { min: usize },
    /// Body is a JSON object whose `field` is a non-empty string
    FieldPresent { field: String },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AssertionKind {
    Contains,
    ArrayMinLen,
    FieldPresent,
}

/// Wire form of a [`BodyCheck`]: every key spelled out, nothing else accepted
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBodyCheck {
    kind: AssertionKind,
    text: Option<String>,
    min: Option<usize>,
    field: Option<String>,
    #[serde(default = "default_if_present")]
    if_present: bool,
}

impl TryFrom<RawBodyCheck> for BodyCheck {
    type Error = String;

    fn try_from(raw: RawBodyCheck) -> std::result::Result<Self, Self::Error> {
        let assertion = match (raw.kind, raw.text, raw.min, raw.field) {
            (AssertionKind::Contains, Some(text), None, None) => BodyAssertion::Contains { text },
            (AssertionKind::ArrayMinLen, None, Some(min), None) => BodyAssertion::ArrayMinLen { min },
            (AssertionKind::FieldPresent, None, None, Some(field)) => {
                BodyAssertion::FieldPresent { field }
            }
            (AssertionKind::Contains, ..) => return Err("`contains` takes exactly `text`".into()),
            (AssertionKind::ArrayMinLen, ..) => {
                return Err("`array_min_len` takes exactly `min`".into())
            }
            (AssertionKind::FieldPresent, ..) => {
                return Err("`field_present` takes exactly `field`".into())
            }
        };
        Ok(Self {
            assertion,
            if_present: raw.if_present,
        })
    }
}

/// Copy a top-level JSON field of the response body into state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub field: String,
    pub into: String,
}

/// A request with every placeholder substituted
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Expectation {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    /// Add a check that only applies to a non-empty body
    pub fn with_check(mut self, assertion: BodyAssertion) -> Self {
        self.body.push(BodyCheck {
            assertion,
            if_present: true,
        });
        self
    }

    /// Add a check that also fails on an empty body
    pub fn with_required_check(mut self, assertion: BodyAssertion) -> Self {
        self.body.push(BodyCheck {
            assertion,
            if_present: false,
        });
        self
    }
}

impl RequestTemplate {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// State keys this request refers to
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        collect_placeholders(&self.path, &mut keys);
        if let Some(body) = &self.body {
            collect_value_placeholders(body, &mut keys);
        }
        keys
    }

    /// Substitute placeholders from state
    ///
    /// Fails with a precondition failure naming the first absent key.
    pub fn resolve(&self, state: &ScenarioState) -> std::result::Result<ResolvedRequest, StepFailure> {
        let path = substitute(&self.path, state)?;
        let body = match &self.body {
            Some(body) => Some(substitute_value(body, state)?),
            None => None,
        };
        Ok(ResolvedRequest {
            method: self.method,
            path,
            body,
        })
    }
}

impl StepDefinition {
    pub fn new(name: impl Into<String>, order: u32, request: RequestTemplate, expect: Expectation) -> Self {
        Self {
            name: name.into(),
            order,
            request,
            expect,
            capture: Vec::new(),
        }
    }

    pub fn capturing(mut self, field: impl Into<String>, into: impl Into<String>) -> Self {
        self.capture.push(Capture {
            field: field.into(),
            into: into.into(),
        });
        self
    }

    /// State keys this step needs
    pub fn requires(&self) -> BTreeSet<String> {
        self.request.placeholders()
    }

    /// State keys this step produces
    pub fn provides(&self) -> BTreeSet<String> {
        self.capture.iter().map(|c| c.into.clone()).collect()
    }
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Steps in execution order
    pub fn ordered_steps(&self) -> Vec<&StepDefinition> {
        let mut steps: Vec<&StepDefinition> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    /// Check the scenario without running it
    ///
    /// Orders must form a total order and names must be unique. Each state
    /// key has one capturing step, and every key a step requires must be
    /// captured by a step that runs before it.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::scenario(&self.name, "scenario has no steps"));
        }

        let mut names = HashSet::new();
        let mut orders: HashMap<u32, &str> = HashMap::new();
        for step in &self.steps {
            if !names.insert(step.name.as_str()) {
                return Err(Error::scenario(
                    &self.name,
                    format!("duplicate step name '{}'", step.name),
                ));
            }
            if let Some(other) = orders.insert(step.order, step.name.as_str()) {
                return Err(Error::scenario(
                    &self.name,
                    format!(
                        "steps '{}' and '{}' share order {}",
                        other, step.name, step.order
                    ),
                ));
            }
        }

        let mut writers: HashMap<String, &str> = HashMap::new();
        for step in &self.steps {
            for key in step.provides() {
                if let Some(other) = writers.insert(key.clone(), step.name.as_str()) {
                    return Err(Error::scenario(
                        &self.name,
                        format!(
                            "key '{}' is captured by both '{}' and '{}'",
                            key, other, step.name
                        ),
                    ));
                }
            }
        }

        let mut available = BTreeSet::new();
        for step in self.ordered_steps() {
            let missing: Vec<String> = step.requires().difference(&available).cloned().collect();
            if !missing.is_empty() {
                return Err(Error::scenario(
                    &self.name,
                    format!(
                        "step '{}' requires {:?}, which no earlier step captures",
                        step.name, missing
                    ),
                ));
            }
            available.extend(step.provides());
        }

        Ok(())
    }
}

/// Whether `key` is a valid placeholder name: `[A-Za-z0-9_]+`
fn is_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Scan `text` for `{key}` spans, calling `f` with (start, end, key)
fn scan_placeholders(text: &str, mut f: impl FnMut(usize, usize, &str)) {
    let mut from = 0;
    while let Some(open) = text[from..].find('{').map(|i| i + from) {
        match text[open + 1..].find('}').map(|i| i + open + 1) {
            Some(close) => {
                let key = &text[open + 1..close];
                if is_key(key) {
                    f(open, close + 1, key);
                    from = close + 1;
                } else {
                    from = open + 1;
                }
            }
            None => break,
        }
    }
}

fn collect_placeholders(text: &str, keys: &mut BTreeSet<String>) {
    scan_placeholders(text, |_, _, key| {
        keys.insert(key.to_string());
    });
}

fn collect_value_placeholders(value: &Value, keys: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => collect_placeholders(s, keys),
        Value::Array(items) => items
            .iter()
            .for_each(|v| collect_value_placeholders(v, keys)),
        Value::Object(map) => map
            .values()
            .for_each(|v| collect_value_placeholders(v, keys)),
        _ => {}
    }
}

fn substitute(text: &str, state: &ScenarioState) -> std::result::Result<String, StepFailure> {
    let mut spans = Vec::new();
    scan_placeholders(text, |start, end, key| spans.push((start, end, key.to_string())));

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end, key) in spans {
        out.push_str(&text[last..start]);
        out.push_str(state.require(&key)?);
        last = end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn substitute_value(value: &Value, state: &ScenarioState) -> std::result::Result<Value, StepFailure> {
    Ok(match value {
        Value::String(s) => Value::String(substitute(s, state)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| substitute_value(v, state))
                .collect::<std::result::Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), substitute_value(v, state)?)))
                .collect::<std::result::Result<_, StepFailure>>()?,
        ),
        other => other.clone(),
    })
}
