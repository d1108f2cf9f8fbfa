//! Response validation
//!
//! Status is checked first and always. Body checks follow in order; a check
//! marked `if_present` is skipped when the service returned an empty body.

use serde_json::Value;

use super::config::{BodyAssertion, BodyCheck, Capture, Expectation};
use super::outcome::AssertionFailure;
use crate::http::ResponseRecord;

/// Longest body excerpt quoted in a failure message
const EXCERPT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        response: &ResponseRecord,
        expect: &Expectation,
    ) -> Result<(), AssertionFailure> {
        if response.status != expect.status {
            return Err(AssertionFailure::new(
                format!("status {}", expect.status),
                format!("status {} (body: {})", response.status, excerpt(&response.body)),
            ));
        }

        for check in &expect.body {
            self.check_body(response, check)?;
        }
        Ok(())
    }

    fn check_body(&self, response: &ResponseRecord, check: &BodyCheck) -> Result<(), AssertionFailure> {
        if check.if_present && !response.has_body() {
            return Ok(());
        }

        match &check.assertion {
            BodyAssertion::Contains { text } => {
                if response.body.contains(text.as_str()) {
                    Ok(())
                } else {
                    Err(AssertionFailure::new(
                        format!("body containing '{}'", text),
                        format!("'{}'", excerpt(&response.body)),
                    ))
                }
            }
            BodyAssertion::ArrayMinLen { min } => match parse(response, "a JSON array")? {
                Value::Array(items) if items.len() >= *min => Ok(()),
                Value::Array(items) => Err(AssertionFailure::new(
                    format!("array with at least {} element(s)", min),
                    format!("array with {} element(s)", items.len()),
                )),
                other => Err(AssertionFailure::new(
                    "a JSON array",
                    format!("JSON {}", kind_of(&other)),
                )),
            },
            BodyAssertion::FieldPresent { field } => {
                let body = parse(response, "a JSON object")?;
                non_empty_string_field(&body, field).map(|_| ())
            }
        }
    }

    /// Extract a captured value from a response that already passed validation
    pub fn capture(&self, response: &ResponseRecord, capture: &Capture) -> Result<String, AssertionFailure> {
        let body = parse(response, "a JSON object")?;
        non_empty_string_field(&body, &capture.field).map(str::to_string)
    }
}

fn parse(response: &ResponseRecord, wanted: &str) -> Result<Value, AssertionFailure> {
    response.json().map_err(|e| {
        AssertionFailure::new(
            wanted.to_string(),
            format!("unparseable body ({}): '{}'", e, excerpt(&response.body)),
        )
    })
}

fn non_empty_string_field<'a>(body: &'a Value, field: &str) -> Result<&'a str, AssertionFailure> {
    let expected = || format!("non-empty string field '{}'", field);
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(AssertionFailure::new(expected(), "empty string")),
        Some(other) => Err(AssertionFailure::new(expected(), format!("JSON {}", kind_of(other)))),
        None => Err(AssertionFailure::new(
            expected(),
            format!("no such field in {}", excerpt(&body.to_string())),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_LEN {
        body.to_string()
    } else {
        let cut: String = body.chars().take(EXCERPT_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(status: u16, body: &str, expect: &Expectation) -> Result<(), AssertionFailure> {
        ResponseValidator::new().validate(&ResponseRecord::new(status, body), expect)
    }

    #[test]
    fn test_status_mismatch_always_fails() {
        let expect = Expectation::status(201);
        let err = validate(400, "", &expect).unwrap_err();
        assert_eq!(err.expected, "status 201");
        assert!(err.actual.starts_with("status 400"));
        assert!(validate(201, "", &expect).is_ok());
    }

    #[test]
    fn test_status_checked_before_body() {
        let expect = Expectation::status(404).with_check(BodyAssertion::Contains {
            text: "No spoilers".to_string(),
        });
        let err = validate(500, "No spoilers", &expect).unwrap_err();
        assert_eq!(err.expected, "status 404");
    }

    #[test]
    fn test_contains_skipped_on_empty_body() {
        let expect = Expectation::status(404).with_check(BodyAssertion::Contains {
            text: "No spoilers".to_string(),
        });
        assert!(validate(404, "", &expect).is_ok());
        assert!(validate(404, r#"{"msg":"No spoilers..."}"#, &expect).is_ok());

        let err = validate(404, "Something else", &expect).unwrap_err();
        assert_eq!(err.expected, "body containing 'No spoilers'");
    }

    #[test]
    fn test_array_min_len() {
        let expect = Expectation::status(200)
            .with_required_check(BodyAssertion::ArrayMinLen { min: 1 });
        assert!(validate(200, r#"[{"id":"1"}]"#, &expect).is_ok());

        let err = validate(200, "[]", &expect).unwrap_err();
        assert_eq!(err.actual, "array with 0 element(s)");

        let err = validate(200, r#"{"items":[]}"#, &expect).unwrap_err();
        assert_eq!(err.actual, "JSON object");
    }

    #[test]
    fn test_required_structural_check_fails_on_empty_body() {
        let expect = Expectation::status(200)
            .with_required_check(BodyAssertion::ArrayMinLen { min: 1 });
        let err = validate(200, "", &expect).unwrap_err();
        assert!(err.actual.starts_with("unparseable body"));
    }

    #[test]
    fn test_malformed_body_is_assertion_not_panic() {
        let expect = Expectation::status(200).with_check(BodyAssertion::FieldPresent {
            field: "storyId".to_string(),
        });
        let err = validate(200, "<html>oops</html>", &expect).unwrap_err();
        assert_eq!(err.expected, "a JSON object");
    }

    #[test]
    fn test_capture() {
        let validator = ResponseValidator::new();
        let capture = Capture {
            field: "storyId".to_string(),
            into: "createdResourceId".to_string(),
        };

        let ok = ResponseRecord::new(201, r#"{"msg":"Successfully created!","storyId":"s-1"}"#);
        assert_eq!(validator.capture(&ok, &capture).unwrap(), "s-1");

        let empty = ResponseRecord::new(201, r#"{"storyId":""}"#);
        assert_eq!(validator.capture(&empty, &capture).unwrap_err().actual, "empty string");

        let numeric = ResponseRecord::new(201, r#"{"storyId":7}"#);
        assert_eq!(validator.capture(&numeric, &capture).unwrap_err().actual, "JSON number");

        let missing = ResponseRecord::new(201, r#"{"msg":"created"}"#);
        assert!(validator
            .capture(&missing, &capture)
            .unwrap_err()
            .actual
            .starts_with("no such field"));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(EXCERPT_LEN + 10);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.len(), EXCERPT_LEN + 3);
    }
}
