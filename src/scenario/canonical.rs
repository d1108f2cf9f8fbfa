//! Built-in story lifecycle scenario
//!
//! Create, edit, list and delete a story, then probe the three rejection
//! paths. `scenarios/story_lifecycle.yaml` holds the same scenario as data.

use serde_json::json;

use super::config::{BodyAssertion, Expectation, RequestTemplate, Scenario, StepDefinition};
use super::state::CREATED_RESOURCE_ID;
use crate::http::Method;

pub const CREATE_PATH: &str = "/api/Story/Create";
pub const LIST_PATH: &str = "/api/Story/All";

/// Response field carrying the id of a created story
pub const STORY_ID_FIELD: &str = "storyId";

/// Id that never names an existing story
pub const MISSING_STORY_ID: &str = "4444";

/// Malformed id the delete endpoint rejects
pub const MALFORMED_STORY_ID: &str = "non-existing-id";

/// Fragment of the service's "not found" message
pub const NOT_FOUND_MESSAGE: &str = "No spoilers";

/// Fragment of the service's "cannot delete" message
pub const CANNOT_DELETE_MESSAGE: &str = "Unable to delete this story spoiler!";

pub fn edit_path(id: &str) -> String {
    format!("/api/Story/Edit/{}", id)
}

pub fn delete_path(id: &str) -> String {
    format!("/api/Story/Delete/{}", id)
}

fn created_id_placeholder() -> String {
    format!("{{{}}}", CREATED_RESOURCE_ID)
}

/// The seven canonical steps
pub fn story_lifecycle() -> Scenario {
    let steps = vec![
        StepDefinition::new(
            "create_story",
            1,
            RequestTemplate::new(Method::Post, CREATE_PATH).with_body(json!({
                "title": "New story2",
                "description": "Test story description",
            })),
            Expectation::status(201),
        )
        .capturing(STORY_ID_FIELD, CREATED_RESOURCE_ID),
        StepDefinition::new(
            "edit_story",
            2,
            RequestTemplate::new(Method::Put, edit_path(&created_id_placeholder())).with_body(
                json!({
                    "title": "Updated Story Title",
                    "description": "Updated Story Description",
                    "url": "",
                }),
            ),
            Expectation::status(200),
        ),
        StepDefinition::new(
            "list_stories",
            3,
            RequestTemplate::new(Method::Get, LIST_PATH),
            Expectation::status(200).with_required_check(BodyAssertion::ArrayMinLen { min: 1 }),
        ),
        StepDefinition::new(
            "delete_story",
            4,
            RequestTemplate::new(Method::Delete, delete_path(&created_id_placeholder())),
            Expectation::status(200),
        ),
        StepDefinition::new(
            "create_story_missing_fields",
            5,
            RequestTemplate::new(Method::Post, CREATE_PATH).with_body(json!({ "url": "" })),
            Expectation::status(400),
        ),
        StepDefinition::new(
            "edit_missing_story",
            6,
            RequestTemplate::new(Method::Put, edit_path(MISSING_STORY_ID)).with_body(json!({
                "title": "Updated Story",
                "description": "Updated Description",
                "url": "",
            })),
            Expectation::status(404).with_check(BodyAssertion::Contains {
                text: NOT_FOUND_MESSAGE.to_string(),
            }),
        ),
        StepDefinition::new(
            "delete_missing_story",
            7,
            RequestTemplate::new(Method::Delete, delete_path(MALFORMED_STORY_ID)),
            Expectation::status(400).with_check(BodyAssertion::Contains {
                text: CANNOT_DELETE_MESSAGE.to_string(),
            }),
        ),
    ];

    Scenario {
        name: "story_lifecycle".to_string(),
        description: Some(
            "Create, edit, list and delete a story, then check the rejection paths".to_string(),
        ),
        steps,
    }
}
