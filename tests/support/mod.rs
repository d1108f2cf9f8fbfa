//! In-memory story service used by the integration tests
//!
//! Mimics the story spoiler API closely enough to drive the full scenario:
//! bearer-checked endpoints, 201 on create, 404/400 rejection paths with the
//! service's messages.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use story_harness::http::{ApiRequest, HttpTransport, Method, ResponseRecord};
use story_harness::{Error, Result};

pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
struct Story {
    title: String,
    description: String,
    url: String,
}

#[derive(Default)]
struct Inner {
    stories: BTreeMap<String, Story>,
    next_id: u64,
    issued: Option<String>,
    requests: Vec<ApiRequest>,
}

/// Knobs for injecting misbehavior
#[derive(Default, Clone)]
pub struct Faults {
    /// Create answers with this status instead of creating
    pub create_status: Option<u16>,
    /// Error responses carry no body
    pub empty_error_bodies: bool,
    /// Requests whose path starts with this fail below HTTP
    pub unreachable_prefix: Option<String>,
    /// Login answers 200 without an access token
    pub login_without_token: bool,
}

#[derive(Default)]
pub struct FakeStoryService {
    inner: Mutex<Inner>,
    faults: Mutex<Faults>,
    closes: AtomicUsize,
}

impl FakeStoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        let service = Self::default();
        *service.faults.lock().unwrap() = faults;
        service
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn story_count(&self) -> usize {
        self.inner.lock().unwrap().stories.len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Insert a story directly, bypassing the API
    pub fn seed(&self, title: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("seed-{}", inner.next_id);
        inner.stories.insert(
            id.clone(),
            Story {
                title: title.to_string(),
                description: String::new(),
                url: String::new(),
            },
        );
        id
    }

    fn respond(&self, request: &ApiRequest) -> ResponseRecord {
        let faults = self.faults.lock().unwrap().clone();
        let mut inner = self.inner.lock().unwrap();

        let error = |status: u16, body: Value| {
            if faults.empty_error_bodies {
                ResponseRecord::new(status, "")
            } else {
                ResponseRecord::new(status, body.to_string())
            }
        };

        if request.method == Method::Post && request.path == "/api/User/Authentication" {
            let body = request.body.clone().unwrap_or(Value::Null);
            if body["username"] != USERNAME || body["password"] != PASSWORD {
                return error(401, json!({ "message": "Invalid username or password" }));
            }
            if faults.login_without_token {
                return ResponseRecord::new(200, json!({ "username": USERNAME }).to_string());
            }
            let token = format!("token-{}", inner.requests.len());
            inner.issued = Some(token.clone());
            return ResponseRecord::new(
                200,
                json!({ "username": USERNAME, "accessToken": token }).to_string(),
            );
        }

        if inner.issued.is_none() || request.bearer != inner.issued {
            return ResponseRecord::new(401, "");
        }

        let path = request.path.as_str();
        match request.method {
            Method::Post if path == "/api/Story/Create" => {
                if let Some(status) = faults.create_status {
                    return error(status, json!({ "msg": "Create failed" }));
                }
                let body = request.body.clone().unwrap_or(Value::Null);
                let title = body["title"].as_str().unwrap_or_default();
                let description = body["description"].as_str().unwrap_or_default();
                if title.is_empty() || description.is_empty() {
                    return error(
                        400,
                        json!({ "errors": { "Title": ["required"], "Description": ["required"] } }),
                    );
                }
                inner.next_id += 1;
                let id = format!("story-{}", inner.next_id);
                inner.stories.insert(
                    id.clone(),
                    Story {
                        title: title.to_string(),
                        description: description.to_string(),
                        url: body["url"].as_str().unwrap_or_default().to_string(),
                    },
                );
                ResponseRecord::new(
                    201,
                    json!({ "msg": "Successfully created!", "storyId": id }).to_string(),
                )
            }
            Method::Put if path.starts_with("/api/Story/Edit/") => {
                let id = &path["/api/Story/Edit/".len()..];
                let body = request.body.clone().unwrap_or(Value::Null);
                match inner.stories.get_mut(id) {
                    Some(story) => {
                        story.title = body["title"].as_str().unwrap_or_default().to_string();
                        story.description =
                            body["description"].as_str().unwrap_or_default().to_string();
                        story.url = body["url"].as_str().unwrap_or_default().to_string();
                        ResponseRecord::new(200, json!({ "msg": "Successfully edited" }).to_string())
                    }
                    None => error(404, json!({ "msg": "No spoilers..." })),
                }
            }
            Method::Get if path == "/api/Story/All" => {
                let list: Vec<Value> = inner
                    .stories
                    .iter()
                    .map(|(id, s)| {
                        json!({ "id": id, "title": s.title, "description": s.description, "url": s.url })
                    })
                    .collect();
                ResponseRecord::new(200, Value::Array(list).to_string())
            }
            Method::Delete if path.starts_with("/api/Story/Delete/") => {
                let id = &path["/api/Story/Delete/".len()..];
                match inner.stories.remove(id) {
                    Some(_) => {
                        ResponseRecord::new(200, json!({ "msg": "Deleted successfully!" }).to_string())
                    }
                    None => error(400, json!({ "msg": "Unable to delete this story spoiler!" })),
                }
            }
            _ => ResponseRecord::new(404, ""),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeStoryService {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseRecord> {
        self.inner.lock().unwrap().requests.push(request.clone());

        let unreachable = self.faults.lock().unwrap().unreachable_prefix.clone();
        if let Some(prefix) = unreachable {
            if request.path.starts_with(&prefix) {
                return Err(Error::Internal("connection reset by peer".to_string()));
            }
        }

        Ok(self.respond(&request))
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
