//! Scripted in-memory transport shared by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::error::{ClientError, Result};
use crate::http::{ApiRequest, ApiResponse, CookieJar, HttpClient, Transport, DEFAULT_AUTH_COOKIE};

pub const BASE_URL: &str = "http://backend.test";

#[derive(Clone)]
enum Scripted {
    Reply {
        status: u16,
        body: Value,
        set_cookie: Option<String>,
    },
    Fail(String),
    Gated {
        gate: Arc<Notify>,
        status: u16,
        body: Value,
    },
}

/// Responses are scripted per `"METHOD /path"`. Each call consumes the next
/// scripted response; the last one repeats.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: &str, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back(scripted);
    }

    pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            Scripted::Reply {
                status,
                body,
                set_cookie: None,
            },
        );
    }

    pub fn reply_with_cookie(&self, method: &str, path: &str, status: u16, body: Value, cookie: &str) {
        self.push(
            method,
            path,
            Scripted::Reply {
                status,
                body,
                set_cookie: Some(cookie.to_string()),
            },
        );
    }

    /// Script a transport failure
    pub fn fail(&self, method: &str, path: &str, detail: &str) {
        self.push(method, path, Scripted::Fail(detail.to_string()));
    }

    /// Script a reply that is held back until the returned gate is notified
    pub fn gated_reply(&self, method: &str, path: &str, status: u16, body: Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(
            method,
            path,
            Scripted::Gated {
                gate: gate.clone(),
                status,
                body,
            },
        );
        gate
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests sent to `"METHOD /path"`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method.as_str() == method && request_path(r) == path)
            .count()
    }

    fn next(&self, key: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn request_path(request: &ApiRequest) -> &str {
    let prefix = format!("{}/api", BASE_URL);
    request
        .url
        .strip_prefix(prefix.as_str())
        .unwrap_or(request.url.as_str())
}

fn response(status: u16, body: &Value, set_cookie: Option<String>) -> ApiResponse {
    let body = if body.is_null() {
        Bytes::new()
    } else {
        Bytes::from(body.to_string())
    };
    ApiResponse {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        set_cookies: set_cookie.into_iter().collect(),
        body,
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = format!("{} {}", request.method, request_path(&request));
        self.requests.lock().push(request);

        match self.next(&key) {
            Some(Scripted::Reply {
                status,
                body,
                set_cookie,
            }) => Ok(response(status, &body, set_cookie)),
            Some(Scripted::Fail(detail)) => Err(ClientError::Transport(detail)),
            Some(Scripted::Gated { gate, status, body }) => {
                gate.notified().await;
                Ok(response(status, &body, None))
            }
            None => Ok(response(
                404,
                &json!({"status": "fail", "message": format!("no script for {}", key)}),
                None,
            )),
        }
    }
}

pub fn client(transport: &Arc<MockTransport>, cookies: Arc<CookieJar>) -> HttpClient {
    HttpClient::new(BASE_URL, transport.clone(), cookies)
}

/// An in-memory jar holding a live auth token
pub fn logged_in_jar() -> Arc<CookieJar> {
    let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
    jar.set_auth_token("test-token").unwrap();
    Arc::new(jar)
}

pub fn activity_json(id: &str, goal: f64, total: f64) -> Value {
    json!({
        "_id": id,
        "creator": {"_id": "u1", "firstName": "Ada", "lastName": "Lovelace"},
        "name": "Clean water",
        "description": "Wells for the valley",
        "goalAmount": goal,
        "totalDonations": total,
        "status": "open",
        "end_at": "2030-01-01T00:00:00.000Z"
    })
}

pub fn user_json(id: &str, first: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "firstName": first,
        "lastName": "Tester",
        "email": format!("{}@example.org", first.to_lowercase()),
        "role": role
    })
}

pub fn donation_json(id: &str, activity: &str, amount: f64) -> Value {
    json!({
        "_id": id,
        "user": {"_id": "u1", "firstName": "Ada", "lastName": "Lovelace"},
        "activity": {"_id": activity, "name": "Clean water"},
        "amount": amount
    })
}
