//! Authentication endpoints under `/users`.

use reqwest::Method;
use serde_json::{json, Value};

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{LoginRequest, LoginResponse, SignupRequest};

#[derive(Clone)]
pub struct AuthGateway {
    http: HttpClient,
}

/// Explicit `isAdmin` flag, at the top level or inside `data`
fn admin_flag(body: &Value) -> Option<bool> {
    body.get("isAdmin")
        .or_else(|| body.get("data").and_then(|d| d.get("isAdmin")))
        .and_then(Value::as_bool)
}

impl AuthGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `POST /users/login`, returning the issued token
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let response: LoginResponse = self.http.post("/users/login", request).await?;
        Ok(response.token)
    }

    /// `POST /users/signup`
    pub async fn signup(&self, request: &SignupRequest) -> Result<Value> {
        self.http.post("/users/signup", request).await
    }

    /// `GET /users/logout`
    pub async fn logout(&self) -> Result<()> {
        self.http.execute(Method::GET, "/users/logout", None).await
    }

    /// `POST /users/check-admin`.
    ///
    /// A 2xx answer means admin unless the body carries an explicit
    /// `isAdmin: false`; 401/403 mean "not admin". Every other failure is
    /// returned so the caller can decide how to fail.
    pub async fn check_admin(&self) -> Result<bool> {
        let response = match self
            .http
            .send(Method::POST, "/users/check-admin", Some(json!({})))
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_auth_rejection() => return Ok(false),
            Err(e) => return Err(e),
        };

        let body: Value = if response.body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&response.body)?
        };
        Ok(admin_flag(&body).unwrap_or(true))
    }
}
