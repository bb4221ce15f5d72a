//! HTTP client adapter.
//!
//! Every outbound request goes through [`HttpClient`], which prefixes the
//! API base address, sets the JSON content type, tags the request with an
//! id for log correlation and echoes the auth cookie as a bearer token.
//! The wire itself sits behind the [`Transport`] trait so gateways can be
//! exercised without a network.

pub mod cookies;
mod transport;

pub use cookies::{AuthCookie, CookieJar, DEFAULT_AUTH_COOKIE, LOGGED_OUT};
pub use transport::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ClientError, Result};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A fully decorated request, ready for the wire
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request/response exchange. Only failures to obtain a
    /// response are errors here; status handling belongs to the caller.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Shared, cheaply cloneable handle to the backend API
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    cookies: Arc<CookieJar>,
}

impl HttpClient {
    /// `base_url` is the backend origin; the `/api` prefix is appended here
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, cookies: Arc<CookieJar>) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        let base_url = if base.ends_with("/api") {
            base.to_string()
        } else {
            format!("{}/api", base)
        };
        Self {
            base_url,
            transport,
            cookies,
        }
    }

    /// Build a client backed by reqwest from the loaded configuration
    pub fn from_config(config: &Config, cookies: Arc<CookieJar>) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.api.timeout_secs))?;
        Ok(Self::new(&config.api.base_url, Arc::new(transport), cookies))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cookies(&self) -> &Arc<CookieJar> {
        &self.cookies
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        decode(&response)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.send(Method::POST, path, Some(encode(body)?)).await?;
        decode(&response)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.send(Method::PUT, path, Some(encode(body)?)).await?;
        decode(&response)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.send(Method::PATCH, path, Some(encode(body)?)).await?;
        decode(&response)
    }

    /// Send a request whose success body carries nothing the caller needs
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        self.send(method, path, body).await.map(|_| ())
    }

    /// Decorate, send and status-check one request
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let request = self.build_request(method, path, body);
        let request_id = request.header(REQUEST_ID_HEADER).unwrap_or_default().to_string();
        let method = request.method.clone();

        debug!(%method, path, request_id = %request_id, "Sending API request");

        let response = self.transport.execute(request).await.map_err(|e| {
            debug!(%method, path, request_id = %request_id, error = %e, "API request failed");
            e
        })?;

        for header in &response.set_cookies {
            if let Err(e) = self.cookies.store_set_cookie(header) {
                warn!(error = %e, "Failed to store cookie from response");
            }
        }

        debug!(
            %method,
            path,
            request_id = %request_id,
            status = response.status.as_u16(),
            "API response received"
        );

        if !response.status.is_success() {
            return Err(ClientError::from_response(response.status, &response.body));
        }

        Ok(response)
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            (
                REQUEST_ID_HEADER.to_string(),
                uuid::Uuid::new_v4().to_string(),
            ),
        ];

        if let Some(token) = self.cookies.auth_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        ApiRequest {
            method,
            url: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            headers,
            body,
        }
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))
}

/// Decode a success body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &response.body
    };
    Ok(serde_json::from_slice(body)?)
}
