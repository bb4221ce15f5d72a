//! Unified client error handling.
//!
//! Every fallible operation in the crate returns [`ClientError`]. Gateways
//! propagate failures untouched; views translate them into user-facing text
//! at their boundary with [`ClientError::user_message_or`].

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message shown for failures that never reached the server.
pub const TRANSPORT_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Error codes derived from the status of a rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Client errors (4xx)
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    TooManyRequests,

    // Server errors (5xx)
    InternalError,
    ServiceUnavailable,
    ExternalServiceError,

    /// Anything the table above does not name
    Unexpected,
}

impl ErrorCode {
    /// Classify an HTTP status returned by the backend
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ErrorCode::BadRequest,
            StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
            StatusCode::FORBIDDEN => ErrorCode::Forbidden,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::CONFLICT => ErrorCode::Conflict,
            StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::UnprocessableEntity,
            StatusCode::TOO_MANY_REQUESTS => ErrorCode::TooManyRequests,
            StatusCode::INTERNAL_SERVER_ERROR => ErrorCode::InternalError,
            StatusCode::SERVICE_UNAVAILABLE => ErrorCode::ServiceUnavailable,
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                ErrorCode::ExternalServiceError
            }
            _ => ErrorCode::Unexpected,
        }
    }

    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::UnprocessableEntity => "unprocessable_entity",
            ErrorCode::TooManyRequests => "too_many_requests",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::ExternalServiceError => "external_service_error",
            ErrorCode::Unexpected => "unexpected",
        }
    }
}

/// Error payload sent by the backend alongside a non-2xx status.
///
/// The backend answers with `{ "status": "fail", "message": "..." }`; some
/// middleware uses `error` instead of `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a raw response body, tolerating non-JSON payloads
    pub fn parse(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    /// The human-readable message, if the server sent a non-empty one
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally; no request was sent
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response (unreachable host, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("server rejected request ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Build a server error from a rejected response
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        ClientError::Server {
            status,
            message: ErrorBody::parse(body).into_message(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.status().map(ErrorCode::from_status)
    }

    /// True for 401/403 rejections
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Unauthorized) | Some(ErrorCode::Forbidden)
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Message the server attached to its rejection
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Map the error to text a user can act on.
    ///
    /// Validation messages and server messages are shown verbatim, transport
    /// failures get the generic retry hint, everything else the caller's
    /// fallback.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ClientError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
