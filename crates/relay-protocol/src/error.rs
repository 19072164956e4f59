//! Error envelopes returned over the wire

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request validation failure, reported to the caller as HTTP 422.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the request must contain at least one message")]
    EmptyMessages,

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid message at index {index}: {reason}")]
    InvalidMessage { index: usize, reason: String },

    #[error("{0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Error payload together with the HTTP status it should be sent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(status: u16, kind: &str, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorBody {
                message: message.into(),
                kind: kind.to_string(),
                code: code.map(str::to_string),
            },
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(400, "invalid_request_error", None, message)
    }

    pub fn context_length_exceeded(message: impl Into<String>) -> Self {
        Self::new(
            400,
            "invalid_request_error",
            Some("context_length_exceeded"),
            message,
        )
    }

    pub fn truncate_prompt(message: impl Into<String>) -> Self {
        Self::new(
            422,
            "invalid_request_error",
            Some("truncate_prompt_error"),
            message,
        )
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(422, "invalid_request_error", None, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "invalid_request_error", Some("model_not_found"), message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(502, "upstream_error", None, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "internal_server_error", None, message)
    }
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        ErrorResponse::unprocessable(err.to_string())
    }
}
