//! API-specific error types
//!
//! Provides error classification for API operations and best-effort
//! extraction of the message Canvas puts in error bodies.

use std::time::Duration;

use canvas_core::{CodecError, RequestError};
use canvas_domain::CanvasError;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401 that could not be recovered, or the session is gone
    Authentication,
    /// Throttled (403 "Rate Limit Exceeded" or 429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Network/connection errors
    Network,
    /// Response body did not match the expected shape
    Decode,
    /// Broken request definitions or configuration
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401 and the session could not be refreshed
    #[error("Unauthorized")]
    Unauthorized,

    /// The refresh token was rejected and the user did not log in again
    #[error("Session expired, log in again")]
    InvalidGrant,

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Decode(#[from] CodecError),

    /// Multipart attachment could not be read or described
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Unauthorized | Self::InvalidGrant => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Request(_) | Self::Upload(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// HTTP status behind this error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map a non-success response that is neither 401 nor a rate limit.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));
        if status >= 500 {
            Self::Server { status, message }
        } else {
            Self::Client { status, message }
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        match err {
            CanvasError::Config(msg) => Self::Config(msg),
            CanvasError::Auth(_) => Self::Unauthorized,
            other => Self::Config(other.to_string()),
        }
    }
}

/// Pull a user-facing message out of a Canvas error body.
///
/// Canvas is inconsistent here; the shapes seen in practice are
/// `{"errors":[{"message":..}]}`, `{"message":..}`,
/// `{"error_description":..}`, `{"error":..}` and field-keyed
/// `{"errors":{"name":[{"message":..}]}}`.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    let from_list = |list: &[Value]| -> Option<String> {
        let messages: Vec<&str> = list
            .iter()
            .filter_map(|item| item.get("message").and_then(Value::as_str).or(item.as_str()))
            .collect();
        (!messages.is_empty()).then(|| messages.join("\n"))
    };

    match value.get("errors") {
        Some(Value::Array(list)) => {
            if let Some(message) = from_list(list.as_slice()) {
                return Some(message);
            }
        }
        Some(Value::Object(fields)) => {
            let messages: Vec<String> = fields
                .values()
                .filter_map(|v| v.as_array().and_then(|l| from_list(l.as_slice())))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("\n"));
            }
        }
        _ => {}
    }

    ["message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(ApiError::Unauthorized.category(), ApiErrorCategory::Authentication);
        assert_eq!(ApiError::InvalidGrant.category(), ApiErrorCategory::Authentication);
        assert_eq!(ApiError::RateLimit("x".into()).category(), ApiErrorCategory::RateLimit);
        assert_eq!(ApiError::from_status(502, b"").category(), ApiErrorCategory::Server);
        assert_eq!(ApiError::from_status(404, b"").category(), ApiErrorCategory::Client);
        assert_eq!(ApiError::Network("x".into()).category(), ApiErrorCategory::Network);
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(1)).category(),
            ApiErrorCategory::Network
        );
        assert_eq!(
            ApiError::from(CodecError::Decode("x".into())).category(),
            ApiErrorCategory::Decode
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        assert_eq!(ApiError::from_status(422, b"{}").status(), Some(422));
        assert_eq!(ApiError::InvalidGrant.status(), None);
    }

    #[test]
    fn test_message_from_error_list() {
        let body = br#"{"errors":[{"message":"first"},{"message":"second"}]}"#;
        assert_eq!(error_message(body).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_message_from_plain_fields() {
        assert_eq!(error_message(br#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(
            error_message(br#"{"error":"invalid_grant","error_description":"expired"}"#)
                .as_deref(),
            Some("expired")
        );
        assert_eq!(error_message(br#"{"error":"invalid_grant"}"#).as_deref(), Some("invalid_grant"));
    }

    #[test]
    fn test_message_from_field_errors() {
        let body = br#"{"errors":{"name":[{"attribute":"name","message":"is too long"}]}}"#;
        assert_eq!(error_message(body).as_deref(), Some("is too long"));
    }

    #[test]
    fn test_status_error_falls_back_to_code() {
        match ApiError::from_status(500, b"<html>oops</html>") {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
