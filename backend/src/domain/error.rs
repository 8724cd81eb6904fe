//! Domain-level error payload.
//!
//! Transport agnostic: the inbound HTTP adapter maps [`Error`] to status
//! codes and a JSON envelope. The serialized shape is
//! `{code, error, message?, details?}` where `error` is the short label
//! surfaced to clients ("User already exists", "Validation failed", ...) and
//! `code` the stable category driving the HTTP status.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The request conflicts with existing state (duplicate name or email).
    Conflict,
    /// The requested resource does not exist.
    NotFound,
    /// An unexpected error occurred inside the service.
    InternalError,
}

/// Error payload returned by handlers and surfaced to clients.
///
/// Internal errors capture the ambient [`TraceId`] at construction so the
/// response can be correlated with server logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "conflict")]
    code: ErrorCode,
    /// Short client-facing label.
    #[schema(example = "User already exists")]
    error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "trace_id")]
    trace_id: Option<String>,
}

impl Error {
    fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
            message: None,
            details: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Attach a human readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach structured details (per-field validation failures).
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Validation failure carrying a details array.
    pub fn validation(details: Value) -> Self {
        Self::new(ErrorCode::InvalidRequest, "Validation failed").with_details(details)
    }

    /// Malformed request outside of field validation.
    pub fn invalid_request(error: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, error)
    }

    /// Conflict with existing state.
    pub fn conflict(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, error).with_message(message)
    }

    /// Missing resource.
    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, error).with_message(message)
    }

    /// Unexpected server-side failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, "Internal server error").with_message(message)
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Short client-facing label.
    pub fn label(&self) -> &str {
        self.error.as_str()
    }

    /// Human readable message, when present.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Supplementary structured details, when present.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Trace identifier captured at construction, when one was in scope.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.error),
            None => f.write_str(&self.error),
        }
    }
}

impl std::error::Error for Error {}
