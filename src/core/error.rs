//! Typed error handling for the pagination engine
//!
//! All request-shaped failures are client-input errors and map to
//! 400/422-class responses; repository failures propagate unchanged and map
//! to 500. Nothing here is retried.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Errors raised while validating or executing a pagination request
#[derive(Debug)]
pub enum PageError {
    /// Requested page size is outside the configured bounds
    InvalidPageSize { size: i64, max: i64 },

    /// Both `page[after]` and `page[before]` were supplied
    ConflictingCursors,

    /// Cursor token is not valid base64url over a JSON payload
    MalformedCursor,

    /// Cursor was issued under a different sort spec than the request's
    CursorSortMismatch { expected: String, found: String },

    /// A declared sort field has no value on the boundary record
    CursorFieldMissing { field: String },

    /// Filter operator is not one the predicate builder understands
    UnknownFilterOperator { path: String, operator: String },

    /// Propagated failure from the repository collaborator
    Repository(anyhow::Error),

    /// Internal engine errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::InvalidPageSize { max, .. } => {
                write!(f, "Page size must be between 1 and {}", max)
            }
            PageError::ConflictingCursors => {
                write!(f, "Cannot use both after and before cursors")
            }
            PageError::MalformedCursor => write!(f, "Invalid cursor format"),
            PageError::CursorSortMismatch { .. } => {
                write!(f, "Cursor was issued for a different sort order")
            }
            PageError::CursorFieldMissing { field } => {
                write!(f, "Cursor field \"{}\" not found in record", field)
            }
            PageError::UnknownFilterOperator { path, operator } => {
                write!(f, "Unknown filter operator \"{}\" for \"{}\"", operator, path)
            }
            PageError::Repository(e) => write!(f, "Repository error: {}", e),
            PageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::Repository(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PageError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PageError::InvalidPageSize { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::ConflictingCursors => StatusCode::BAD_REQUEST,
            PageError::MalformedCursor => StatusCode::BAD_REQUEST,
            PageError::CursorSortMismatch { .. } => StatusCode::BAD_REQUEST,
            PageError::CursorFieldMissing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::UnknownFilterOperator { .. } => StatusCode::BAD_REQUEST,
            PageError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PageError::InvalidPageSize { .. } => "INVALID_PAGE_SIZE",
            PageError::ConflictingCursors => "CONFLICTING_CURSORS",
            PageError::MalformedCursor => "MALFORMED_CURSOR",
            PageError::CursorSortMismatch { .. } => "CURSOR_SORT_MISMATCH",
            PageError::CursorFieldMissing { .. } => "CURSOR_FIELD_MISSING",
            PageError::UnknownFilterOperator { .. } => "UNKNOWN_FILTER_OPERATOR",
            PageError::Repository(_) => "REPOSITORY_ERROR",
            PageError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PageError::InvalidPageSize { size, max } => Some(serde_json::json!({
                "size": size,
                "max": max
            })),
            PageError::CursorSortMismatch { expected, found } => Some(serde_json::json!({
                "expected": expected,
                "found": found
            })),
            PageError::CursorFieldMissing { field } => Some(serde_json::json!({
                "field": field
            })),
            PageError::UnknownFilterOperator { path, operator } => Some(serde_json::json!({
                "path": path,
                "operator": operator
            })),
            _ => None,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
