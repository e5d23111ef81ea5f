//! Shared response envelope types for API handlers.
//!
//! Outcome-only endpoints answer `{"status": bool, "message": "<code>"}`;
//! clients branch on the message code.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Standard `{ "status": ..., "message": ... }` envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMessage {
    pub status: bool,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
        }
    }
}

/// A successful outcome with an explicit status code.
pub fn success(status: StatusCode, message: &str) -> (StatusCode, Json<StatusMessage>) {
    (status, Json(StatusMessage::success(message)))
}
