//! Error types for the resource client.
//!
//! # Design
//! `NotFound` gets its own variant because the list view treats a vanished id
//! differently in logs, even though it is displayed like any other failure.
//! Every other unexpected status lands in `Http`. The `Display` text of each
//! variant is what the UI shows the user.

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// The backend returned 404 for the referenced id.
    #[error("not found: {detail}")]
    NotFound { detail: String },

    /// The backend returned a status the operation does not expect.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Build the error for an unexpected status, pulling `detail` out of a
    /// `{"detail": ...}` body when the backend sent one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = error_detail(body);
        if status == 404 {
            ApiError::NotFound { detail }
        } else {
            ApiError::Http { status, detail }
        }
    }
}

/// A required create-form field was left empty. No request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: &'static str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.to_string(),
    }
}
