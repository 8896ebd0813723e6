//! HTTP wire types shared by attuned and attunectl.

use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};

/// Body of `POST /get_response`.
///
/// `message` is optional on the wire so a missing field is reported as a
/// client error by the handler rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespondRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl RespondRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message, if present and not blank.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }
}

/// Successful reply from `POST /get_response`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondResponse {
    pub response: String,
    pub emotion: EmotionLabel,
}

/// Body of `POST /rewrite`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The passage, if present and not blank.
    pub fn passage(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Successful reply from `POST /rewrite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub rewritten_text: String,
}

/// Error body for rejected or failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reply from `GET /v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub classifier_model: String,
    pub generator_model: String,
}
