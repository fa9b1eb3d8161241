use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the books API, e.g. `{"error": "book not found"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
#[error("{error}")]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Best-effort decode of a response body; `None` when the body is not an API error object.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
