//! Failure taxonomy for calls against the books API.

use shared::error::ApiError;
use thiserror::Error;

const MAX_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network unreachable, DNS, connection reset and similar.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let body = match ApiError::from_body(body) {
            Some(api_error) => api_error.error,
            None => body.chars().take(MAX_BODY_CHARS).collect(),
        };
        Self::Status { status, body }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
