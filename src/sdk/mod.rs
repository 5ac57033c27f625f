//! Plumbing shared by the per-service API clients.

pub mod http;
pub mod paginate;
pub mod wait;

pub use http::{ApiClient, ApiRequest, ClientConfig};
pub use paginate::{collect_pages, Page};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Unauthorized(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SdkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Status { status, .. } => Some(*status),
            SdkError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Gateway errors and timeouts that are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            SdkError::Status { status, .. } => matches!(status, 502 | 503 | 504),
            SdkError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
