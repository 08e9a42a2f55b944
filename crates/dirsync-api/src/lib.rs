//! DirSync API - HTTP adapters for the sync server and the message broker
//!
//! Provides async clients for:
//! - Snapshot submission and action plan retrieval
//! - Per-file upload (multipart) and download
//! - Queue declaration and purge via the RabbitMQ management API
//!
//! ## Modules
//!
//! - [`client`] - Sync server HTTP client (`ISyncServer`, `IFileTransfer`)
//! - [`queue`] - RabbitMQ management API client (`IMessageQueue`)

pub mod client;
pub mod queue;

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Errors that can occur when talking to the sync server or the broker
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with existing state (e.g. queue declared with
    /// different properties)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A configured address is not a usable URL
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl ApiError {
    /// Classifies a non-success status
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT | StatusCode::BAD_REQUEST => Self::Conflict(message),
            s if s.is_server_error() => Self::ServerError(message),
            s => Self::UnexpectedStatus {
                status: s.as_u16(),
                message,
            },
        }
    }
}

/// Passes a successful response through, turns anything else into an
/// [`ApiError`] carrying the response body
pub(crate) async fn ensure_success(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("{what} returned {status}")
    } else {
        format!("{what} returned {status}: {}", body.trim())
    };
    Err(ApiError::from_status(status, message))
}
