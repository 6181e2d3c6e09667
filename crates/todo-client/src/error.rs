//! Error types for the todo API client.
//!
//! `NotFound` gets a dedicated variant because callers frequently
//! distinguish "the resource does not exist" from "the server returned an
//! unexpected status". All other non-2xx responses land in `Http` with the
//! raw status code and body.

use std::io;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the todo API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("session expired")]
    SessionExpired,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Check if this error means the server rejected our credentials.
    #[inline]
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Http { status: 401, .. }
                | ApiError::NotLoggedIn
                | ApiError::SessionExpired
        )
    }
}
