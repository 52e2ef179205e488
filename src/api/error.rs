//! Errors raised while talking to the backend.
//!
//! Every non-2xx response and every transport failure ends up here. The
//! server's JSON error body is read on a best-effort basis: only its
//! `msg` (or `message`) string is kept, and each call site supplies its own
//! fallback text through [`ApiError::message_or`].

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A protected endpoint was called without a session
    #[error("Not signed in")]
    NotSignedIn,

    /// The session token cannot be written into a header
    #[error("Invalid token format")]
    InvalidToken,

    /// An id cannot be used as a single URL path segment
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

/// Error body shape the backend uses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn parse(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .msg
            .or(parsed.message)
            .filter(|m| !m.trim().is_empty())
    }
}

impl ApiError {
    /// Server-provided message, if the response carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } => Some(m.as_str()),
            _ => None,
        }
    }

    /// Server-provided message, else `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
