//! Session error types
//!
//! Every failure here is recoverable: the controller stays in its current
//! state, skips the effect of the failed action and hands the error back.

use std::time::Duration;
use thiserror::Error;

/// Failure to produce an initial position fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Failure of the one-shot proximity query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl QueryError {
    /// Timeouts, connection problems and server-side errors are worth another
    /// attempt; client errors and undecodable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            QueryError::Timeout(_) | QueryError::Transport(_) => true,
            QueryError::Status { status, .. } => *status >= 500 || *status == 429,
            QueryError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            QueryError::Decode(err.to_string())
        } else {
            QueryError::Transport(err.to_string())
        }
    }
}

/// Failure to open a live subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("failed to open subscription: {0}")]
    Connect(String),

    #[error("invalid stream payload: {0}")]
    Decode(String),
}

/// Umbrella error returned by [`crate::SessionController`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `search` was invoked before a region was known.
    #[error("no region known yet; acquire a position first")]
    RegionUnknown,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("query failed: {0}")]
    QueryFailed(#[from] QueryError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("session setup failed: {0}")]
    Setup(String),
}
