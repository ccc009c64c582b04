use std::time::Duration;

use thiserror::Error;

use crate::endpoint::Endpoint;

/// Top-level error type for the `camlink-api` crate.
///
/// Covers every way a single request against the camera can fail.
/// `camlink-core` folds these into its own taxonomy before they reach
/// callers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured address/port do not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Bounds ──────────────────────────────────────────────────────
    /// The request did not complete within its time bound.
    #[error("{endpoint} timed out after {timeout:?}")]
    Timeout {
        endpoint: Endpoint,
        timeout: Duration,
    },

    /// The request's cancellation token fired before it completed.
    #[error("{endpoint} was cancelled")]
    Cancelled { endpoint: Endpoint },

    // ── Device ──────────────────────────────────────────────────────
    /// The device answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },
}

impl Error {
    /// Returns `true` if retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status code, if the device answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
