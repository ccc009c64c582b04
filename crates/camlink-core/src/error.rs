// ── Core error types ──
//
// Domain errors from camlink-core. Callers never see reqwest errors or URL
// parse failures; the `From<camlink_api::Error>` impl folds transport
// errors into the session-level taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Preconditions ────────────────────────────────────────────────
    #[error("Camera is not connected")]
    NotConnected,

    #[error("Invalid device configuration: {message}")]
    InvalidConfig { message: String },

    // ── Reachability ─────────────────────────────────────────────────
    #[error("Cannot reach camera at {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    // ── Device answers ───────────────────────────────────────────────
    #[error("Camera rejected {operation} (HTTP {status})")]
    Rejected { operation: String, status: u16 },

    #[error("Camera returned an empty image")]
    EmptyCapture,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for failures detected locally, before any request.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotConnected | Self::InvalidConfig { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<camlink_api::Error> for CoreError {
    fn from(err: camlink_api::Error) -> Self {
        match err {
            camlink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        operation: "request".into(),
                        timeout: Duration::ZERO,
                    }
                } else {
                    CoreError::Unreachable {
                        address: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization()),
                        reason: e.to_string(),
                    }
                }
            }
            camlink_api::Error::InvalidUrl(e) => CoreError::InvalidConfig {
                message: format!("address does not form a valid URL: {e}"),
            },
            camlink_api::Error::ClientBuild(msg) => CoreError::Internal(msg),
            camlink_api::Error::Timeout { endpoint, timeout } => CoreError::Timeout {
                operation: endpoint.to_string(),
                timeout,
            },
            camlink_api::Error::Cancelled { endpoint } => CoreError::Cancelled {
                operation: endpoint.to_string(),
            },
            camlink_api::Error::Status { endpoint, status } => CoreError::Rejected {
                operation: endpoint.to_string(),
                status,
            },
        }
    }
}
