//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use camlink_config::ConfigError;
use camlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to camera at {address}")]
    #[diagnostic(
        code(camlink::connection_failed),
        help(
            "Check that the camera is powered and on the same network.\n\
             Reason: {reason}\n\
             Try: camlink scan"
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("Camera is not connected")]
    #[diagnostic(code(camlink::not_connected))]
    NotConnected,

    #[error("{operation} timed out after {}", human(.timeout))]
    #[diagnostic(
        code(camlink::timeout),
        help("The camera did not answer in time. It may be busy serving another client.")
    )]
    Timeout { operation: String, timeout: Duration },

    #[error("{operation} was cancelled")]
    #[diagnostic(code(camlink::cancelled))]
    Cancelled { operation: String },

    // ── Device answers ───────────────────────────────────────────────
    #[error("Camera rejected {operation} (HTTP {status})")]
    #[diagnostic(code(camlink::rejected))]
    Rejected { operation: String, status: u16 },

    #[error("Camera returned an empty image")]
    #[diagnostic(
        code(camlink::empty_capture),
        help("Retry the capture; the sensor may still be initializing.")
    )]
    EmptyCapture,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(camlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Device '{name}' not found in configuration")]
    #[diagnostic(
        code(camlink::device_not_found),
        help(
            "Available devices: {available}\n\
             Add one with: camlink config add <name> --address <ip>"
        )
    )]
    DeviceNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(camlink::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(camlink::config_write))]
    ConfigWrite(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(camlink::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(camlink::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(camlink::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(camlink::internal))]
    Internal(String),
}

fn human(timeout: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*timeout)
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NotConnected => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotConnected => CliError::NotConnected,
            CoreError::InvalidConfig { message } => CliError::Validation {
                field: "device".into(),
                reason: message,
            },
            CoreError::Unreachable { address, reason } => {
                CliError::ConnectionFailed { address, reason }
            }
            CoreError::Timeout { operation, timeout } => CliError::Timeout { operation, timeout },
            CoreError::Cancelled { operation } => CliError::Cancelled { operation },
            CoreError::Rejected { operation, status } => CliError::Rejected { operation, status },
            CoreError::EmptyCapture => CliError::EmptyCapture,
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::DeviceNotFound { name, available } => CliError::DeviceNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::ConfigWrite(err.to_string()),
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let unreachable: CliError = CoreError::Unreachable {
            address: "http://10.0.0.5:80".into(),
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let timeout: CliError = CoreError::Timeout {
            operation: "GET /status".into(),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(timeout.to_string(), "GET /status timed out after 5s");

        let invalid: CliError = CoreError::InvalidConfig {
            message: "port must be between 1 and 65535".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        let rejected: CliError = CoreError::Rejected {
            operation: "GET /capture".into(),
            status: 500,
        }
        .into();
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn missing_device_lists_alternatives() {
        let err: CliError = ConfigError::DeviceNotFound {
            name: "attic".into(),
            available: vec![],
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(err, CliError::DeviceNotFound { ref available, .. } if available == "(none)"));
    }
}
