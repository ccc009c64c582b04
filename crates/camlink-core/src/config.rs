// ── Runtime device configuration ──
//
// These types describe *where* the camera is and how long each request may
// take. They never touch disk: the CLI (via camlink-config) builds a
// `DeviceConfigPatch` and hands it to the client.

use std::time::Duration;

use camlink_api::Endpoint;
use secrecy::SecretString;

/// Access-point address the camera firmware uses out of the box.
pub const DEFAULT_ADDRESS: &str = "192.168.4.1";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_STREAM_PATH: &str = "/stream";

/// Per-candidate bound for discovery probes.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the camera lives and how to reach its stream.
///
/// Immutable snapshot: the client replaces it wholesale rather than
/// mutating it, so every URL derived from one snapshot is consistent.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Host name or IPv4 address (IPv6 literals must be bracketed).
    pub address: String,
    /// TCP port, 1-65535.
    pub port: u16,
    /// Accepted but never sent: the device protocol has no auth scheme.
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Path of the continuous video feed, starting with `/`.
    pub stream_path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            stream_path: DEFAULT_STREAM_PATH.into(),
        }
    }
}

impl DeviceConfig {
    /// `http://{address}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }

    /// `http://{address}:{port}{stream_path}`
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url(), self.stream_path)
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// Reject configurations that cannot produce a usable URL.
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        let invalid = |message: String| crate::error::CoreError::InvalidConfig { message };

        if self.address.trim().is_empty() {
            return Err(invalid("address must not be empty".into()));
        }
        if self.port == 0 {
            return Err(invalid("port must be between 1 and 65535".into()));
        }
        if !self.stream_path.starts_with('/') {
            return Err(invalid(format!(
                "stream path must start with '/', got '{}'",
                self.stream_path
            )));
        }
        camlink_api::client::base_url(&self.address, self.port)?;
        Ok(())
    }
}

/// A partial [`DeviceConfig`]: only the fields that are set override a base.
#[derive(Debug, Clone, Default)]
pub struct DeviceConfigPatch {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub stream_path: Option<String>,
}

impl DeviceConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = Some(path.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.port.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.stream_path.is_none()
    }

    /// Merge the set fields over `base`.
    pub fn apply_to(&self, base: &DeviceConfig) -> DeviceConfig {
        DeviceConfig {
            address: self.address.clone().unwrap_or_else(|| base.address.clone()),
            port: self.port.unwrap_or(base.port),
            username: self.username.clone().or_else(|| base.username.clone()),
            password: self.password.clone().or_else(|| base.password.clone()),
            stream_path: self
                .stream_path
                .clone()
                .unwrap_or_else(|| base.stream_path.clone()),
        }
    }
}

/// Time bounds for each class of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Reachability probe (`connect`, `check_connection`).
    pub probe: Duration,
    /// Start/stop stream commands.
    pub command: Duration,
    /// Still capture, including the image download.
    pub capture: Duration,
    /// Each discovery probe.
    pub discovery: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Endpoint::Status.default_timeout(),
            command: Endpoint::StartStream.default_timeout(),
            capture: Endpoint::Capture.default_timeout(),
            discovery: DISCOVERY_TIMEOUT,
        }
    }
}

/// Construction options for [`CameraLinkClient`](crate::CameraLinkClient).
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub timeouts: Timeouts,
    /// TCP connect bound applied beneath the per-request bounds.
    pub connect_timeout: Option<Duration>,
}
