// ── Session state ──
//
// The single mutable record behind a `CameraLinkClient`: current config,
// status, and cached stream URL. Every transition goes through a method
// here so the invariants hold after each one:
//
//   streaming  => connected
//   stream_url.is_some() <=> connected

use chrono::{DateTime, Utc};

use crate::config::{DeviceConfig, DeviceConfigPatch};
use crate::error::CoreError;
use crate::status::ConnectionStatus;

/// Snapshot of one client's session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: Option<DeviceConfig>,
    status: ConnectionStatus,
    stream_url: Option<String>,
}

impl Session {
    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.status.connected
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Adopt a new config and drop back to disconnected until its probe
    /// succeeds.
    pub(crate) fn begin_connect(&mut self, config: DeviceConfig) {
        self.mark_lost();
        self.config = Some(config);
    }

    /// The probe for the current config succeeded.
    pub(crate) fn mark_connected(&mut self, signal: Option<u8>, at: DateTime<Utc>) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        self.status.connected = true;
        self.status.address.clone_from(&config.address);
        self.status.last_connected_at = Some(at);
        self.status.signal_strength = signal.unwrap_or(0);
        self.stream_url = Some(config.stream_url());
    }

    /// No-op unless connected.
    pub(crate) fn set_streaming(&mut self, streaming: bool) {
        if self.status.connected {
            self.status.streaming = streaming;
        }
    }

    pub(crate) fn refresh_signal(&mut self, signal: Option<u8>) {
        if let Some(signal) = signal {
            self.status.signal_strength = signal;
        }
    }

    /// A connectivity probe failed. The config is kept for a reconnect.
    pub(crate) fn mark_lost(&mut self) {
        self.status.connected = false;
        self.status.streaming = false;
        self.status.signal_strength = 0;
        self.stream_url = None;
    }

    /// Explicit disconnect: forget the device entirely.
    pub(crate) fn clear(&mut self) {
        self.mark_lost();
        self.config = None;
    }

    /// Merge `patch` into the current config.
    ///
    /// Returns `Ok(false)` when there is no config to merge into. The
    /// stream URL is recomputed only while connected.
    pub(crate) fn apply_patch(&mut self, patch: &DeviceConfigPatch) -> Result<bool, CoreError> {
        let Some(current) = self.config.as_ref() else {
            return Ok(false);
        };
        let merged = patch.apply_to(current);
        merged.validate()?;

        if self.status.connected {
            self.stream_url = Some(merged.stream_url());
        }
        self.config = Some(merged);
        Ok(true)
    }

    #[cfg(test)]
    fn invariants_hold(&self) -> bool {
        (!self.status.streaming || self.status.connected)
            && (self.stream_url.is_some() == self.status.connected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(address: &str, port: u16) -> DeviceConfig {
        DeviceConfigPatch::new()
            .address(address)
            .port(port)
            .apply_to(&DeviceConfig::default())
    }

    fn connected(address: &str, port: u16) -> Session {
        let mut session = Session::default();
        session.begin_connect(config(address, port));
        session.mark_connected(None, Utc::now());
        session
    }

    #[test]
    fn connect_caches_stream_url() {
        let session = connected("10.0.0.5", 8080);

        assert!(session.is_connected());
        assert_eq!(session.stream_url(), Some("http://10.0.0.5:8080/stream"));
        assert_eq!(session.status().address, "10.0.0.5");
        assert!(session.status().last_connected_at.is_some());
        assert!(session.invariants_hold());
    }

    #[test]
    fn begin_connect_resets_previous_session() {
        let mut session = connected("10.0.0.5", 8080);
        session.set_streaming(true);

        session.begin_connect(config("10.0.0.6", 80));

        assert!(!session.status().connected);
        assert!(!session.status().streaming);
        assert_eq!(session.stream_url(), None);
        assert_eq!(session.config().unwrap().address, "10.0.0.6");
        assert!(session.invariants_hold());
    }

    #[test]
    fn streaming_requires_connection() {
        let mut session = Session::default();
        session.set_streaming(true);
        assert!(!session.status().streaming);
        assert!(session.invariants_hold());
    }

    #[test]
    fn clear_forgets_config() {
        let mut session = connected("10.0.0.5", 80);
        session.set_streaming(true);

        session.clear();

        assert!(session.config().is_none());
        assert_eq!(session.stream_url(), None);
        assert!(!session.status().streaming);
        assert!(session.invariants_hold());
    }

    #[test]
    fn mark_lost_keeps_config() {
        let mut session = connected("10.0.0.5", 80);
        session.mark_lost();

        assert!(session.config().is_some());
        assert!(!session.is_connected());
        assert!(session.invariants_hold());
    }

    #[test]
    fn patch_recomputes_url_while_connected() {
        let mut session = connected("10.0.0.5", 80);

        let applied = session
            .apply_patch(&DeviceConfigPatch::new().stream_path("/mjpeg/1"))
            .unwrap();

        assert!(applied);
        assert_eq!(session.stream_url(), Some("http://10.0.0.5:80/mjpeg/1"));
    }

    #[test]
    fn patch_without_config_is_noop() {
        let mut session = Session::default();
        let applied = session
            .apply_patch(&DeviceConfigPatch::new().port(8080))
            .unwrap();

        assert!(!applied);
        assert!(session.config().is_none());
    }

    #[test]
    fn patch_while_disconnected_keeps_url_empty() {
        let mut session = connected("10.0.0.5", 80);
        session.mark_lost();

        session
            .apply_patch(&DeviceConfigPatch::new().port(8081))
            .unwrap();

        assert_eq!(session.config().unwrap().port, 8081);
        assert_eq!(session.stream_url(), None);
        assert!(session.invariants_hold());
    }

    #[test]
    fn invalid_patch_is_rejected() {
        let mut session = connected("10.0.0.5", 80);
        let result = session.apply_patch(&DeviceConfigPatch::new().port(0));

        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
        assert_eq!(session.config().unwrap().port, 80);
    }

    #[test]
    fn mark_connected_without_config_is_ignored() {
        let mut session = Session::default();
        session.mark_connected(Some(50), Utc::now());
        assert!(!session.is_connected());
        assert!(session.invariants_hold());
    }
}
