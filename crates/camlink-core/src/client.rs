// ── Camera link client ──
//
// Session management for one networked camera: connect/disconnect, stream
// control, still capture, and discovery. Public operations fail soft (bool /
// Option plus a log line); the `try_*` variants expose the cause.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use camlink_api::transport::TransportConfig;
use camlink_api::{DeviceClient, Endpoint};

use crate::capture::{CaptureMode, CapturedImage, EmbeddedImage};
use crate::config::{ClientOptions, DeviceConfig, DeviceConfigPatch, Timeouts};
use crate::discovery::{self, DEFAULT_DISCOVERY_PORT};
use crate::error::CoreError;
use crate::session::Session;
use crate::status::ConnectionStatus;

/// Client for a single networked camera.
///
/// Cheaply cloneable via `Arc<ClientInner>`; clones share one session.
/// Operations are meant to be issued one at a time. Starting a session
/// operation cancels whichever one was still in flight, and two racing
/// `connect` calls resolve last-writer-wins.
#[derive(Clone)]
pub struct CameraLinkClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    timeouts: Timeouts,
    http: reqwest::Client,
    session: watch::Sender<Session>,
    /// Token of the most recent session operation.
    current_op: ArcSwap<CancellationToken>,
}

impl CameraLinkClient {
    /// Create a client with the protocol's default time bounds.
    /// Does NOT connect -- call [`connect()`](Self::connect).
    pub fn new() -> Result<Self, CoreError> {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Result<Self, CoreError> {
        let http = build_transport(&options).build_client()?;
        let (session, _) = watch::channel(Session::default());

        Ok(Self {
            inner: Arc::new(ClientInner {
                timeouts: options.timeouts,
                http,
                session,
                current_op: ArcSwap::from_pointee(CancellationToken::new()),
            }),
        })
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.inner.timeouts
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Merge `patch` over the default config and probe the device.
    ///
    /// Returns `true` once the device answered `GET /status` within the
    /// probe bound; otherwise the client is left disconnected.
    pub async fn connect(&self, patch: DeviceConfigPatch) -> bool {
        match self.try_connect(patch).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "camera connection failed");
                false
            }
        }
    }

    pub async fn try_connect(&self, patch: DeviceConfigPatch) -> Result<(), CoreError> {
        let config = patch.apply_to(&DeviceConfig::default());
        if let Err(e) = config.validate() {
            self.begin_operation();
            self.inner.session.send_modify(Session::mark_lost);
            return Err(e);
        }
        if config.has_credentials() {
            debug!("credentials configured but not sent; the device protocol has no auth");
        }

        let token = self.begin_operation();
        let device = self.device_for(&config);
        info!(address = %config.address, port = config.port, "probing camera");
        self.inner
            .session
            .send_modify(|s| s.begin_connect(config));

        match device.status(self.inner.timeouts.probe, &token).await {
            Ok(_) if token.is_cancelled() => Err(superseded(Endpoint::Status)),
            Ok(report) => {
                self.inner
                    .session
                    .send_modify(|s| s.mark_connected(report.signal_quality(), Utc::now()));
                info!(stream_url = ?self.get_stream_url(), "camera connected");
                Ok(())
            }
            // Whoever cancelled us owns the session now.
            Err(e @ camlink_api::Error::Cancelled { .. }) => Err(e.into()),
            Err(e) => {
                self.inner.session.send_modify(Session::mark_lost);
                Err(e.into())
            }
        }
    }

    /// Probe again with the current config.
    pub async fn reconnect(&self) -> bool {
        let Some(config) = self.get_config() else {
            debug!("reconnect requested without a config");
            return false;
        };
        self.connect(patch_from(config)).await
    }

    /// Cancel any in-flight operation and forget the device. Idempotent.
    pub fn disconnect(&self) {
        self.inner.current_op.load().cancel();

        let was_connected = self.inner.session.borrow().is_connected();
        self.inner.session.send_modify(Session::clear);
        if was_connected {
            info!("disconnected from camera");
        } else {
            debug!("disconnect while already disconnected");
        }
    }

    /// Re-probe the connected device.
    ///
    /// On failure the session drops to disconnected but keeps its config,
    /// so [`reconnect()`](Self::reconnect) can pick it back up.
    pub async fn check_connection(&self) -> bool {
        match self.try_check_connection().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "camera connectivity check failed");
                false
            }
        }
    }

    pub async fn try_check_connection(&self) -> Result<(), CoreError> {
        let device = self.connected_device()?;
        let token = self.begin_operation();

        match device.status(self.inner.timeouts.probe, &token).await {
            Ok(_) if token.is_cancelled() => Err(superseded(Endpoint::Status)),
            Ok(report) => {
                self.inner
                    .session
                    .send_modify(|s| s.refresh_signal(report.signal_quality()));
                Ok(())
            }
            Err(e @ camlink_api::Error::Cancelled { .. }) => Err(e.into()),
            Err(e) => {
                self.inner.session.send_modify(Session::mark_lost);
                Err(e.into())
            }
        }
    }

    // ── Streaming ────────────────────────────────────────────────

    /// Ask the device to start streaming. Never downgrades `connected`.
    pub async fn start_streaming(&self) -> bool {
        match self.try_start_streaming().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to start camera stream");
                false
            }
        }
    }

    pub async fn try_start_streaming(&self) -> Result<(), CoreError> {
        let device = self.connected_device()?;
        let token = self.begin_operation();

        device
            .start_stream(self.inner.timeouts.command, &token)
            .await?;
        self.commit_streaming(&token, Endpoint::StartStream, true)?;
        info!("camera streaming started");
        Ok(())
    }

    pub async fn stop_streaming(&self) -> bool {
        match self.try_stop_streaming().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to stop camera stream");
                false
            }
        }
    }

    pub async fn try_stop_streaming(&self) -> Result<(), CoreError> {
        let device = self.connected_device()?;
        let token = self.begin_operation();

        device
            .stop_stream(self.inner.timeouts.command, &token)
            .await?;
        self.commit_streaming(&token, Endpoint::StopStream, false)?;
        info!("camera streaming stopped");
        Ok(())
    }

    // ── Capture ──────────────────────────────────────────────────

    pub async fn capture_photo(&self, mode: CaptureMode) -> Option<CapturedImage> {
        match self.try_capture_photo(mode).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, %mode, "failed to capture photo");
                None
            }
        }
    }

    pub async fn try_capture_photo(&self, mode: CaptureMode) -> Result<CapturedImage, CoreError> {
        let device = self.connected_device()?;
        let token = self.begin_operation();
        let bound = self.inner.timeouts.capture;

        let image = match mode {
            CaptureMode::Reference => {
                device.capture_check(bound, &token).await?;
                CapturedImage::Reference(device.endpoint_url(Endpoint::Capture))
            }
            CaptureMode::Embedded => {
                let body = device.capture_bytes(bound, &token).await?;
                CapturedImage::Embedded(EmbeddedImage::from_body(body)?)
            }
        };
        debug!(%mode, "photo captured");
        Ok(image)
    }

    // ── Discovery ────────────────────────────────────────────────

    /// Probe the built-in candidate list. Never fails; an empty result just
    /// means nothing answered.
    pub async fn scan_for_devices(&self) -> Vec<String> {
        self.scan_candidates(&discovery::default_candidates(), DEFAULT_DISCOVERY_PORT)
            .await
    }

    /// Probe an explicit candidate list with the same contract as
    /// [`scan_for_devices()`](Self::scan_for_devices).
    ///
    /// Discovery does not touch the session and is not cancelled by
    /// session operations.
    pub async fn scan_candidates(&self, candidates: &[String], default_port: u16) -> Vec<String> {
        discovery::scan(
            &self.inner.http,
            candidates,
            default_port,
            self.inner.timeouts.discovery,
            &CancellationToken::new(),
        )
        .await
    }

    // ── Snapshot accessors ───────────────────────────────────────

    pub fn get_status(&self) -> ConnectionStatus {
        self.inner.session.borrow().status().clone()
    }

    pub fn get_config(&self) -> Option<DeviceConfig> {
        self.inner.session.borrow().config().cloned()
    }

    pub fn get_stream_url(&self) -> Option<String> {
        self.inner.session.borrow().stream_url().map(str::to_owned)
    }

    /// Merge `patch` into the current config. No-op without one.
    pub fn update_config(&self, patch: &DeviceConfigPatch) {
        let mut outcome = Ok(false);
        self.inner.session.send_if_modified(|s| {
            outcome = s.apply_patch(patch);
            matches!(outcome, Ok(true))
        });
        match outcome {
            Ok(true) => debug!("device config updated"),
            Ok(false) => debug!("config update ignored; no device configured"),
            Err(e) => warn!(error = %e, "config update rejected"),
        }
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    // ── Helpers ──────────────────────────────────────────────────

    /// Install a fresh token for a new session operation, cancelling the
    /// previous one.
    fn begin_operation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self.inner.current_op.swap(Arc::new(token.clone()));
        previous.cancel();
        token
    }

    /// Record a finished stream command unless a newer operation took over.
    fn commit_streaming(
        &self,
        token: &CancellationToken,
        endpoint: Endpoint,
        streaming: bool,
    ) -> Result<(), CoreError> {
        if token.is_cancelled() {
            return Err(superseded(endpoint));
        }
        self.inner.session.send_modify(|s| s.set_streaming(streaming));
        Ok(())
    }

    fn device_for(&self, config: &DeviceConfig) -> DeviceClient {
        DeviceClient::with_client(self.inner.http.clone(), config.base_url())
    }

    /// The device client for the current session, or `NotConnected`.
    fn connected_device(&self) -> Result<DeviceClient, CoreError> {
        let session = self.inner.session.borrow();
        match session.config() {
            Some(config) if session.is_connected() => Ok(self.device_for(config)),
            _ => Err(CoreError::NotConnected),
        }
    }
}

/// Build a [`TransportConfig`] from the client options.
fn build_transport(options: &ClientOptions) -> TransportConfig {
    let transport = TransportConfig::default();
    match options.connect_timeout {
        Some(timeout) => transport.with_connect_timeout(timeout),
        None => transport,
    }
}

fn superseded(endpoint: Endpoint) -> CoreError {
    CoreError::Cancelled {
        operation: endpoint.to_string(),
    }
}

fn patch_from(config: DeviceConfig) -> DeviceConfigPatch {
    DeviceConfigPatch {
        address: Some(config.address),
        port: Some(config.port),
        username: config.username,
        password: config.password,
        stream_path: Some(config.stream_path),
    }
}
