// Camera HTTP client
//
// Wraps `reqwest::Client` with the device's base URL and the bounded,
// cancellable request discipline every endpoint shares. Callers own the
// cancellation tokens; this module only honors them.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{CaptureBody, StatusReport};
use crate::transport::TransportConfig;

/// Raw HTTP client for one camera device.
///
/// Stateless with respect to the session: it knows where the device is,
/// not whether it is "connected". Cloning is cheap (the inner
/// `reqwest::Client` is reference-counted).
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeviceClient {
    /// Create a client for `http://{address}:{port}`.
    pub fn new(address: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = base_url(address, port)?;
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Discovery uses this to share one connection pool across probes.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    /// The device base URL, e.g. `http://192.168.4.1:80`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint on this device.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Reachability probe.
    ///
    /// `GET /status`
    pub async fn status(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<StatusReport, Error> {
        let endpoint = Endpoint::Status;
        bounded(endpoint, timeout, cancel, async {
            let resp = self.send(endpoint).await?;
            let body = resp.text().await?;
            Ok(StatusReport::from_body(&body))
        })
        .await
    }

    /// `POST /start-stream`
    pub async fn start_stream(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.command(Endpoint::StartStream, timeout, cancel).await
    }

    /// `POST /stop-stream`
    pub async fn stop_stream(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.command(Endpoint::StopStream, timeout, cancel).await
    }

    /// Trigger a capture and confirm the device produced one, without
    /// downloading the image.
    ///
    /// `GET /capture`
    pub async fn capture_check(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.command(Endpoint::Capture, timeout, cancel).await
    }

    /// Trigger a capture and download the full image body.
    ///
    /// `GET /capture`
    pub async fn capture_bytes(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<CaptureBody, Error> {
        let endpoint = Endpoint::Capture;
        bounded(endpoint, timeout, cancel, async {
            let resp = self.send(endpoint).await?;
            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let bytes = resp.bytes().await?.to_vec();
            debug!(len = bytes.len(), ?content_type, "capture downloaded");
            Ok(CaptureBody {
                content_type,
                bytes,
            })
        })
        .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Bodyless command: success is the status line alone.
    async fn command(
        &self,
        endpoint: Endpoint,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        bounded(endpoint, timeout, cancel, async {
            self.send(endpoint).await?;
            Ok(())
        })
        .await
    }

    /// Send the request and reject non-success statuses.
    async fn send(&self, endpoint: Endpoint) -> Result<reqwest::Response, Error> {
        let url = self.endpoint_url(endpoint);
        debug!("{} {}", endpoint.method(), url);

        let resp = self
            .http
            .request(endpoint.method(), url)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

/// Run `fut` until it completes, its bound elapses, or `cancel` fires.
///
/// An elapsed bound also cancels the token, so any other work sharing it
/// stops with the request.
async fn bounded<T>(
    endpoint: Endpoint,
    timeout: Duration,
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled { endpoint }),
        res = tokio::time::timeout(timeout, fut) => res.unwrap_or_else(|_| {
            cancel.cancel();
            Err(Error::Timeout { endpoint, timeout })
        }),
    }
}

/// Build `http://{address}:{port}`, validating that it parses.
///
/// The string form is kept verbatim; `Url` would drop a default port.
pub fn base_url(address: &str, port: u16) -> Result<String, Error> {
    let base = format!("http://{address}:{port}");
    let parsed = Url::parse(&base)?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
    }
    Ok(base)
}
