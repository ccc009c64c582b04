// Camera control endpoints
//
// The device firmware defines a fixed set of paths. Each endpoint carries
// its HTTP method and the time bound the protocol allows it.

use std::time::Duration;

use reqwest::Method;
use strum::{Display, EnumIter, IntoStaticStr};

/// One of the fixed HTTP endpoints exposed by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Endpoint {
    /// `GET /status` -- reachability probe.
    #[strum(serialize = "GET /status")]
    Status,
    /// `POST /start-stream`
    #[strum(serialize = "POST /start-stream")]
    StartStream,
    /// `POST /stop-stream`
    #[strum(serialize = "POST /stop-stream")]
    StopStream,
    /// `GET /capture` -- single JPEG frame.
    #[strum(serialize = "GET /capture")]
    Capture,
}

impl Endpoint {
    /// URL path relative to the device base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::StartStream => "/start-stream",
            Self::StopStream => "/stop-stream",
            Self::Capture => "/capture",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::Status | Self::Capture => Method::GET,
            Self::StartStream | Self::StopStream => Method::POST,
        }
    }

    /// Time bound the protocol grants this endpoint.
    ///
    /// Capture is longer than the control commands because it transfers
    /// a full image.
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::Status => Duration::from_secs(5),
            Self::StartStream | Self::StopStream => Duration::from_secs(3),
            Self::Capture => Duration::from_secs(10),
        }
    }
}
