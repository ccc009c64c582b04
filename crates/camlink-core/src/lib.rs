//! Session layer between `camlink-api` and consumers (CLI, embedders).
//!
//! - **[`CameraLinkClient`]** owns one camera session. [`connect()`](CameraLinkClient::connect)
//!   probes the device, stream and capture operations require a live
//!   session, and [`disconnect()`](CameraLinkClient::disconnect) cancels
//!   whatever is in flight. Operations fail soft; `try_*` variants return
//!   [`CoreError`].
//!
//! - **Discovery** ([`discovery`]) probes a candidate list in parallel
//!   without touching the session.
//!
//! - **State** is published through a `tokio::sync::watch` channel of
//!   [`Session`] snapshots; [`ConnectionStatus`] values are always copies.

pub mod capture;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod session;
pub mod status;

// ── Primary re-exports ──────────────────────────────────────────────
pub use capture::{CaptureMode, CapturedImage, EmbeddedImage};
pub use client::CameraLinkClient;
pub use config::{ClientOptions, DeviceConfig, DeviceConfigPatch, Timeouts};
pub use error::CoreError;
pub use session::Session;
pub use status::{ConnectionStatus, LinkState};
