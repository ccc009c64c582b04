// camlink-api: Async client for the camera's HTTP control protocol

pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod transport;

pub use client::DeviceClient;
pub use endpoint::Endpoint;
pub use error::Error;
pub use models::{CaptureBody, StatusReport};
pub use transport::TransportConfig;
