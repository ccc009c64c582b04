use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

/// Connection status observable by consumers.
///
/// Always handed out by value; mutating a copy never affects the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub streaming: bool,
    /// Advisory 0-100 link quality; 0 when the device doesn't report one.
    pub signal_strength: u8,
    /// Address of the most recently connected device.
    pub address: String,
    pub last_connected_at: Option<DateTime<Utc>>,
}

/// Coarse session state derived from [`ConnectionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Disconnected,
    Connected,
    Streaming,
}

impl ConnectionStatus {
    pub fn state(&self) -> LinkState {
        match (self.connected, self.streaming) {
            (true, true) => LinkState::Streaming,
            (true, false) => LinkState::Connected,
            (false, _) => LinkState::Disconnected,
        }
    }
}
