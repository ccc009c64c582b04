// Response payloads
//
// The camera answers `/status` with a loosely-defined body (sensor settings
// JSON on stock firmware, plain text on others) and `/capture` with a JPEG.

use serde_json::Value;

/// Parsed `GET /status` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    /// Received signal strength in dBm, when the firmware reports it.
    pub rssi: Option<i32>,
}

impl StatusReport {
    /// Build a report from the raw response body. Never fails: a body
    /// that isn't a JSON object simply yields an empty report.
    pub fn from_body(body: &str) -> Self {
        let rssi = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(|v| v.get("rssi"))
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok());

        Self { rssi }
    }

    /// Signal quality on a 0-100 scale, derived from `rssi`.
    pub fn signal_quality(&self) -> Option<u8> {
        self.rssi.map(rssi_to_quality)
    }
}

/// Map dBm onto 0-100: -100 dBm and below is 0, -50 dBm and above is 100.
pub fn rssi_to_quality(rssi: i32) -> u8 {
    let quality = rssi.saturating_add(100).saturating_mul(2).clamp(0, 100);
    u8::try_from(quality).unwrap_or(0)
}

/// Raw `GET /capture` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBody {
    /// `Content-Type` header, if the device sent one.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
