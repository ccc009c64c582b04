//! Status handler: connect, report, disconnect.

use chrono::{DateTime, Utc};
use serde::Serialize;

use camlink_core::{CameraLinkClient, LinkState};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util::{self, RenderOpts};

/// What `camlink status` reports.
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub state: LinkState,
    pub connected: bool,
    pub streaming: bool,
    pub signal_strength: u8,
    pub address: String,
    pub stream_url: Option<String>,
    pub last_connected_at: Option<DateTime<Utc>>,
}

impl StatusView {
    pub fn capture(client: &CameraLinkClient) -> Self {
        let status = client.get_status();
        Self {
            state: status.state(),
            connected: status.connected,
            streaming: status.streaming,
            signal_strength: status.signal_strength,
            address: status.address,
            stream_url: client.get_stream_url(),
            last_connected_at: status.last_connected_at,
        }
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    [
        format!("State:      {}", output::paint_state(view.state, color)),
        format!("Address:    {}", view.address),
        format!("Signal:     {}", output::signal_bar(view.signal_strength, color)),
        format!("Stream URL: {}", view.stream_url.as_deref().unwrap_or("-")),
        format!(
            "Connected:  {}",
            view.last_connected_at
                .map_or_else(|| "-".into(), |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        ),
    ]
    .join("\n")
}

pub async fn handle(global: &GlobalOpts, cfg: &Config, render: &RenderOpts) -> Result<(), CliError> {
    let view = util::with_client(global, cfg, |client| async move {
        Ok(StatusView::capture(&client))
    })
    .await?;

    let out = output::render_single(
        render.format,
        &view,
        |v| detail(v, render.color),
        |v| v.state.to_string(),
    )?;
    output::print_output(&out, render.quiet);
    Ok(())
}
