//! Watch handler: poll connectivity and report each sample.
//!
//! The core never polls on its own; this loop drives `check_connection` /
//! `reconnect` on a fixed interval and reports state changes it observes
//! through the client's session channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use camlink_core::{CameraLinkClient, LinkState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::{self, RenderOpts};

#[derive(Debug, Serialize)]
struct Sample {
    seq: u32,
    at: DateTime<Utc>,
    state: LinkState,
    signal_strength: u8,
}

fn line(sample: &Sample, color: bool) -> String {
    format!(
        "{}  #{:<4} {:<12} {}",
        sample.at.format("%H:%M:%S"),
        sample.seq,
        output::paint_state(sample.state, color),
        output::signal_bar(sample.signal_strength, color),
    )
}

pub async fn handle(
    args: WatchArgs,
    global: &GlobalOpts,
    cfg: &Config,
    render: &RenderOpts,
) -> Result<(), CliError> {
    let patch = config::resolve_device(global, cfg)?;
    let client = CameraLinkClient::new()?;

    // Unreachable is fine, we keep trying; a bad address is not.
    if let Err(e) = client.try_connect(patch).await {
        if e.is_precondition() {
            return Err(e.into());
        }
        tracing::warn!(error = %e, "initial connection failed; will keep retrying");
    }

    let result = poll(&client, &args, render, tokio::signal::ctrl_c()).await;
    client.disconnect();
    result
}

/// Sample until `args.count` is reached or `shutdown` resolves.
///
/// `shutdown` is polled across ticks and in-flight probes alike, so an
/// interrupt never waits out a probe bound.
async fn poll<F: Future>(
    client: &CameraLinkClient,
    args: &WatchArgs,
    render: &RenderOpts,
    shutdown: F,
) -> Result<(), CliError> {
    let mut changes = client.subscribe();
    let mut last_state = changes.borrow_and_update().status().state();

    let mut ticker = tokio::time::interval(args.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut seq: u32 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                util::note("Interrupted", render.quiet);
                return Ok(());
            }
        }
        seq += 1;

        // First sample reports the initial connect.
        if seq > 1 {
            let probe = async {
                if client.get_status().connected {
                    client.check_connection().await
                } else {
                    client.reconnect().await
                }
            };
            tokio::select! {
                _ = probe => {}
                _ = &mut shutdown => {
                    util::note("Interrupted", render.quiet);
                    return Ok(());
                }
            }
        }

        if changes.has_changed().unwrap_or(false) {
            let state = changes.borrow_and_update().status().state();
            if state != last_state {
                tracing::info!(from = %last_state, to = %state, "camera state changed");
                last_state = state;
            }
        }

        let status = client.get_status();
        let sample = Sample {
            seq,
            at: Utc::now(),
            state: status.state(),
            signal_strength: status.signal_strength,
        };
        let out = match render.format {
            // One document per line for streaming consumers.
            OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(&sample)?,
            format => output::render_single(
                format,
                &sample,
                |s| line(s, render.color),
                |s| s.state.to_string(),
            )?,
        };
        output::print_output(&out, render.quiet);

        if args.count.is_some_and(|n| seq >= n) {
            return Ok(());
        }
    }
}
