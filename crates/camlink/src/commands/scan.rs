//! Discovery handler.

use serde::Serialize;
use tabled::Tabled;

use camlink_core::CameraLinkClient;
use camlink_core::discovery::split_candidate;

use crate::cli::{GlobalOpts, ScanArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util::{self, RenderOpts};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Found {
    /// As probed, including any `:port` suffix.
    #[serde(skip)]
    candidate: String,
    address: String,
    port: u16,
    url: String,
}

#[derive(Tabled)]
struct FoundRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Found> for FoundRow {
    fn from(f: &Found) -> Self {
        Self {
            address: f.address.clone(),
            port: f.port,
            url: f.url.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: ScanArgs,
    global: &GlobalOpts,
    cfg: &Config,
    render: &RenderOpts,
) -> Result<(), CliError> {
    let candidates = if args.candidates.is_empty() {
        cfg.discovery.candidates.clone()
    } else {
        args.candidates
    };
    let port = global.port.unwrap_or(cfg.discovery.port);

    let client = CameraLinkClient::new()?;
    let bar = util::spinner(
        format!("Probing {} candidate address(es)", candidates.len()),
        render.quiet,
    );
    let responders = client.scan_candidates(&candidates, port).await;
    bar.finish_and_clear();

    if responders.is_empty() {
        util::note("No cameras found", render.quiet);
        return Ok(());
    }

    let found: Vec<Found> = responders
        .iter()
        .map(|candidate| {
            let (address, port) = split_candidate(candidate, port);
            Found {
                candidate: candidate.clone(),
                address: address.to_owned(),
                port,
                url: format!("http://{address}:{port}"),
            }
        })
        .collect();

    let out = output::render_list(
        render.format,
        &found,
        |f| FoundRow::from(f),
        |f| f.candidate.clone(),
    )?;
    output::print_output(&out, render.quiet);
    Ok(())
}
