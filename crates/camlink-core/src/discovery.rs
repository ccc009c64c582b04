// ── Device discovery ──
//
// Probes a small list of likely camera addresses in parallel. Each probe is
// bounded and cancellable on its own, so one hanging candidate never holds
// up the rest, and failures only exclude that candidate from the result.

use std::time::Duration;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use camlink_api::DeviceClient;

/// Addresses tried when no candidate list is supplied: the firmware's
/// access-point address, then common DHCP leases on home networks.
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    "192.168.4.1",
    "192.168.1.100",
    "192.168.1.101",
    "192.168.1.102",
];

pub const DEFAULT_DISCOVERY_PORT: u16 = 80;

pub fn default_candidates() -> Vec<String> {
    DEFAULT_CANDIDATES.iter().map(|&c| c.to_owned()).collect()
}

/// Split an optional `:port` suffix off a candidate.
///
/// `"10.0.0.5:8080"` targets port 8080; a bare host uses `default_port`.
/// Bracketed IPv6 literals keep their colons.
pub fn split_candidate(candidate: &str, default_port: u16) -> (&str, u16) {
    if let Some((host, port)) = candidate.rsplit_once(':') {
        if !host.contains(':') || host.ends_with(']') {
            if let Ok(port) = port.parse::<u16>() {
                return (host, port);
            }
        }
    }
    (candidate, default_port)
}

/// Probe every candidate concurrently and return the ones that answered
/// `GET /status` successfully, in candidate order.
///
/// Each probe gets a child of `parent`: cancelling `parent` aborts the whole
/// scan, while a probe's own timeout only ever cancels that probe.
pub async fn scan(
    http: &reqwest::Client,
    candidates: &[String],
    default_port: u16,
    bound: Duration,
    parent: &CancellationToken,
) -> Vec<String> {
    let probes = candidates.iter().map(|candidate| {
        let cancel = parent.child_token();
        async move {
            probe(http, candidate, default_port, bound, &cancel)
                .await
                .then(|| candidate.clone())
        }
    });

    let found: Vec<String> = join_all(probes).await.into_iter().flatten().collect();
    debug!(
        probed = candidates.len(),
        found = found.len(),
        "discovery scan complete"
    );
    found
}

async fn probe(
    http: &reqwest::Client,
    candidate: &str,
    default_port: u16,
    bound: Duration,
    cancel: &CancellationToken,
) -> bool {
    let (host, port) = split_candidate(candidate, default_port);
    let base_url = match camlink_api::client::base_url(host, port) {
        Ok(url) => url,
        Err(e) => {
            debug!(candidate, error = %e, "skipping malformed candidate");
            return false;
        }
    };

    let device = DeviceClient::with_client(http.clone(), base_url);
    match device.status(bound, cancel).await {
        Ok(_) => {
            debug!(candidate, "candidate answered");
            true
        }
        Err(e) => {
            debug!(
                candidate,
                error = %e,
                transient = e.is_transient(),
                "candidate did not answer"
            );
            false
        }
    }
}
