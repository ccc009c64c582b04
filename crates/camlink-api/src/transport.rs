// Shared transport configuration for building reqwest::Client instances.
//
// Session commands and discovery probes build their clients through this
// module so pooling and connect settings stay consistent.

use std::time::Duration;

const USER_AGENT: &str = concat!("camlink/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
///
/// There is deliberately no overall request timeout here: every request
/// carries its own bound (see [`Endpoint::default_timeout`](crate::Endpoint::default_timeout)).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on TCP connect, independent of the per-request bound.
    pub connect_timeout: Option<Duration>,
    /// Idle keep-alive connections kept per host. The camera firmware only
    /// serves a handful of sockets, so this stays small.
    pub max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            max_idle_per_host: 1,
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .pool_max_idle_per_host(self.max_idle_per_host);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }

    /// Same config with a TCP connect bound.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}
