//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use camlink_core::CameraLinkClient;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Output settings resolved once per invocation.
#[derive(Debug, Clone, Copy)]
pub struct RenderOpts {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl RenderOpts {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Self {
        Self {
            format: config::output_format(global, cfg),
            color: output::should_color(config::color_mode(global, cfg)),
            quiet: global.quiet,
        }
    }
}

/// Build a client and connect it to the device selected by flags/config.
pub async fn connect(global: &GlobalOpts, cfg: &Config) -> Result<CameraLinkClient, CliError> {
    let patch = config::resolve_device(global, cfg)?;
    let client = CameraLinkClient::new()?;
    client.try_connect(patch).await?;
    Ok(client)
}

/// Run `body` against a connected client, disconnecting afterwards either way.
pub async fn with_client<T, F, Fut>(global: &GlobalOpts, cfg: &Config, body: F) -> Result<T, CliError>
where
    F: FnOnce(CameraLinkClient) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let client = connect(global, cfg).await?;
    let result = body(client.clone()).await;
    client.disconnect();
    result
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr; hidden in quiet mode or when stderr is not a terminal.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Status line on stderr, so stdout stays parseable.
pub fn note(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
