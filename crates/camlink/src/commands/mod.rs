//! Command handlers, one module per top-level subcommand.

pub mod capture;
pub mod config_cmd;
pub mod scan;
pub mod status;
pub mod stream;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

use util::RenderOpts;

/// Route a device or discovery command to its handler.
///
/// `config` and `completions` never reach this point; `main` handles them
/// without touching the network.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let render = RenderOpts::resolve(global, cfg);

    match cmd {
        Command::Scan(args) => scan::handle(args, global, cfg, &render).await,
        Command::Status => status::handle(global, cfg, &render).await,
        Command::Stream(args) => stream::handle(args, global, cfg, &render).await,
        Command::Capture(args) => capture::handle(args, global, cfg, &render).await,
        Command::Watch(args) => watch::handle(args, global, cfg, &render).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command must be handled before dispatch".into(),
        )),
    }
}
