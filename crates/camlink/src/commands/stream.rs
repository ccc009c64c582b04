//! Stream command handlers.

use crate::cli::{GlobalOpts, StreamArgs, StreamCommand};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util::{self, RenderOpts};

pub async fn handle(
    args: StreamArgs,
    global: &GlobalOpts,
    cfg: &Config,
    render: &RenderOpts,
) -> Result<(), CliError> {
    let quiet = render.quiet;

    util::with_client(global, cfg, |client| async move {
        match args.command {
            StreamCommand::Start => {
                client.try_start_streaming().await?;
                util::note("Streaming started", quiet);
                output::print_output(&client.get_stream_url().unwrap_or_default(), quiet);
            }
            StreamCommand::Stop => {
                client.try_stop_streaming().await?;
                util::note("Streaming stopped", quiet);
            }
            StreamCommand::Url => {
                output::print_output(&client.get_stream_url().unwrap_or_default(), quiet);
            }
        }
        Ok(())
    })
    .await
}
