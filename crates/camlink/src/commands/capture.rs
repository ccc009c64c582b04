//! Capture handler.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use camlink_core::{CaptureMode, CapturedImage, EmbeddedImage};

use crate::cli::{CaptureArgs, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util::{self, RenderOpts};

#[derive(Debug, Serialize)]
struct CaptureView {
    mode: CaptureMode,
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
}

impl CaptureView {
    fn new(image: &CapturedImage) -> Self {
        match image {
            CapturedImage::Reference(url) => Self {
                mode: CaptureMode::Reference,
                uri: url.clone(),
                mime_type: None,
                size: None,
                saved_to: None,
            },
            CapturedImage::Embedded(embedded) => Self {
                mode: CaptureMode::Embedded,
                uri: embedded.to_data_uri(),
                mime_type: Some(embedded.mime_type.clone()),
                size: Some(embedded.bytes.len()),
                saved_to: None,
            },
        }
    }
}

/// Where `--save PATH` writes: PATH itself, or a timestamped file inside it
/// when PATH is an existing directory.
fn save_target(path: &Path, image: &EmbeddedImage) -> PathBuf {
    if path.is_dir() {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        path.join(format!("capture-{stamp}.{}", image.extension()))
    } else {
        path.to_path_buf()
    }
}

pub async fn handle(
    args: CaptureArgs,
    global: &GlobalOpts,
    cfg: &Config,
    render: &RenderOpts,
) -> Result<(), CliError> {
    let mode = if args.embed || args.save.is_some() {
        CaptureMode::Embedded
    } else {
        CaptureMode::Reference
    };

    let image = util::with_client(global, cfg, |client| async move {
        client.try_capture_photo(mode).await.map_err(CliError::from)
    })
    .await?;

    let mut view = CaptureView::new(&image);

    if let (Some(path), CapturedImage::Embedded(embedded)) = (args.save.as_deref(), &image) {
        let target = save_target(path, embedded);
        std::fs::write(&target, &embedded.bytes)?;
        util::note(
            &format!("Saved {} bytes to {}", embedded.bytes.len(), target.display()),
            render.quiet,
        );
        view.uri = target.display().to_string();
        view.saved_to = Some(target);
    }

    let out = output::render_single(
        render.format,
        &view,
        |v| v.uri.clone(),
        |v| v.uri.clone(),
    )?;
    output::print_output(&out, render.quiet);
    Ok(())
}
