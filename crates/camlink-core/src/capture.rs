// ── Still capture results ──
//
// A capture is either a URL the caller dereferences later, or the image
// itself carried inline with its MIME type for consumers that can only
// render self-contained payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camlink_api::CaptureBody;
use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::CoreError;

/// How `capture_photo` should hand back the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Confirm the capture and return its URL; bytes are fetched lazily.
    #[default]
    Reference,
    /// Download the bytes before returning.
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedImage {
    Reference(String),
    Embedded(EmbeddedImage),
}

impl CapturedImage {
    /// A URI any image consumer can load: the capture URL, or a `data:` URI.
    pub fn to_uri(&self) -> String {
        match self {
            Self::Reference(url) => url.clone(),
            Self::Embedded(image) => image.to_data_uri(),
        }
    }
}

/// Image bytes tagged with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    /// The device firmware only produces JPEG.
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build from a downloaded body. Uses the `Content-Type` only when it
    /// names an image type.
    pub fn from_body(body: CaptureBody) -> Result<Self, CoreError> {
        if body.bytes.is_empty() {
            return Err(CoreError::EmptyCapture);
        }
        let mime_type = body
            .content_type
            .as_deref()
            .and_then(image_mime)
            .unwrap_or_else(|| Self::DEFAULT_MIME_TYPE.to_owned());
        Ok(Self::new(mime_type, body.bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:{mime};base64,{payload}`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension for saving the image.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/bmp" => "bmp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }
}

/// Normalize a `Content-Type` value to its `image/*` essence, if it is one.
fn image_mime(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    essence.starts_with("image/").then_some(essence)
}
