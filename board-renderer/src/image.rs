//! Image decoding utilities.
//!
//! Uploaded problem images arrive as raw bytes or base64 data URIs.

use base64::Engine;
use image::RgbaImage;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else {
            Self::Unknown
        }
    }
}

/// Decode an encoded image into RGBA pixels.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn decode_image(data: &[u8]) -> RenderResult<RgbaImage> {
    let img = image::load_from_memory(data).map_err(|e| RenderError::Decode(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Decode base64 image data without any `data:` prefix.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64 or not an image.
pub fn decode_base64(encoded: &str) -> RenderResult<RgbaImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| RenderError::Decode(format!("invalid base64: {e}")))?;
    decode_image(&bytes)
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and payload.
///
/// # Errors
///
/// Returns an error if the URI is not a base64 data URI.
pub fn split_data_uri(uri: &str) -> RenderResult<(&str, &str)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Decode("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Decode("invalid data URI: missing comma".to_string()))?;
    let mime = metadata
        .strip_suffix(";base64")
        .ok_or_else(|| RenderError::Decode("only base64 data URIs are supported".to_string()))?;
    Ok((mime, payload))
}

/// Decode a base64 data URI, e.g. `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns an error if the URI is malformed or the image cannot be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<RgbaImage> {
    let (_, payload) = split_data_uri(uri)?;
    decode_base64(payload)
}
