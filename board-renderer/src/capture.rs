//! # Whiteboard Capture
//!
//! Turns a raster surface into an encoded, base64 image ready for a vision
//! model. Two presets cover the two ways captures are used:
//!
//! | preset           | format | quality | max size  |
//! |------------------|--------|---------|-----------|
//! | `real_time()`    | JPEG   | 0.5     | 600 × 450 |
//! | `high_quality()` | PNG    | 1.0     | none      |

use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterSurface;

/// Encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// Lossless PNG.
    Png,
    /// Lossy JPEG.
    Jpeg,
}

impl CaptureFormat {
    /// MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Capture tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Output format; `None` picks JPEG for real-time and PNG otherwise.
    pub format: Option<CaptureFormat>,
    /// JPEG quality in `0.1..=1.0`; `None` picks 0.5 for real-time and 1.0
    /// otherwise. PNG ignores it.
    pub quality: Option<f32>,
    /// Maximum output width in pixels.
    pub max_width: Option<u32>,
    /// Maximum output height in pixels.
    pub max_height: Option<u32>,
    /// Real-time captures feed live analysis and do not wait for it.
    pub real_time: bool,
    /// Color transparent pixels are flattened onto for JPEG.
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            format: None,
            quality: None,
            max_width: None,
            max_height: None,
            real_time: false,
            background: [255, 255, 255],
        }
    }
}

impl CaptureOptions {
    /// Reduced quality and resolution for continuous analysis while drawing.
    #[must_use]
    pub fn real_time() -> Self {
        Self {
            format: Some(CaptureFormat::Jpeg),
            quality: Some(0.5),
            max_width: Some(600),
            max_height: Some(450),
            real_time: true,
            ..Self::default()
        }
    }

    /// Lossless full-resolution capture for a manual analysis request.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            format: Some(CaptureFormat::Png),
            quality: Some(1.0),
            ..Self::default()
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: CaptureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the JPEG quality.
    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the size limits.
    #[must_use]
    pub fn with_max_size(mut self, max_width: Option<u32>, max_height: Option<u32>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Format after applying the real-time default.
    #[must_use]
    pub fn resolved_format(&self) -> CaptureFormat {
        self.format.unwrap_or(if self.real_time {
            CaptureFormat::Jpeg
        } else {
            CaptureFormat::Png
        })
    }

    /// Quality after applying the real-time default, clamped to `0.1..=1.0`.
    #[must_use]
    pub fn resolved_quality(&self) -> f32 {
        let quality = self
            .quality
            .unwrap_or(if self.real_time { 0.5 } else { 1.0 });
        if quality.is_finite() {
            quality.clamp(0.1, 1.0)
        } else {
            1.0
        }
    }
}

/// An encoded whiteboard image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedImage {
    /// Base64 payload without any `data:` prefix.
    pub data: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Encoded width in pixels.
    pub width: u32,
    /// Encoded height in pixels.
    pub height: u32,
}

impl CapturedImage {
    /// Render as a `data:` URL, e.g. for a debug preview.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload back into raw encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64.
    pub fn to_bytes(&self) -> RenderResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| RenderError::Decode(format!("invalid base64: {e}")))
    }
}

/// Largest size ≤ the source that fits both limits, preserving aspect ratio.
///
/// The scale factor is `min(max_w / w, max_h / h, 1)`, evaluated as an exact
/// fraction so that e.g. 1000×500 limited to width 400 gives exactly 400×200.
/// Fractional results are truncated. Never upscales.
#[must_use]
pub fn fit_within(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    // Scale as num/den, starting at 1.
    let (mut num, mut den) = (1u64, 1u64);
    for (limit, size) in [(max_width, width), (max_height, height)] {
        if let Some(limit) = limit {
            if size > 0 && u64::from(limit) * den < num * u64::from(size) {
                num = u64::from(limit);
                den = u64::from(size);
            }
        }
    }

    let scale = |size: u32| {
        let scaled = u64::from(size) * num / den;
        u32::try_from(scaled).unwrap_or(size).max(1)
    };
    (scale(width), scale(height))
}

/// Downscale and encode a raster.
///
/// # Errors
///
/// Returns an error if the raster is empty or encoding fails.
pub fn encode(image: &RgbaImage, options: &CaptureOptions) -> RenderResult<CapturedImage> {
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(RenderError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let format = options.resolved_format();
    let quality = options.resolved_quality();
    let (width, height) = fit_within(src_w, src_h, options.max_width, options.max_height);

    let scaled;
    let source = if (width, height) == (src_w, src_h) {
        image
    } else {
        scaled = image::imageops::resize(image, width, height, FilterType::Triangle);
        tracing::debug!(src_w, src_h, width, height, "scaled capture");
        &scaled
    };

    let bytes = match format {
        CaptureFormat::Png => encode_png(source)?,
        CaptureFormat::Jpeg => encode_jpeg(source, quality, options.background)?,
    };

    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    tracing::debug!(
        format = format.mime_type(),
        quality,
        width,
        height,
        kb = data.len() / 1024,
        real_time = options.real_time,
        "whiteboard captured"
    );

    Ok(CapturedImage {
        data,
        mime_type: format.mime_type().to_string(),
        width,
        height,
    })
}

/// Snapshot a surface and encode it. Has no side effects on the surface.
///
/// # Errors
///
/// Returns an error if the snapshot or encoding fails.
pub fn capture_surface(
    surface: &dyn RasterSurface,
    options: &CaptureOptions,
) -> RenderResult<CapturedImage> {
    let image = surface.snapshot()?;
    encode(&image, options)
}

fn encode_png(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn encode_jpeg(image: &RgbaImage, quality: f32, background: [u8; 3]) -> RenderResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in image.pixels() {
        let alpha = f32::from(pixel[3]) / 255.0;
        let inv = 1.0 - alpha;
        for channel in 0..3 {
            let value = f32::from(pixel[channel]).mul_add(alpha, f32::from(background[channel]) * inv);
            rgb.push(value.round() as u8);
        }
    }

    let jpeg_quality = ((quality * 100.0).round() as u8).clamp(1, 100);
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, jpeg_quality)
        .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
