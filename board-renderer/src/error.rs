//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterizing or encoding a whiteboard.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested raster would be empty or too large.
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Drawing the scene failed.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Encoding the raster to PNG/JPEG failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Decoding an input image failed.
    #[error("Failed to decode image: {0}")]
    Decode(String),
}
