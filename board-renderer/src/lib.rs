//! # Mathboard Renderer
//!
//! Software rasterization and image capture for the whiteboard.
//!
//! ## Capture Pipeline
//!
//! ```text
//! ┌──────────────┐  locate   ┌───────────────┐ snapshot ┌──────────┐
//! │ Surface      │──────────►│ RasterSurface │─────────►│ RgbaImage│
//! │ Registry     │ selectors │ (scene/static)│          └────┬─────┘
//! └──────────────┘           └───────────────┘               │ encode
//!                                                            ▼
//!                                          ┌─────────────────────────────┐
//!                                          │ CapturedImage (base64 + mime)│
//!                                          └─────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod error;
pub mod export;
pub mod image;
pub mod raster;

pub use capture::{
    capture_surface, encode, fit_within, CaptureFormat, CaptureOptions, CapturedImage,
};
pub use error::{RenderError, RenderResult};
pub use export::{RasterConfig, SceneRasterizer};
pub use raster::{RasterSurface, SceneSurface, StaticSurface, SurfaceRegistry, DEFAULT_SELECTORS};
