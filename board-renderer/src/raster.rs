//! Raster surfaces and selector-based lookup.
//!
//! The host mounts its drawing surface under one or more selectors. Capture
//! code does not know which one is live, so it tries an ordered list of
//! fallbacks and takes the first match.
//!
//! ```text
//! locate(["canvas[data-testid=\"canvas\"]", ".excalidraw canvas", "canvas"])
//!            │ miss                           │ hit
//!            └──────────────► next ───────────┴──► Arc<dyn RasterSurface>
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use board_core::Whiteboard;
use image::RgbaImage;

use crate::error::RenderResult;
use crate::export::SceneRasterizer;

/// Fallback selectors for the whiteboard surface, most specific first.
pub const DEFAULT_SELECTORS: [&str; 4] = [
    r#"canvas[data-testid="canvas"]"#,
    ".excalidraw__canvas canvas",
    ".excalidraw canvas",
    "canvas",
];

/// Something that can be read back as an RGBA raster.
pub trait RasterSurface: Send + Sync {
    /// Current raster size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Read the current pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be rasterized.
    fn snapshot(&self) -> RenderResult<RgbaImage>;
}

/// A live whiteboard rendered on demand.
#[derive(Debug, Clone)]
pub struct SceneSurface {
    board: Whiteboard,
    rasterizer: SceneRasterizer,
}

impl SceneSurface {
    /// Wrap a whiteboard with the default rasterizer.
    #[must_use]
    pub fn new(board: Whiteboard) -> Self {
        Self::with_rasterizer(board, SceneRasterizer::default())
    }

    /// Wrap a whiteboard with a custom rasterizer.
    #[must_use]
    pub fn with_rasterizer(board: Whiteboard, rasterizer: SceneRasterizer) -> Self {
        Self { board, rasterizer }
    }

    /// The underlying whiteboard.
    #[must_use]
    pub fn board(&self) -> &Whiteboard {
        &self.board
    }
}

impl RasterSurface for SceneSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.rasterizer.output_dimensions(&self.board.snapshot())
    }

    fn snapshot(&self) -> RenderResult<RgbaImage> {
        self.rasterizer.render(&self.board.snapshot())
    }
}

/// A fixed raster, e.g. an uploaded photo of a problem.
#[derive(Debug, Clone)]
pub struct StaticSurface {
    image: RgbaImage,
}

impl StaticSurface {
    /// Wrap an already decoded image.
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode a base64 data URI into a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI cannot be decoded.
    pub fn from_data_uri(uri: &str) -> RenderResult<Self> {
        crate::image::decode_data_uri(uri).map(Self::new)
    }
}

impl RasterSurface for StaticSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn snapshot(&self) -> RenderResult<RgbaImage> {
        Ok(self.image.clone())
    }
}

/// Selector → surface map shared between the host and capture code.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Arc<RwLock<HashMap<String, Arc<dyn RasterSurface>>>>,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a surface under a selector, replacing any previous one.
    pub fn register(&self, selector: impl Into<String>, surface: Arc<dyn RasterSurface>) {
        let selector = selector.into();
        tracing::debug!(%selector, "surface registered");
        self.surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector, surface);
    }

    /// Unmount the surface under a selector.
    pub fn unregister(&self, selector: &str) -> Option<Arc<dyn RasterSurface>> {
        self.surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(selector)
    }

    /// Look up a surface by exact selector.
    #[must_use]
    pub fn get(&self, selector: &str) -> Option<Arc<dyn RasterSurface>> {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(selector)
            .cloned()
    }

    /// Try each selector in order and return the first mounted surface
    /// together with the selector that matched.
    #[must_use]
    pub fn locate<S: AsRef<str>>(&self, selectors: &[S]) -> Option<(String, Arc<dyn RasterSurface>)> {
        let surfaces = self.surfaces.read().unwrap_or_else(PoisonError::into_inner);
        let found = selectors.iter().find_map(|selector| {
            let selector = selector.as_ref();
            surfaces
                .get(selector)
                .map(|surface| (selector.to_string(), Arc::clone(surface)))
        });

        match &found {
            Some((selector, _)) => tracing::debug!(%selector, "found surface"),
            None => tracing::warn!(
                available = surfaces.len(),
                "could not find whiteboard surface"
            ),
        }
        found
    }

    /// Number of mounted surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no surface is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let surfaces = self.surfaces.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SurfaceRegistry")
            .field("selectors", &surfaces.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32) -> Arc<dyn RasterSurface> {
        Arc::new(StaticSurface::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 255, 255, 255]),
        )))
    }

    #[test]
    fn test_locate_prefers_list_order() {
        let registry = SurfaceRegistry::new();
        registry.register("canvas", solid(1, 1));
        registry.register(".excalidraw canvas", solid(2, 2));

        let (selector, surface) = registry.locate(&DEFAULT_SELECTORS[..]).expect("found");
        assert_eq!(selector, ".excalidraw canvas");
        assert_eq!(surface.dimensions(), (2, 2));
    }

    #[test]
    fn test_locate_falls_back_to_generic() {
        let registry = SurfaceRegistry::new();
        registry.register("canvas", solid(3, 3));

        let (selector, _) = registry.locate(&DEFAULT_SELECTORS[..]).expect("found");
        assert_eq!(selector, "canvas");
    }

    #[test]
    fn test_locate_miss() {
        let registry = SurfaceRegistry::new();
        registry.register("#toolbar", solid(1, 1));
        assert!(registry.locate(&DEFAULT_SELECTORS[..]).is_none());
    }

    #[test]
    fn test_unregister() {
        let registry = SurfaceRegistry::new();
        registry.register("canvas", solid(1, 1));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister("canvas").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scene_surface_tracks_board() {
        let board = Whiteboard::new(64.0, 32.0);
        let surface = SceneSurface::new(board.clone());
        assert_eq!(surface.dimensions(), (64, 32));

        board.update(|scene| scene.set_viewport(128.0, 32.0));
        let img = surface.snapshot().expect("snapshot");
        assert_eq!(img.dimensions(), (128, 32));
    }
}
