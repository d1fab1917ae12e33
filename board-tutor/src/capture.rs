//! Capture the live whiteboard and hand it to an analyzer.

use std::sync::Arc;

use board_renderer::{capture_surface, CaptureOptions, CapturedImage, SurfaceRegistry, DEFAULT_SELECTORS};

use crate::analyzer::WhiteboardAnalyzer;
use crate::error::{CaptureError, CaptureResult};

/// Locates the whiteboard surface and captures it.
#[derive(Debug, Clone)]
pub struct WhiteboardCapture {
    registry: SurfaceRegistry,
    selectors: Vec<String>,
}

impl WhiteboardCapture {
    /// Capture from `registry` using the default selector fallbacks.
    #[must_use]
    pub fn new(registry: SurfaceRegistry) -> Self {
        Self::with_selectors(registry, DEFAULT_SELECTORS)
    }

    /// Capture from `registry`, trying `selectors` in order.
    #[must_use]
    pub fn with_selectors<I, S>(registry: SurfaceRegistry, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry,
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// The selectors tried, in order.
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// The registry surfaces are looked up in.
    #[must_use]
    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// Locate the surface and encode it.
    ///
    /// # Errors
    ///
    /// [`CaptureError::SurfaceNotFound`] if no selector matches; nothing is
    /// rasterized in that case. [`CaptureError::Encode`] if rasterizing or
    /// encoding fails.
    pub fn capture(&self, options: &CaptureOptions) -> CaptureResult<CapturedImage> {
        let Some((selector, surface)) = self.registry.locate(self.selectors.as_slice()) else {
            return Err(CaptureError::SurfaceNotFound {
                selectors: self.selectors.clone(),
            });
        };

        tracing::debug!(%selector, real_time = options.real_time, "capturing whiteboard");
        capture_surface(surface.as_ref(), options).map_err(|e| {
            tracing::error!(error = %e, "failed to capture whiteboard");
            CaptureError::Encode(e)
        })
    }

    /// Capture and send the image to `analyzer`.
    ///
    /// In real-time mode the analysis runs in the background: this returns as
    /// soon as the capture is dispatched and later analysis failures are only
    /// logged. Otherwise the analysis is awaited and its failure returned.
    ///
    /// # Errors
    ///
    /// Capture failures always; [`CaptureError::Analysis`] outside real-time
    /// mode.
    pub async fn capture_and_analyze(
        &self,
        analyzer: Arc<dyn WhiteboardAnalyzer>,
        options: &CaptureOptions,
    ) -> CaptureResult<CapturedImage> {
        let image = self.capture(options)?;

        if options.real_time {
            let dispatched = image.clone();
            tokio::spawn(async move {
                if let Err(e) = analyzer.analyze_whiteboard(&dispatched).await {
                    tracing::error!(error = %e, "background whiteboard analysis failed");
                }
            });
            tracing::debug!("whiteboard analysis started in background");
            return Ok(image);
        }

        match analyzer.analyze_whiteboard(&image).await {
            Ok(()) => {
                tracing::info!("whiteboard analysis completed");
                Ok(image)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to analyze whiteboard");
                Err(CaptureError::Analysis(e))
            }
        }
    }

    /// Lossless full-resolution capture, awaiting the analysis.
    ///
    /// # Errors
    ///
    /// See [`WhiteboardCapture::capture_and_analyze`].
    pub async fn capture_and_analyze_high_quality(
        &self,
        analyzer: Arc<dyn WhiteboardAnalyzer>,
    ) -> CaptureResult<CapturedImage> {
        self.capture_and_analyze(analyzer, &CaptureOptions::high_quality())
            .await
    }
}
