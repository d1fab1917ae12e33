//! Seams between the capture pipeline and whoever does the analysis.

use async_trait::async_trait;
use board_renderer::CapturedImage;
use futures::future::BoxFuture;

use crate::error::AiResult;

/// Sends a captured whiteboard image to an AI model.
#[async_trait]
pub trait WhiteboardAnalyzer: Send + Sync {
    /// Analyze the image. May take arbitrarily long; callers never abort it.
    async fn analyze_whiteboard(&self, image: &CapturedImage) -> AiResult<()>;
}

/// Whether auto-capture should run right now.
pub trait ReadinessProbe: Send + Sync {
    /// `true` when a session is active and the AI connection is usable.
    fn is_ready(&self) -> bool;
}

/// Adapts an async closure into a [`WhiteboardAnalyzer`].
pub struct FnAnalyzer<F> {
    f: F,
}

impl<F> FnAnalyzer<F>
where
    F: Fn(CapturedImage) -> BoxFuture<'static, AiResult<()>> + Send + Sync,
{
    /// Wrap a closure returning a boxed future.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnAnalyzer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAnalyzer").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> WhiteboardAnalyzer for FnAnalyzer<F>
where
    F: Fn(CapturedImage) -> BoxFuture<'static, AiResult<()>> + Send + Sync,
{
    async fn analyze_whiteboard(&self, image: &CapturedImage) -> AiResult<()> {
        (self.f)(image.clone()).await
    }
}

/// A readiness probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticReadiness(pub bool);

impl ReadinessProbe for StaticReadiness {
    fn is_ready(&self) -> bool {
        self.0
    }
}
