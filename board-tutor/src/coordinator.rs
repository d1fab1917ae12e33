//! # Capture/Analysis Coordinator
//!
//! Runs at most one whiteboard analysis at a time. A stroke completing while
//! an analysis is in flight is remembered once (not queued) and re-run after
//! the current one finishes, so a burst of completions collapses to at most
//! two analyses.
//!
//! ```text
//!                       ┌─────────── in flight? ── yes ──► pending = true (Coalesced)
//! stroke completed ─────┤
//!                       └─ no ─► ready? ── no ──► Skipped
//!                                  │ yes
//!                                  ▼
//!                  in_flight = true, spawn driver (Started)
//!                                  │
//!                    capture ─► analyze ─► in_flight = false, take pending
//!                                  │
//!                 pending? ── yes ─► sleep(rerun_delay), go again
//! ```
//!
//! Both flags live under one lock, so a completion either lands before the
//! driver releases the run (and is picked up as a re-run) or after it (and
//! starts a fresh driver).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use board_renderer::{CaptureOptions, CapturedImage};
use tokio::sync::watch;

use crate::analyzer::{ReadinessProbe, WhiteboardAnalyzer};
use crate::capture::WhiteboardCapture;

/// Coordinator tuning.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How completed strokes are captured.
    pub capture: CaptureOptions,
    /// Settle time before re-running a coalesced completion.
    pub rerun_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            capture: CaptureOptions::high_quality(),
            rerun_delay: Duration::from_millis(50),
        }
    }
}

/// What happened to a stroke completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeDisposition {
    /// A new analysis was started.
    Started,
    /// An analysis is in flight; one re-run is scheduled after it.
    Coalesced,
    /// The session is not ready; nothing was captured.
    Skipped,
}

#[derive(Debug, Default)]
struct Flags {
    in_flight: bool,
    pending: bool,
}

/// Serializes whiteboard analyses.
pub struct AnalysisCoordinator {
    capture: WhiteboardCapture,
    analyzer: Arc<dyn WhiteboardAnalyzer>,
    readiness: Arc<dyn ReadinessProbe>,
    config: CoordinatorConfig,
    flags: Mutex<Flags>,
    runs: AtomicU64,
    last_capture: RwLock<Option<CapturedImage>>,
    last_error: RwLock<Option<String>>,
    drivers: watch::Sender<usize>,
}

impl AnalysisCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(
        capture: WhiteboardCapture,
        analyzer: Arc<dyn WhiteboardAnalyzer>,
        readiness: Arc<dyn ReadinessProbe>,
        config: CoordinatorConfig,
    ) -> Arc<Self> {
        let (drivers, _) = watch::channel(0);
        Arc::new(Self {
            capture,
            analyzer,
            readiness,
            config,
            flags: Mutex::new(Flags::default()),
            runs: AtomicU64::new(0),
            last_capture: RwLock::new(None),
            last_error: RwLock::new(None),
            drivers,
        })
    }

    /// Get the coordinator configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// React to a completed stroke. Never blocks on the analysis.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn handle_stroke_completed(self: &Arc<Self>) -> StrokeDisposition {
        let disposition = self.try_begin();
        if disposition == StrokeDisposition::Started {
            self.spawn_driver();
        }
        disposition
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gate a run for a new completion. On `Started` the caller owns the
    /// in-flight flag.
    fn try_begin(&self) -> StrokeDisposition {
        self.gate(true)
    }

    /// Gate a driver's re-run. If another driver started in the meantime its
    /// capture already covers the coalesced completion, so nothing is
    /// remembered.
    fn begin_rerun(&self) -> StrokeDisposition {
        self.gate(false)
    }

    fn gate(&self, remember: bool) -> StrokeDisposition {
        let mut flags = self.flags();
        if flags.in_flight {
            if remember {
                flags.pending = true;
                tracing::debug!("analysis in flight, re-run scheduled");
            }
            return StrokeDisposition::Coalesced;
        }

        if !self.readiness.is_ready() {
            tracing::debug!("stroke completion ignored, session not ready");
            return StrokeDisposition::Skipped;
        }

        flags.in_flight = true;
        StrokeDisposition::Started
    }

    fn spawn_driver(self: &Arc<Self>) {
        self.drivers.send_modify(|n| *n += 1);
        let guard = DriverGuard(Arc::clone(self));

        tokio::spawn(async move {
            let this = &guard.0;
            loop {
                let rerun = {
                    let flight = RunGuard::new(this);
                    this.run_once().await;
                    flight.finish()
                };

                if !rerun {
                    break;
                }
                tokio::time::sleep(this.config.rerun_delay).await;
                tracing::debug!("re-running coalesced stroke completion");
                if this.begin_rerun() != StrokeDisposition::Started {
                    break;
                }
            }
        });
    }

    async fn run_once(&self) {
        let run = self.runs.fetch_add(1, Ordering::AcqRel) + 1;

        let image = match self.capture.capture(&self.config.capture) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(run, error = %e, "whiteboard capture failed");
                self.record_error(e.to_string());
                return;
            }
        };
        *self
            .last_capture
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(image.clone());

        tracing::info!(run, width = image.width, height = image.height, "sending whiteboard for analysis");
        match self.analyzer.analyze_whiteboard(&image).await {
            Ok(()) => tracing::info!(run, "whiteboard analysis completed"),
            Err(e) => {
                tracing::error!(run, error = %e, "whiteboard analysis failed");
                self.record_error(e.to_string());
            }
        }
    }

    fn record_error(&self, message: String) {
        *self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    /// Whether an analysis is running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.flags().in_flight
    }

    /// Whether a re-run is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.flags().pending
    }

    /// Number of analysis runs started so far.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }

    /// The most recent capture, for debug display.
    #[must_use]
    pub fn last_capture(&self) -> Option<CapturedImage> {
        self.last_capture
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent capture or analysis failure.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until no analysis or re-run is outstanding.
    pub async fn wait_idle(&self) {
        let mut rx = self.drivers.subscribe();
        // The sender lives in `self`, so this cannot fail.
        let _ = rx.wait_for(|active| *active == 0).await;
    }
}

impl std::fmt::Debug for AnalysisCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCoordinator")
            .field("capture", &self.capture)
            .field("config", &self.config)
            .field("in_flight", &self.is_in_flight())
            .field("pending", &self.is_pending())
            .field("runs", &self.runs())
            .finish_non_exhaustive()
    }
}

/// Owns the in-flight flag for one run.
///
/// [`RunGuard::finish`] releases the run and claims any pending re-run under
/// the same lock. If the run unwinds instead, both flags are cleared.
struct RunGuard<'a> {
    coordinator: &'a AnalysisCoordinator,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(coordinator: &'a AnalysisCoordinator) -> Self {
        Self {
            coordinator,
            armed: true,
        }
    }

    /// Release the run. Returns whether a re-run was requested meanwhile.
    fn finish(mut self) -> bool {
        self.armed = false;
        let mut flags = self.coordinator.flags();
        flags.in_flight = false;
        std::mem::take(&mut flags.pending)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.coordinator.flags() = Flags::default();
        }
    }
}

/// Tracks a live driver task for `wait_idle`.
struct DriverGuard(Arc<AnalysisCoordinator>);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.drivers.send_modify(|n| *n = n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::StaticReadiness;
    use crate::error::{AiError, AiResult};
    use async_trait::async_trait;
    use board_renderer::{StaticSurface, SurfaceRegistry};
    use image::RgbaImage;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingAnalyzer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WhiteboardAnalyzer for CountingAnalyzer {
        async fn analyze_whiteboard(&self, _image: &CapturedImage) -> AiResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AiError::Model("no answer".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn capture() -> WhiteboardCapture {
        let registry = SurfaceRegistry::new();
        registry.register("canvas", Arc::new(StaticSurface::new(RgbaImage::new(10, 10))));
        WhiteboardCapture::new(registry)
    }

    #[test]
    fn test_finish_releases_run_and_claims_pending_together() {
        let coordinator = AnalysisCoordinator::new(
            capture(),
            Arc::new(CountingAnalyzer::default()),
            Arc::new(StaticReadiness(true)),
            CoordinatorConfig::default(),
        );

        assert_eq!(coordinator.try_begin(), StrokeDisposition::Started);
        let flight = RunGuard::new(&coordinator);
        assert_eq!(coordinator.try_begin(), StrokeDisposition::Coalesced);
        assert!(coordinator.is_pending());

        assert!(flight.finish());
        assert!(!coordinator.is_in_flight());
        assert!(!coordinator.is_pending());

        // A completion after the release starts fresh instead of being parked.
        assert_eq!(coordinator.try_begin(), StrokeDisposition::Started);
        // The finished driver yields to it without scheduling another run.
        assert_eq!(coordinator.begin_rerun(), StrokeDisposition::Coalesced);
        assert!(!coordinator.is_pending());
        assert!(!RunGuard::new(&coordinator).finish());
    }

    #[test]
    fn test_unwound_run_clears_flags() {
        let coordinator = AnalysisCoordinator::new(
            capture(),
            Arc::new(CountingAnalyzer::default()),
            Arc::new(StaticReadiness(true)),
            CoordinatorConfig::default(),
        );

        assert_eq!(coordinator.try_begin(), StrokeDisposition::Started);
        coordinator.try_begin();
        drop(RunGuard::new(&coordinator));
        assert!(!coordinator.is_in_flight());
        assert!(!coordinator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_is_skipped() {
        let analyzer = Arc::new(CountingAnalyzer::default());
        let coordinator = AnalysisCoordinator::new(
            capture(),
            analyzer.clone(),
            Arc::new(StaticReadiness(false)),
            CoordinatorConfig::default(),
        );

        assert_eq!(coordinator.handle_stroke_completed(), StrokeDisposition::Skipped);
        coordinator.wait_idle().await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(coordinator.last_capture().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_in_flight() {
        let analyzer = Arc::new(CountingAnalyzer {
            fail: true,
            ..CountingAnalyzer::default()
        });
        let coordinator = AnalysisCoordinator::new(
            capture(),
            analyzer.clone(),
            Arc::new(StaticReadiness(true)),
            CoordinatorConfig::default(),
        );

        assert_eq!(coordinator.handle_stroke_completed(), StrokeDisposition::Started);
        coordinator.wait_idle().await;
        assert!(!coordinator.is_in_flight());
        assert_eq!(coordinator.last_error().as_deref(), Some("Model error: no answer"));

        // Recoverable on the next stroke.
        assert_eq!(coordinator.handle_stroke_completed(), StrokeDisposition::Started);
        coordinator.wait_idle().await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_surface_records_error_without_analysis() {
        let analyzer = Arc::new(CountingAnalyzer::default());
        let coordinator = AnalysisCoordinator::new(
            WhiteboardCapture::new(SurfaceRegistry::new()),
            analyzer.clone(),
            Arc::new(StaticReadiness(true)),
            CoordinatorConfig::default(),
        );

        coordinator.handle_stroke_completed();
        coordinator.wait_idle().await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(coordinator
            .last_error()
            .is_some_and(|e| e.contains("Could not find whiteboard canvas")));
        assert!(!coordinator.is_in_flight());
    }
}
