//! Shared fixtures for tutor integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use board_core::{ConnectionStatus, SessionState};
use board_renderer::{CapturedImage, RasterSurface, RenderResult, StaticSurface, SurfaceRegistry};
use board_tutor::{
    AiError, AiProvider, AiResult, ProviderKind, ProviderState, ReadinessProbe,
    WhiteboardAnalyzer, WhiteboardCapture,
};
use image::RgbaImage;
use tokio::sync::{watch, Semaphore};
use tokio::time::Instant;

/// Yield enough times for spawned tasks to make progress.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// A capture over a single blank 40x30 surface mounted as `canvas`.
#[allow(dead_code)]
pub fn blank_capture() -> WhiteboardCapture {
    let registry = SurfaceRegistry::new();
    registry.register(
        "canvas",
        Arc::new(StaticSurface::new(RgbaImage::new(40, 30))),
    );
    WhiteboardCapture::new(registry)
}

/// Surface that counts how often it is read.
#[derive(Default)]
pub struct CountingSurface {
    pub snapshots: AtomicUsize,
}

impl RasterSurface for CountingSurface {
    fn dimensions(&self) -> (u32, u32) {
        (10, 10)
    }

    fn snapshot(&self) -> RenderResult<RgbaImage> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        Ok(RgbaImage::new(10, 10))
    }
}

/// Analyzer that blocks each call until a permit is released.
pub struct GatedAnalyzer {
    gate: Semaphore,
    calls: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
}

#[allow(dead_code)]
impl GatedAnalyzer {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            starts: Mutex::new(Vec::new()),
        }
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> Vec<Instant> {
        self.starts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl WhiteboardAnalyzer for GatedAnalyzer {
    async fn analyze_whiteboard(&self, _image: &CapturedImage) -> AiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().expect("lock").push(Instant::now());
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AiError::Connection(e.to_string()))?;
        permit.forget();
        Ok(())
    }
}

/// Analyzer that takes `delay` and then succeeds or fails.
pub struct SlowAnalyzer {
    pub delay: Duration,
    pub fail_with: Option<AiError>,
    pub calls: AtomicUsize,
    pub finished: AtomicBool,
    pub last_mime: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl SlowAnalyzer {
    pub fn ok(delay: Duration) -> Self {
        Self {
            delay,
            fail_with: None,
            calls: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            last_mime: Mutex::new(None),
        }
    }

    pub fn failing(delay: Duration, error: AiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::ok(delay)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhiteboardAnalyzer for SlowAnalyzer {
    async fn analyze_whiteboard(&self, image: &CapturedImage) -> AiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime.lock().expect("lock") = Some(image.mime_type.clone());
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Readiness flag tests can flip.
#[derive(Default)]
pub struct ToggleReadiness(pub AtomicBool);

#[allow(dead_code)]
impl ToggleReadiness {
    pub fn new(ready: bool) -> Self {
        Self(AtomicBool::new(ready))
    }

    pub fn set(&self, ready: bool) {
        self.0.store(ready, Ordering::SeqCst);
    }
}

impl ReadinessProbe for ToggleReadiness {
    fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory provider recording every call.
pub struct MockProvider {
    pub state: ProviderState,
    pub calls: Mutex<Vec<&'static str>>,
    pub fail_connect: bool,
    pub opens_channel: bool,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: ProviderState::new(),
            calls: Mutex::new(Vec::new()),
            fail_connect: false,
            opens_channel: true,
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenaiTutor
    }

    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> AiResult<()> {
        self.record("connect");
        self.state.update(|s| s.connection = ConnectionStatus::Connecting);
        if self.fail_connect {
            self.state.set_error("microphone denied");
            return Err(AiError::Connection("microphone denied".to_string()));
        }
        let channel_open = self.opens_channel;
        self.state.update(|s| {
            s.connection = ConnectionStatus::Connected;
            s.channel_open = channel_open;
        });
        Ok(())
    }

    async fn disconnect(&self) -> AiResult<()> {
        self.record("disconnect");
        self.state.update(SessionState::reset_connection);
        Ok(())
    }

    async fn analyze_math_problem(&self, image_data_url: &str) -> AiResult<String> {
        self.record("analyze_math_problem");
        let analysis = format!("problem image of {} chars", image_data_url.len());
        let stored = analysis.clone();
        self.state
            .update(|s| s.math_problem_analysis = Some(stored));
        Ok(analysis)
    }

    async fn analyze_whiteboard(&self, _image: &CapturedImage) -> AiResult<()> {
        self.record("analyze_whiteboard");
        Ok(())
    }

    async fn start_voice(&self) -> AiResult<()> {
        self.record("start_voice");
        self.state.update(|s| s.is_recording = true);
        Ok(())
    }

    fn stop_voice(&self) {
        self.record("stop_voice");
        self.state.update(|s| s.is_recording = false);
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
