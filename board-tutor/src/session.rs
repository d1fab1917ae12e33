//! # Tutor Session
//!
//! The one mutable session object the host owns. It holds the selected
//! provider, tracks whether the tutor session is active, mirrors provider
//! state to subscribers, and answers the readiness question the
//! auto-analysis pipeline asks before every capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use board_core::SessionState;
use board_renderer::CapturedImage;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::analyzer::{ReadinessProbe, WhiteboardAnalyzer};
use crate::error::{AiResult, TutorError, TutorResult};
use crate::provider::AiProvider;

/// What must hold, beyond an active session, before auto-capture runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadinessGate {
    /// The provider reports a live connection.
    #[default]
    Connected,
    /// Connected and the realtime event channel is open.
    ChannelOpen,
}

/// Host-owned tutor session.
pub struct TutorSession {
    provider: RwLock<Option<Arc<dyn AiProvider>>>,
    active: AtomicBool,
    gate: ReadinessGate,
    state_tx: Arc<watch::Sender<SessionState>>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl TutorSession {
    /// Create a session without a provider.
    #[must_use]
    pub fn new(gate: ReadinessGate) -> Self {
        let (state_tx, _) = watch::channel(SessionState::default());
        Self {
            provider: RwLock::new(None),
            active: AtomicBool::new(false),
            gate,
            state_tx: Arc::new(state_tx),
            forwarder: Mutex::new(None),
        }
    }

    /// The readiness gate in use.
    #[must_use]
    pub fn gate(&self) -> ReadinessGate {
        self.gate
    }

    /// Select the provider. A connected previous provider is disconnected
    /// first. Must be called from within a Tokio runtime.
    pub async fn set_provider(&self, provider: Arc<dyn AiProvider>) {
        if let Some(previous) = self.current_provider() {
            if previous.state().is_connected() {
                if let Err(e) = previous.disconnect().await {
                    tracing::warn!(provider = previous.name(), error = %e, "failed to disconnect previous provider");
                }
            }
        }

        tracing::info!(provider = provider.name(), kind = %provider.kind(), "provider selected");
        let mut rx = provider.subscribe();
        self.state_tx.send_replace(rx.borrow_and_update().clone());

        let tx = Arc::clone(&self.state_tx);
        let forwarder = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                tx.send_replace(state);
            }
        });

        *self.provider.write().unwrap_or_else(PoisonError::into_inner) = Some(provider);
        if let Some(old) = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(forwarder)
        {
            old.abort();
        }
    }

    /// The selected provider, if any.
    #[must_use]
    pub fn current_provider(&self) -> Option<Arc<dyn AiProvider>> {
        self.provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_provider(&self) -> TutorResult<Arc<dyn AiProvider>> {
        self.current_provider().ok_or(TutorError::NoProvider)
    }

    /// Start the tutor session: analyze the uploaded problem first (if any),
    /// then connect. On failure the session is left inactive.
    ///
    /// Returns the problem analysis when an image was given.
    ///
    /// # Errors
    ///
    /// [`TutorError::NoProvider`] without a provider, otherwise the first
    /// provider failure.
    pub async fn start(&self, problem_image: Option<&str>) -> TutorResult<Option<String>> {
        let provider = self.require_provider()?;
        self.active.store(true, Ordering::Release);

        let result = async {
            let analysis = match problem_image {
                Some(image) => {
                    tracing::info!("analyzing math problem image");
                    Some(provider.analyze_math_problem(image).await?)
                }
                None => None,
            };
            provider.connect().await?;
            Ok::<_, TutorError>(analysis)
        }
        .await;

        match &result {
            Ok(_) => tracing::info!(provider = provider.name(), "tutor session started"),
            Err(e) => {
                tracing::error!(error = %e, "failed to start tutor session");
                self.active.store(false, Ordering::Release);
            }
        }
        result
    }

    /// End the tutor session: stop the microphone and disconnect.
    ///
    /// # Errors
    ///
    /// Returns the provider's disconnect failure. The session is inactive
    /// afterwards either way.
    pub async fn end(&self) -> TutorResult<()> {
        self.active.store(false, Ordering::Release);
        let Some(provider) = self.current_provider() else {
            return Ok(());
        };
        provider.stop_voice();
        provider.disconnect().await?;
        tracing::info!("tutor session ended");
        Ok(())
    }

    /// Whether the tutor session has been started and not ended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Connect the provider.
    ///
    /// # Errors
    ///
    /// [`TutorError::NoProvider`] or the provider failure.
    pub async fn connect(&self) -> TutorResult<()> {
        Ok(self.require_provider()?.connect().await?)
    }

    /// Disconnect the provider. No-op without one.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    pub async fn disconnect(&self) -> TutorResult<()> {
        match self.current_provider() {
            Some(provider) => Ok(provider.disconnect().await?),
            None => Ok(()),
        }
    }

    /// Analyze an uploaded problem image.
    ///
    /// # Errors
    ///
    /// [`TutorError::NoProvider`] or the provider failure.
    pub async fn analyze_math_problem(&self, image_data_url: &str) -> TutorResult<String> {
        Ok(self
            .require_provider()?
            .analyze_math_problem(image_data_url)
            .await?)
    }

    /// Start streaming the microphone.
    ///
    /// # Errors
    ///
    /// [`TutorError::NoProvider`] or the provider failure.
    pub async fn start_voice(&self) -> TutorResult<()> {
        Ok(self.require_provider()?.start_voice().await?)
    }

    /// Stop streaming the microphone. No-op without a provider.
    pub fn stop_voice(&self) {
        if let Some(provider) = self.current_provider() {
            provider.stop_voice();
        }
    }

    /// Current provider state, or the default state without a provider.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.current_provider()
            .map(|p| p.state())
            .unwrap_or_default()
    }

    /// Subscribe to provider state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }
}

impl Default for TutorSession {
    fn default() -> Self {
        Self::new(ReadinessGate::default())
    }
}

impl std::fmt::Debug for TutorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorSession")
            .field(
                "provider",
                &self.current_provider().map(|p| p.name().to_string()),
            )
            .field("active", &self.is_active())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl Drop for TutorSession {
    fn drop(&mut self) {
        if let Some(forwarder) = self
            .forwarder
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            forwarder.abort();
        }
    }
}

impl ReadinessProbe for TutorSession {
    fn is_ready(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        let state = self.state();
        match self.gate {
            ReadinessGate::Connected => state.is_connected(),
            ReadinessGate::ChannelOpen => state.is_connected() && state.channel_open,
        }
    }
}

#[async_trait]
impl WhiteboardAnalyzer for TutorSession {
    async fn analyze_whiteboard(&self, image: &CapturedImage) -> AiResult<()> {
        let provider = self.require_provider()?;
        provider.analyze_whiteboard(image).await
    }
}
