//! # AI Provider Capabilities
//!
//! A provider is anything that can hold a voice/vision session with a
//! model: connect, look at images, and talk. Vendors implement
//! [`AiProvider`]; the session picks one by explicit configuration.
//!
//! [`ProviderState`] is the shared state cell implementations use to
//! publish their [`SessionState`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use board_core::SessionState;
use board_renderer::CapturedImage;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AiResult;

/// Which vendor integration backs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// OpenAI realtime voice session.
    OpenaiRealtime,
    /// OpenAI tutor (vision + voice) session.
    OpenaiTutor,
    /// Google Gemini session.
    Gemini,
}

impl ProviderKind {
    /// Stable identifier, e.g. `openai-realtime`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenaiRealtime => "openai-realtime",
            Self::OpenaiTutor => "openai-tutor",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai-realtime" => Ok(Self::OpenaiRealtime),
            "openai-tutor" => Ok(Self::OpenaiTutor),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown provider type: {other}")),
        }
    }
}

/// Voices offered by the realtime voice API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Alloy (default).
    #[default]
    Alloy,
    /// Ash.
    Ash,
    /// Ballad.
    Ballad,
    /// Coral.
    Coral,
    /// Echo.
    Echo,
    /// Sage.
    Sage,
    /// Shimmer.
    Shimmer,
    /// Verse.
    Verse,
}

impl Voice {
    /// Every supported voice.
    pub const ALL: [Self; 8] = [
        Self::Alloy,
        Self::Ash,
        Self::Ballad,
        Self::Coral,
        Self::Echo,
        Self::Sage,
        Self::Shimmer,
        Self::Verse,
    ];

    /// Wire name, e.g. `alloy`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unsupported voice: {s}"))
    }
}

/// Provider selection and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Vendor integration.
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// API key (or ephemeral credential).
    pub api_key: String,
    /// Voice for spoken replies.
    #[serde(default)]
    pub voice: Voice,
    /// Model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Create a config with the default voice and model.
    #[must_use]
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            voice: Voice::default(),
            model: None,
        }
    }

    /// Set the voice.
    #[must_use]
    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("voice", &self.voice)
            .field("model", &self.model)
            .finish()
    }
}

/// The capability set of an AI tutor backend.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Vendor integration behind this provider.
    fn kind(&self) -> ProviderKind;

    /// Provider name for logging/display.
    fn name(&self) -> &str;

    /// Open the voice/vision session.
    async fn connect(&self) -> AiResult<()>;

    /// Close the session.
    async fn disconnect(&self) -> AiResult<()>;

    /// Analyze an uploaded problem image (data URL) and return the analysis
    /// text the tutor keeps as reference.
    async fn analyze_math_problem(&self, image_data_url: &str) -> AiResult<String>;

    /// Send the student's current work for feedback.
    async fn analyze_whiteboard(&self, image: &CapturedImage) -> AiResult<()>;

    /// Start streaming the microphone.
    async fn start_voice(&self) -> AiResult<()>;

    /// Stop streaming the microphone.
    fn stop_voice(&self);

    /// Subscribe to state changes.
    fn subscribe(&self) -> watch::Receiver<SessionState>;

    /// Current state.
    fn state(&self) -> SessionState {
        self.subscribe().borrow().clone()
    }
}

/// Observable session state for provider implementations.
#[derive(Debug)]
pub struct ProviderState {
    tx: watch::Sender<SessionState>,
}

impl ProviderState {
    /// Start in the disconnected state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Subscribe to changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Mutate the state and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.tx.send_modify(f);
    }

    /// Replace the whole state.
    pub fn set(&self, state: SessionState) {
        self.tx.send_replace(state);
    }

    /// Record an error.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "provider error");
        self.update(|s| s.set_error(message));
    }

    /// Clear the last error.
    pub fn clear_error(&self) {
        self.update(SessionState::clear_error);
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}
