//! Tutor session state.

use serde::{Deserialize, Serialize};

/// Connection status to the AI voice/vision service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Not connected.
    #[default]
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Fully connected and operational.
    Connected,
    /// Connection error.
    Error,
}

/// Observable state of a tutor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Connection status to the AI service.
    pub connection: ConnectionStatus,
    /// Whether the realtime event channel is open (voice data channel).
    pub channel_open: bool,
    /// Whether the microphone is streaming.
    pub is_recording: bool,
    /// Last error reported by the provider.
    pub error: Option<String>,
    /// Analysis of the uploaded math problem, kept as tutor reference.
    pub math_problem_analysis: Option<String>,
}

impl SessionState {
    /// Check if connected to the AI backend.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }

    /// Check if a connection attempt is running.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.connection == ConnectionStatus::Connecting
    }

    /// Record an error and move to the error status.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.connection = ConnectionStatus::Error;
        self.channel_open = false;
    }

    /// Clear the last error without touching the connection status.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Reset to the disconnected state, keeping the problem analysis.
    pub fn reset_connection(&mut self) {
        self.connection = ConnectionStatus::Disconnected;
        self.channel_open = false;
        self.is_recording = false;
    }
}
