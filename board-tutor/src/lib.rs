//! # Mathboard Tutor
//!
//! Connects the whiteboard to an AI tutor: captures the board when a stroke
//! completes, coordinates analyses so only one runs at a time, and owns the
//! tutor session with its provider.
//!
//! ## Auto-analysis
//!
//! ```text
//! Whiteboard input (counts + pointer events, in order)
//!         │
//!         └──► StrokeDetector ──completed──► AnalysisCoordinator
//!                                                             │
//!                                      ReadinessProbe ◄───────┤ (TutorSession)
//!                                                             ▼
//!                              WhiteboardCapture ──image──► WhiteboardAnalyzer
//! ```
//!
//! ## Modules
//!
//! - `capture` - Locate the surface, encode, analyze
//! - `coordinator` - One analysis at a time, coalesced re-runs
//! - `provider` - AI provider capability set
//! - `session` - Host-owned tutor session
//! - `realtime` - Ephemeral credential client
//! - `workspace` - Auto-analysis task

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod capture;
pub mod coordinator;
pub mod error;
pub mod provider;
pub mod realtime;
pub mod session;
pub mod workspace;

pub use analyzer::{FnAnalyzer, ReadinessProbe, StaticReadiness, WhiteboardAnalyzer};
pub use capture::WhiteboardCapture;
pub use coordinator::{AnalysisCoordinator, CoordinatorConfig, StrokeDisposition};
pub use error::{AiError, AiResult, CaptureError, CaptureResult, TutorError, TutorResult};
pub use provider::{AiProvider, ProviderConfig, ProviderKind, ProviderState, Voice};
pub use realtime::{EphemeralSession, EphemeralSessionClient, SessionRequest};
pub use session::{ReadinessGate, TutorSession};
pub use workspace::{spawn_auto_analysis, AutoAnalysis};
