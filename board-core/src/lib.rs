//! # Mathboard Core
//!
//! Core whiteboard logic for the math tutor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 board-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Input                   │
//! │  - Elements      │  - Pointer down/up       │
//! │  - Whiteboard    │  - Element count changes │
//! ├─────────────────────────────────────────────┤
//! │  Stroke detector │  Session state           │
//! │  - Debounce      │  - Connection status     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod element;
pub mod error;
pub mod event;
pub mod scene;
pub mod state;
pub mod stroke;

pub use board::Whiteboard;
pub use element::{Element, ElementId, ElementKind, StrokePoint, Style};
pub use error::{BoardError, BoardResult};
pub use event::{InputEvent, PointerEvent, PointerPhase};
pub use scene::Scene;
pub use state::{ConnectionStatus, SessionState};
pub use stroke::{DebounceConfig, StrokeCompleted, StrokeDetector};

/// Board core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
