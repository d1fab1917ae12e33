//! # Stroke Completion Detection
//!
//! Turns raw "elements changed" notifications plus pointer down/up events
//! into a single debounced "stroke completed" signal.
//!
//! ```text
//! pointer down ──► in_progress = false, cancel pending timer
//! count grows  ──► in_progress = true
//! pointer up   ──► if in_progress: arm timer(delay), in_progress = false
//! timer fires  ──► StrokeCompleted
//! ```
//!
//! With the default config, rapid down/up sequences keep re-arming the timer,
//! so the signal fires only once the user pauses for the full delay. The
//! [`DebounceConfig::immediate`] config instead gives every finished stroke
//! its own timer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::{InputEvent, PointerEvent, PointerPhase};

/// Debounce tuning for stroke completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after pointer up before the stroke counts as complete.
    pub delay: Duration,
    /// Whether a new pointer down cancels a pending completion.
    pub cancel_on_pointer_down: bool,
    /// Whether arming a timer on pointer up replaces the one already pending.
    /// When false, each finished stroke fires on its own.
    pub replace_pending: bool,
}

impl DebounceConfig {
    /// Short fixed delay that never gets cancelled: every finished stroke
    /// fires once, 100 ms after pointer up.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            delay: Duration::from_millis(100),
            cancel_on_pointer_down: false,
            replace_pending: false,
        }
    }

    /// Builder-style delay override.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            cancel_on_pointer_down: true,
            replace_pending: true,
        }
    }
}

/// Emitted once per debounced stroke completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeCompleted {
    /// Monotonic sequence number of the armed timer that fired.
    pub sequence: u64,
    /// Element count observed when the timer was armed.
    pub element_count: usize,
}

/// Stroke completion detector for one drawing surface.
///
/// Owns its pending debounce timers (at most one unless
/// [`DebounceConfig::replace_pending`] is off). Dropping the detector cancels
/// them.
#[derive(Debug)]
pub struct StrokeDetector {
    config: DebounceConfig,
    last_count: usize,
    in_progress: bool,
    timers: Vec<JoinHandle<()>>,
    next_sequence: u64,
    completed_tx: mpsc::UnboundedSender<StrokeCompleted>,
}

impl StrokeDetector {
    /// Create a detector that sends completions on `completed_tx`.
    #[must_use]
    pub fn new(config: DebounceConfig, completed_tx: mpsc::UnboundedSender<StrokeCompleted>) -> Self {
        Self {
            config,
            last_count: 0,
            in_progress: false,
            timers: Vec::new(),
            next_sequence: 0,
            completed_tx,
        }
    }

    /// Create a detector together with its completion receiver.
    #[must_use]
    pub fn channel(config: DebounceConfig) -> (Self, mpsc::UnboundedReceiver<StrokeCompleted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(config, tx), rx)
    }

    /// Seed the last seen element count without marking a stroke, e.g. when
    /// attaching to a board that already has content.
    #[must_use]
    pub fn with_initial_count(mut self, count: usize) -> Self {
        self.last_count = count;
        self
    }

    /// Get the debounce configuration.
    #[must_use]
    pub const fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// Whether a stroke has been detected since the last pointer reset.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Element count seen by the last change notification.
    #[must_use]
    pub const fn last_count(&self) -> usize {
        self.last_count
    }

    /// Whether a completion timer is armed and has not fired yet.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.timers.iter().any(|t| !t.is_finished())
    }

    /// The drawing surface reported a change with `count` total elements.
    pub fn on_canvas_changed(&mut self, count: usize) {
        if count > self.last_count {
            if !self.in_progress {
                tracing::debug!(count, "drawing stroke detected");
            }
            self.in_progress = true;
        }
        self.last_count = count;
    }

    /// A fresh touch supersedes the previous stroke's pending completion.
    pub fn on_pointer_down(&mut self) {
        self.in_progress = false;
        if self.config.cancel_on_pointer_down {
            self.cancel_timer();
        }
    }

    /// Arm the completion timer if a stroke was drawn. Returns whether a timer
    /// was armed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_pointer_up(&mut self) -> bool {
        if !self.in_progress {
            return false;
        }
        self.in_progress = false;
        if self.config.replace_pending {
            self.cancel_timer();
        } else {
            self.timers.retain(|t| !t.is_finished());
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let completed = StrokeCompleted {
            sequence,
            element_count: self.last_count,
        };
        let delay = self.config.delay;
        let tx = self.completed_tx.clone();

        tracing::debug!(sequence, delay_ms = delay.as_millis(), "stroke completion armed");
        self.timers.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(sequence, "stroke completed");
            // Receiver gone means nobody is listening any more.
            let _ = tx.send(completed);
        }));
        true
    }

    /// Dispatch a pointer event. Cancel is treated like up.
    pub fn on_pointer(&mut self, event: &PointerEvent) {
        match event.phase {
            PointerPhase::Down => self.on_pointer_down(),
            PointerPhase::Up | PointerPhase::Cancel => {
                self.on_pointer_up();
            }
        }
    }

    /// Dispatch any whiteboard input event.
    pub fn on_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => self.on_pointer(pointer),
            InputEvent::ElementsChanged { count } => self.on_canvas_changed(*count),
        }
    }

    fn cancel_timer(&mut self) {
        for timer in self.timers.drain(..) {
            if !timer.is_finished() {
                tracing::debug!("pending stroke completion cancelled");
            }
            timer.abort();
        }
    }
}

impl Drop for StrokeDetector {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
