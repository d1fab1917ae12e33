//! Input events for whiteboard interaction.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer pressed (pen or finger down).
    Down,
    /// Pointer released.
    Up,
    /// Pointer cancelled by the platform (e.g. palm rejection).
    Cancel,
}

/// A pointer event on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this pointer event.
    pub phase: PointerPhase,
    /// X position in surface coordinates.
    pub x: f32,
    /// Y position in surface coordinates.
    pub y: f32,
    /// Timestamp in milliseconds since the surface was created.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Pointer down at the origin, for hosts that do not track positions.
    #[must_use]
    pub const fn down() -> Self {
        Self::new(PointerPhase::Down, 0.0, 0.0, 0)
    }

    /// Pointer up at the origin.
    #[must_use]
    pub const fn up() -> Self {
        Self::new(PointerPhase::Up, 0.0, 0.0, 0)
    }

    /// Whether this event ends a gesture (up or cancel).
    #[must_use]
    pub const fn ends_gesture(&self) -> bool {
        matches!(self.phase, PointerPhase::Up | PointerPhase::Cancel)
    }
}

/// All input events the whiteboard observer can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Raw pointer event.
    Pointer(PointerEvent),

    /// The drawing surface reported a change.
    ElementsChanged {
        /// Total number of elements after the change.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_ends_gesture() {
        assert!(PointerEvent::new(PointerPhase::Cancel, 1.0, 1.0, 5).ends_gesture());
        assert!(PointerEvent::up().ends_gesture());
        assert!(!PointerEvent::down().ends_gesture());
    }

    #[test]
    fn test_input_event_wire_format() {
        let event = InputEvent::ElementsChanged { count: 3 };
        let json = serde_json::to_string(&event).expect("serialize");
        assert_eq!(json, r#"{"type":"elements_changed","data":{"count":3}}"#);

        let pointer: InputEvent = serde_json::from_str(
            r#"{"type":"pointer","data":{"phase":"down","x":1.0,"y":2.0,"timestamp_ms":9}}"#,
        )
        .expect("parse");
        assert_eq!(
            pointer,
            InputEvent::Pointer(PointerEvent::new(PointerPhase::Down, 1.0, 2.0, 9))
        );
    }
}
