//! Whiteboard elements - what the user draws.
//!
//! The stroke detector never looks inside an element; only the renderer does.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BoardError, BoardResult};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sampled point of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Pen pressure 0.0-1.0 (1.0 when the device reports none).
    #[serde(default = "full_pressure")]
    pub pressure: f32,
}

fn full_pressure() -> f32 {
    1.0
}

impl StrokePoint {
    /// Create a point with full pressure.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: 1.0,
        }
    }
}

/// Stroke styling shared by all element kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Stroke color as hex (`#rrggbb`).
    pub stroke_color: String,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Optional fill color as hex.
    pub fill_color: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: "#1e1e1e".to_string(),
            stroke_width: 2.0,
            fill_color: None,
        }
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// A freehand pen stroke.
    Freedraw {
        /// Sampled points in drawing order.
        points: Vec<StrokePoint>,
    },

    /// A straight line segment.
    Line {
        /// Start point.
        start: StrokePoint,
        /// End point.
        end: StrokePoint,
    },

    /// An axis-aligned rectangle.
    Rectangle {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
    },

    /// An ellipse inscribed in the given bounds.
    Ellipse {
        /// Left edge of the bounds.
        x: f32,
        /// Top edge of the bounds.
        y: f32,
        /// Width of the bounds.
        width: f32,
        /// Height of the bounds.
        height: f32,
    },
}

/// A whiteboard element with content and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Stroke styling.
    #[serde(default)]
    pub style: Style,
}

impl Element {
    /// Create a new element with the given kind and default style.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            style: Style::default(),
        }
    }

    /// Create a freehand stroke from `(x, y)` pairs.
    #[must_use]
    pub fn freedraw(points: &[(f32, f32)]) -> Self {
        Self::new(ElementKind::Freedraw {
            points: points.iter().map(|&(x, y)| StrokePoint::new(x, y)).collect(),
        })
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Check that the element can be drawn.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidElement`] for empty strokes, non-positive
    /// stroke widths or degenerate shapes.
    pub fn validate(&self) -> BoardResult<()> {
        if !(self.style.stroke_width.is_finite() && self.style.stroke_width > 0.0) {
            return Err(BoardError::InvalidElement(format!(
                "stroke width must be positive, got {}",
                self.style.stroke_width
            )));
        }
        match &self.kind {
            ElementKind::Freedraw { points } if points.is_empty() => Err(
                BoardError::InvalidElement("freedraw stroke has no points".to_string()),
            ),
            ElementKind::Rectangle { width, height, .. }
            | ElementKind::Ellipse { width, height, .. }
                if *width <= 0.0 || *height <= 0.0 =>
            {
                Err(BoardError::InvalidElement(format!(
                    "shape bounds must be positive, got {width}x{height}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freedraw_builder() {
        let element = Element::freedraw(&[(1.0, 2.0), (3.0, 4.0)]);
        match &element.kind {
            ElementKind::Freedraw { points } => {
                assert_eq!(points.len(), 2);
                assert!((points[1].pressure - 1.0).abs() < f32::EPSILON);
            }
            other => panic!("expected freedraw, got {other:?}"),
        }
        assert!(element.validate().is_ok());
    }

    #[test]
    fn test_empty_stroke_is_invalid() {
        let element = Element::freedraw(&[]);
        assert!(matches!(
            element.validate(),
            Err(BoardError::InvalidElement(_))
        ));
    }

    #[test]
    fn test_degenerate_rectangle_is_invalid() {
        let element = Element::new(ElementKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 10.0,
        });
        assert!(element.validate().is_err());
    }

    #[test]
    fn test_element_json_shape() {
        let element = Element::freedraw(&[(5.0, 6.0)]);
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["kind"]["type"], "freedraw");
        assert_eq!(json["kind"]["data"]["points"][0]["x"], 5.0);
    }

    #[test]
    fn test_missing_pressure_defaults_to_full() {
        let point: StrokePoint = serde_json::from_str(r#"{"x":1.0,"y":2.0}"#).expect("parse");
        assert!((point.pressure - 1.0).abs() < f32::EPSILON);
    }
}
