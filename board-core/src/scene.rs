//! Scene holding the whiteboard elements in drawing order.

use serde::{Deserialize, Serialize};

use crate::{BoardError, BoardResult, Element, ElementId};

/// A scene containing all whiteboard elements, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Elements in the order they were drawn.
    elements: Vec<Element>,
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
    /// Background color as hex.
    pub background: String,
}

impl Scene {
    /// Create a new empty scene with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: Vec::new(),
            viewport_width: width,
            viewport_height: height,
            background: "#ffffff".to_string(),
        }
    }

    /// Append an element to the scene.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Remove an element from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: &ElementId) -> BoardResult<Element> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == *id)
            .ok_or_else(|| BoardError::ElementNotFound(id.to_string()))?;
        Ok(self.elements.remove(index))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get all elements in drawing order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Set the viewport dimensions.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BoardResult<String> {
        serde_json::to_string(self).map_err(BoardError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        serde_json::from_str(json).map_err(BoardError::Serialization)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800.0, 500.0)
    }
}
