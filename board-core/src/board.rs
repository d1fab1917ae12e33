//! Shared whiteboard handle.
//!
//! The host UI owns the drawing surface and mutates it; everything else
//! reads. Scene mutations and pointer events from the host are published on
//! one ordered input stream so observers (the stroke detector) see them in
//! the order they happened.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::{BoardResult, Element, ElementId, InputEvent, PointerEvent, Scene};

/// Buffered input events per subscriber before it starts lagging.
pub const INPUT_CAPACITY: usize = 1024;

/// A cloneable handle to a live whiteboard scene.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    scene: Arc<RwLock<Scene>>,
    input_tx: broadcast::Sender<InputEvent>,
}

impl Whiteboard {
    /// Create an empty whiteboard with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_scene(Scene::new(width, height))
    }

    /// Wrap an existing scene.
    #[must_use]
    pub fn from_scene(scene: Scene) -> Self {
        let (input_tx, _) = broadcast::channel(INPUT_CAPACITY);
        Self {
            scene: Arc::new(RwLock::new(scene)),
            input_tx,
        }
    }

    /// Subscribe to the input stream.
    ///
    /// Every scene mutation yields an [`InputEvent::ElementsChanged`] with the
    /// total count, and every [`Whiteboard::dispatch_pointer`] call yields an
    /// [`InputEvent::Pointer`], interleaved in the order they happened. Only
    /// events published after this call are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<InputEvent> {
        self.input_tx.subscribe()
    }

    /// Publish a pointer event from the host's input layer.
    pub fn dispatch_pointer(&self, event: PointerEvent) {
        let _ = self.input_tx.send(InputEvent::Pointer(event));
    }

    /// Append an element and notify observers.
    ///
    /// # Errors
    ///
    /// Returns an error if the element fails validation.
    pub fn add_element(&self, element: Element) -> BoardResult<ElementId> {
        element.validate()?;
        Ok(self.update(|scene| scene.add_element(element)))
    }

    /// Remove an element and notify observers.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&self, id: &ElementId) -> BoardResult<Element> {
        self.update(|scene| scene.remove_element(id))
    }

    /// Remove every element and notify observers.
    pub fn clear(&self) {
        self.update(Scene::clear);
    }

    /// Mutate the scene through a closure, then publish the element count.
    ///
    /// Observers are notified even when the count did not change, mirroring a
    /// drawing surface that reports every edit. The notification is sent
    /// before the write lock is released, so subscribers see counts in
    /// mutation order.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Scene) -> R,
    {
        let mut scene = self.scene.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut scene);
        let count = scene.element_count();
        // No subscribers is fine.
        let _ = self.input_tx.send(InputEvent::ElementsChanged { count });
        result
    }

    /// Current number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.scene
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .element_count()
    }

    /// Clone the current scene for read-only work such as rasterization.
    #[must_use]
    pub fn snapshot(&self) -> Scene {
        self.scene
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::from_scene(Scene::default())
    }
}
