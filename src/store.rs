//! In-memory element store mirroring the backing store for the open card.
//!
//! Order matters: the list order as delivered by the host breaks paint-order
//! ties between elements that share a `z_index`, so the store keeps a `Vec`
//! rather than a map.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::debug;

use crate::element::{ElementId, ElementPatch, ElementRecord};
use crate::geometry::max_z_index;

/// Ordered collection of the elements on the current canvas.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<ElementRecord>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Replace all elements with a fresh snapshot.
    pub fn replace(&mut self, elements: Vec<ElementRecord>) {
        self.elements = elements;
    }

    /// Shallow-merge `patch` into the element `id`, returning the updated record.
    ///
    /// Missing ids are ignored.
    pub fn mutate(&mut self, id: &ElementId, patch: &ElementPatch) -> Option<&ElementRecord> {
        let Some(element) = self.elements.iter_mut().find(|e| e.id == *id) else {
            debug!(%id, "mutate: element not found");
            return None;
        };
        element.apply(patch);
        Some(element)
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&ElementRecord> {
        self.elements.iter().find(|e| e.id == *id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Append an element at the end of the list.
    pub fn push(&mut self, element: ElementRecord) {
        self.elements.push(element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<ElementRecord> {
        let index = self.elements.iter().position(|e| e.id == *id)?;
        Some(self.elements.remove(index))
    }

    /// All elements in list order.
    #[must_use]
    pub fn elements(&self) -> &[ElementRecord] {
        &self.elements
    }

    /// All elements sorted for drawing: ascending `z_index`, ties in list order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&ElementRecord> {
        let mut ordered: Vec<&ElementRecord> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Highest `z_index` currently in the store, or 0 when empty.
    #[must_use]
    pub fn max_z_index(&self) -> u32 {
        max_z_index(&self.elements)
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
