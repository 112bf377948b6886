//! Single-slot clipboard and element duplication.
//!
//! A copy stores the element by value, so later edits to the source do not
//! leak into what gets pasted. Paste and duplicate both go through
//! [`duplicate_offset`]: fresh id, shifted by the duplicate offset, and painted
//! above every element currently on the canvas.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use crate::element::ElementRecord;
use crate::geometry::{CanvasSize, clamp_into_canvas, duplicate_offset, max_z_index};

/// Holds at most one copied element; a later copy replaces the earlier one.
#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<ElementRecord>,
}

impl Clipboard {
    #[must_use]
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Snapshot `element` into the slot.
    pub fn copy(&mut self, element: &ElementRecord) {
        self.slot = Some(element.clone());
    }

    /// The copied element, if any.
    #[must_use]
    pub fn contents(&self) -> Option<&ElementRecord> {
        self.slot.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Build the element a paste would add to `elements`, or `None` when empty.
    #[must_use]
    pub fn paste(&self, elements: &[ElementRecord], canvas: CanvasSize) -> Option<ElementRecord> {
        self.slot.as_ref().map(|source| duplicate(source, elements, canvas))
    }
}

/// Offset copy of `source` placed above everything in `elements` and kept on the canvas.
#[must_use]
pub fn duplicate(source: &ElementRecord, elements: &[ElementRecord], canvas: CanvasSize) -> ElementRecord {
    let mut copy = duplicate_offset(source, max_z_index(elements));
    copy.set_geometry(clamp_into_canvas(copy.geometry(), canvas));
    copy
}
