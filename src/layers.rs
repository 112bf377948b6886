//! Z-order operations.
//!
//! Each operation resolves to an absolute `z_index` for a single element, so
//! the resulting patch can be coalesced and replayed safely. `z_index` values
//! are not unique; ties paint in list order.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementPatch, ElementRecord};

/// A layer change requested from the toolbar or context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerOp {
    /// One step up.
    Raise,
    /// One step down, never below zero.
    Lower,
    /// Above every other element.
    BringToFront,
    /// Bottom of the stack.
    SendToBack,
}

impl LayerOp {
    /// New `z_index` for an element currently at `current` among `elements`.
    #[must_use]
    pub fn target_z(self, id: &ElementId, current: u32, elements: &[ElementRecord]) -> u32 {
        match self {
            Self::Raise => current.saturating_add(1),
            Self::Lower => current.saturating_sub(1),
            Self::BringToFront => {
                let max_others = elements
                    .iter()
                    .filter(|e| e.id != *id)
                    .map(|e| e.z_index)
                    .max();
                match max_others {
                    Some(top) if top >= current => elements
                        .iter()
                        .map(|e| e.z_index)
                        .max()
                        .unwrap_or(current)
                        .saturating_add(1),
                    _ => current,
                }
            }
            Self::SendToBack => 0,
        }
    }
}

/// Patch applying `op` to element `id`, or `None` if it is missing or already in place.
#[must_use]
pub fn layer_patch(op: LayerOp, id: &ElementId, elements: &[ElementRecord]) -> Option<ElementPatch> {
    let element = elements.iter().find(|e| e.id == *id)?;
    let target = op.target_z(id, element.z_index, elements);
    (target != element.z_index).then(|| ElementPatch::z_index(target))
}
