//! Layout constraints: declarative rules re-applied when the canvas is resized.
//!
//! DESIGN
//! ======
//! A resize is resolved in two phases. First every element's geometry is
//! captured as it was before the resize. Then each element's new geometry is
//! computed purely from that snapshot and the old/new canvas sizes, so an
//! anchor always follows its target's *pre-resize* position and anchors never
//! cascade within one pass. The caller commits all resulting patches at once.
//!
//! Within one element, size constraints (`scale-with-canvas`) are evaluated
//! before position constraints (`pin-to-edge`, then `anchor-to-element`), so
//! a right-pinned element that also scales keeps its right margin at its new
//! width. Finally every element, constrained or not, is clamped into the new
//! canvas.

#[cfg(test)]
#[path = "constraints_test.rs"]
mod constraints_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{ElementId, ElementPatch, ElementRecord, Geometry};
use crate::geometry::{CanvasSize, clamp_into_canvas};

/// Canvas edge (or center line) an element can be pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
    CenterX,
    CenterY,
}

/// One layout rule attached to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayoutConstraint {
    /// Hold the distance to `edge` (or the offset from the center line) fixed.
    PinToEdge { edge: Edge },
    /// Scale width and/or height with the canvas.
    ///
    /// `reference_width` / `reference_height` are the canvas size the current
    /// element size corresponds to; they advance each time the rule is applied.
    /// Missing or zero references fall back to the pre-resize canvas size.
    #[serde(rename_all = "camelCase")]
    ScaleWithCanvas {
        scale_x: bool,
        scale_y: bool,
        #[serde(default)]
        reference_width: f64,
        #[serde(default)]
        reference_height: f64,
    },
    /// Keep the top-left corner at a fixed offset from another element's.
    #[serde(rename_all = "camelCase")]
    AnchorToElement { target_id: ElementId, offset_x: f64, offset_y: f64 },
}

/// Identifies which existing constraint a new one replaces, or which one to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConstraintKind {
    PinToEdge { edge: Edge },
    ScaleWithCanvas,
    AnchorToElement,
}

impl LayoutConstraint {
    /// Scale rule referenced to the current canvas size.
    #[must_use]
    pub fn scale_with(canvas: CanvasSize, scale_x: bool, scale_y: bool) -> Self {
        Self::ScaleWithCanvas {
            scale_x,
            scale_y,
            reference_width: canvas.width,
            reference_height: canvas.height,
        }
    }

    /// Anchor rule capturing the current offset between `element` and `target`.
    #[must_use]
    pub fn anchor_between(element: &Geometry, target_id: ElementId, target: &Geometry) -> Self {
        Self::AnchorToElement {
            target_id,
            offset_x: element.x - target.x,
            offset_y: element.y - target.y,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::PinToEdge { edge } => ConstraintKind::PinToEdge { edge: *edge },
            Self::ScaleWithCanvas { .. } => ConstraintKind::ScaleWithCanvas,
            Self::AnchorToElement { .. } => ConstraintKind::AnchorToElement,
        }
    }
}

/// `existing` with `added` appended, after removing any constraint it replaces.
///
/// Pins replace a pin on the same edge only; scale and anchor rules replace
/// any prior rule of their type.
#[must_use]
pub fn with_constraint(existing: &[LayoutConstraint], added: LayoutConstraint) -> Vec<LayoutConstraint> {
    let kind = added.kind();
    let mut out: Vec<LayoutConstraint> = existing.iter().filter(|c| c.kind() != kind).cloned().collect();
    out.push(added);
    out
}

/// `existing` without constraints of `kind`.
#[must_use]
pub fn without_constraint(existing: &[LayoutConstraint], kind: ConstraintKind) -> Vec<LayoutConstraint> {
    existing.iter().filter(|c| c.kind() != kind).cloned().collect()
}

/// Compute the patches that bring every element in line with a canvas resize
/// from `old` to `new`. Elements that need no change are omitted.
#[must_use]
pub fn resolve_canvas_resize(
    elements: &[ElementRecord],
    old: CanvasSize,
    new: CanvasSize,
) -> Vec<(ElementId, ElementPatch)> {
    // PHASE: SNAPSHOT
    let snapshot: HashMap<ElementId, Geometry> = elements.iter().map(|e| (e.id, e.geometry())).collect();

    // PHASE: COMPUTE
    let mut patches = Vec::new();
    let mut constrained = 0usize;
    for element in elements {
        let before = element.geometry();
        let (computed, constraints) = if element.layout_constraints.is_empty() {
            (before, None)
        } else {
            constrained += 1;
            apply_constraints(element, &snapshot, old, new)
        };
        let after = clamp_into_canvas(computed, new);

        let mut patch = ElementPatch::geometry_diff(before, after);
        patch.layout_constraints = constraints;
        if !patch.is_empty() {
            patches.push((element.id, patch));
        }
    }

    debug!(
        constrained,
        changed = patches.len(),
        old_width = old.width,
        old_height = old.height,
        new_width = new.width,
        new_height = new.height,
        "resolved canvas resize"
    );
    patches
}

/// Geometry for one element under its constraints, plus the updated
/// constraint list when a scale reference advanced.
fn apply_constraints(
    element: &ElementRecord,
    snapshot: &HashMap<ElementId, Geometry>,
    old: CanvasSize,
    new: CanvasSize,
) -> (Geometry, Option<Vec<LayoutConstraint>>) {
    let orig = element.geometry();
    let mut g = orig;
    let mut updated = element.layout_constraints.clone();
    let mut references_moved = false;

    // Size first.
    for constraint in &mut updated {
        if let LayoutConstraint::ScaleWithCanvas { scale_x, scale_y, reference_width, reference_height } = constraint {
            let ref_w = usable_reference(*reference_width, old.width);
            let ref_h = usable_reference(*reference_height, old.height);
            if *scale_x {
                g.width = orig.width * new.width / ref_w;
            }
            if *scale_y {
                g.height = orig.height * new.height / ref_h;
            }
            if (*reference_width - new.width).abs() > f64::EPSILON
                || (*reference_height - new.height).abs() > f64::EPSILON
            {
                *reference_width = new.width;
                *reference_height = new.height;
                references_moved = true;
            }
        }
    }

    // Then pins.
    let pinned = |edge: Edge| {
        element
            .layout_constraints
            .iter()
            .any(|c| *c == LayoutConstraint::PinToEdge { edge })
    };
    let right_margin = old.width - orig.right();
    let bottom_margin = old.height - orig.bottom();

    match (pinned(Edge::Left), pinned(Edge::Right)) {
        (true, true) => g.width = new.width - right_margin - orig.x,
        (false, true) => g.x = new.width - right_margin - g.width,
        _ => {}
    }
    match (pinned(Edge::Top), pinned(Edge::Bottom)) {
        (true, true) => g.height = new.height - bottom_margin - orig.y,
        (false, true) => g.y = new.height - bottom_margin - g.height,
        _ => {}
    }
    if pinned(Edge::CenterX) {
        let offset = orig.center().x - old.width / 2.0;
        g.x = new.width / 2.0 + offset - g.width / 2.0;
    }
    if pinned(Edge::CenterY) {
        let offset = orig.center().y - old.height / 2.0;
        g.y = new.height / 2.0 + offset - g.height / 2.0;
    }

    // Then anchors, against the pre-resize snapshot.
    for constraint in &element.layout_constraints {
        if let LayoutConstraint::AnchorToElement { target_id, offset_x, offset_y } = constraint {
            match snapshot.get(target_id) {
                Some(target) => {
                    g.x = target.x + offset_x;
                    g.y = target.y + offset_y;
                }
                None => debug!(id = %element.id, target = %target_id, "anchor target missing; skipping"),
            }
        }
    }

    (g, references_moved.then_some(updated))
}

fn usable_reference(reference: f64, fallback: f64) -> f64 {
    if reference.is_finite() && reference > 0.0 { reference } else { fallback }
}
