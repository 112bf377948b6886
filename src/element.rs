//! Element model: the records placed on a card's canvas and sparse updates to them.
//!
//! An element is a positioned, sized, rotatable box with an opaque content
//! payload. The engine only ever reads and writes the geometry fields,
//! `z_index` and `layout_constraints`; `payload` (and, in practice, `opacity`)
//! belong to the per-kind renderers in the host.
//!
//! Records arrive from the backing store as flat camelCase JSON and are
//! mirrored in [`crate::store::ElementStore`]. Local edits are expressed as
//! [`ElementPatch`]es, which are both applied to the store and accumulated by
//! the coalescer for persistence.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::constraints::LayoutConstraint;
use crate::viewport::Point;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// The content variant of an element.
///
/// The engine treats the variant as opaque; it is carried so that hosts can
/// route rendering and so that new elements can be requested by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Text,
    Image,
    Audio,
    Video,
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    Drawing,
    DeckEmbed,
    Shape,
    Youtube,
}

/// Axis-aligned box in canvas-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `pt` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// An element as stored in the backing store and mirrored in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    /// Stable identifier assigned at creation.
    pub id: ElementId,
    /// Content variant.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Width in canvas pixels.
    pub width: f64,
    /// Height in canvas pixels.
    pub height: f64,
    /// Clockwise rotation in degrees around the center, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Paint and interaction order; higher values are drawn above lower ones.
    #[serde(default, deserialize_with = "deserialize_z_index")]
    pub z_index: u32,
    /// Opacity in `[0, 1]`, owned by the renderer.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Constraints re-applied whenever the canvas is resized.
    #[serde(default)]
    pub layout_constraints: Vec<LayoutConstraint>,
    /// Kind-specific content (text, media URLs, quiz options, ...).
    #[serde(default)]
    pub payload: serde_json::Value,
}

fn default_opacity() -> f64 {
    1.0
}

/// Accept any JSON number for `zIndex`, clamping it into `u32` range.
fn deserialize_z_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_z_index(raw))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_z_index(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        raw as u32
    }
}

impl ElementRecord {
    /// Create a record with a fresh id and an empty payload.
    #[must_use]
    pub fn new(kind: ElementKind, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            rotation: 0.0,
            z_index: 0,
            opacity: default_opacity(),
            layout_constraints: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// Current bounding box.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.width, self.height)
    }

    /// Overwrite the bounding box.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.x = geometry.x;
        self.y = geometry.y;
        self.width = geometry.width;
        self.height = geometry.height;
    }

    /// Shallow-merge a patch into this record.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(r) = patch.rotation {
            self.rotation = r;
        }
        if let Some(z) = patch.z_index {
            self.z_index = z;
        }
        if let Some(o) = patch.opacity {
            self.opacity = o;
        }
        if let Some(ref constraints) = patch.layout_constraints {
            self.layout_constraints.clone_from(constraints);
        }
        if let Some(ref payload) = patch.payload {
            self.payload.clone_from(payload);
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_constraints: Option<Vec<LayoutConstraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that sets a full bounding box.
    #[must_use]
    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            ..Self::default()
        }
    }

    /// Patch carrying only the fields of `after` that differ from `before`.
    #[must_use]
    pub fn geometry_diff(before: Geometry, after: Geometry) -> Self {
        let changed = |a: f64, b: f64| if (a - b).abs() > f64::EPSILON { Some(b) } else { None };
        Self {
            x: changed(before.x, after.x),
            y: changed(before.y, after.y),
            width: changed(before.width, after.width),
            height: changed(before.height, after.height),
            ..Self::default()
        }
    }

    /// Patch that sets the stacking order.
    #[must_use]
    pub fn z_index(z_index: u32) -> Self {
        Self { z_index: Some(z_index), ..Self::default() }
    }

    /// Patch that replaces the constraint list.
    #[must_use]
    pub fn constraints(constraints: Vec<LayoutConstraint>) -> Self {
        Self { layout_constraints: Some(constraints), ..Self::default() }
    }

    /// Fold a later patch into this one; fields present in `later` win.
    pub fn merge(&mut self, later: ElementPatch) {
        if later.x.is_some() {
            self.x = later.x;
        }
        if later.y.is_some() {
            self.y = later.y;
        }
        if later.width.is_some() {
            self.width = later.width;
        }
        if later.height.is_some() {
            self.height = later.height;
        }
        if later.rotation.is_some() {
            self.rotation = later.rotation;
        }
        if later.z_index.is_some() {
            self.z_index = later.z_index;
        }
        if later.opacity.is_some() {
            self.opacity = later.opacity;
        }
        if later.layout_constraints.is_some() {
            self.layout_constraints = later.layout_constraints;
        }
        if later.payload.is_some() {
            self.payload = later.payload;
        }
    }

    /// Returns `true` if the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.rotation.is_none()
            && self.z_index.is_none()
            && self.opacity.is_none()
            && self.layout_constraints.is_none()
            && self.payload.is_none()
    }
}
