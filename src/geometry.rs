//! Pure geometry helpers: snapping, clamping, duplication and gesture math.
//!
//! Nothing here touches the store or the coalescer. The interaction state
//! machine feeds session start geometry and pointer deltas in and gets the
//! next geometry out; the engine then applies it.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{EditorFlags, SnapPrecision};
use crate::consts::{
    DUPLICATE_OFFSET, FULL_TURN_DEG, MAX_CANVAS_SIZE, MIN_CANVAS_SIZE, MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH,
};
use crate::element::{ElementRecord, Geometry};
use crate::hit::ResizeAnchor;
use crate::viewport::Point;

/// Pixel size of the canvas owned by the current card side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Build a canvas size bounded to the allowed range.
    #[must_use]
    pub fn clamped(width: f64, height: f64) -> Self {
        Self {
            width: clamp_size(width, MIN_CANVAS_SIZE, MAX_CANVAS_SIZE),
            height: clamp_size(height, MIN_CANVAS_SIZE, MAX_CANVAS_SIZE),
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self { width: 600.0, height: 450.0 }
    }
}

/// Replace NaN and infinities with `fallback`.
#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Quantize `value` to the nearest multiple of the effective grid.
///
/// The effective grid is `grid_size` scaled by `precision`. A degenerate grid
/// leaves the value untouched.
#[must_use]
pub fn snap(value: f64, grid_size: f64, precision: SnapPrecision) -> f64 {
    let grid = grid_size * precision.factor();
    if !grid.is_finite() || grid <= 0.0 || !value.is_finite() {
        return value;
    }
    (value / grid).round() * grid
}

/// [`snap`] using the editor flags; a no-op when snapping is disabled.
#[must_use]
pub fn snap_if_enabled(value: f64, flags: &EditorFlags) -> f64 {
    if flags.snap_to_grid {
        snap(value, flags.grid_size, flags.snap_precision)
    } else {
        value
    }
}

/// Clamp a position so that `[position, position + size]` stays within `[0, canvas]`.
///
/// When the item is larger than the canvas the position is pinned to 0.
#[must_use]
pub fn clamp_position(position: f64, size: f64, canvas: f64) -> f64 {
    let upper = (canvas - size).max(0.0);
    finite_or(position, 0.0).clamp(0.0, upper)
}

/// Clamp a size into `[min, max]`; `max` below `min` collapses to `min`.
#[must_use]
pub fn clamp_size(size: f64, min: f64, max: f64) -> f64 {
    let max = max.max(min);
    finite_or(size, min).clamp(min, max)
}

/// Force a box to satisfy the element bounds for `canvas`.
#[must_use]
pub fn clamp_into_canvas(geometry: Geometry, canvas: CanvasSize) -> Geometry {
    let width = clamp_size(geometry.width, MIN_ELEMENT_WIDTH, canvas.width);
    let height = clamp_size(geometry.height, MIN_ELEMENT_HEIGHT, canvas.height);
    Geometry {
        x: clamp_position(geometry.x, width, canvas.width),
        y: clamp_position(geometry.y, height, canvas.height),
        width,
        height,
    }
}

/// Wrap degrees into `[0, 360)`. Non-finite input resets to 0.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(FULL_TURN_DEG);
    if wrapped >= FULL_TURN_DEG { 0.0 } else { wrapped }
}

/// Highest `z_index` in the collection, or 0 when empty.
#[must_use]
pub fn max_z_index(elements: &[ElementRecord]) -> u32 {
    elements.iter().map(|e| e.z_index).max().unwrap_or(0)
}

/// Copy of `element` offset by the duplicate offset, with a fresh id, painted
/// above everything currently at or below `current_max_z`.
#[must_use]
pub fn duplicate_offset(element: &ElementRecord, current_max_z: u32) -> ElementRecord {
    let mut copy = element.clone();
    copy.id = Uuid::new_v4();
    copy.x += DUPLICATE_OFFSET;
    copy.y += DUPLICATE_OFFSET;
    copy.z_index = current_max_z.saturating_add(1);
    copy
}

/// Bring an externally supplied record into a valid state for `canvas`.
#[must_use]
pub fn sanitize_record(mut record: ElementRecord, canvas: CanvasSize) -> ElementRecord {
    let geometry = clamp_into_canvas(record.geometry(), canvas);
    record.set_geometry(geometry);
    record.rotation = normalize_rotation(record.rotation);
    record.opacity = finite_or(record.opacity, 1.0).clamp(0.0, 1.0);
    record
}

// =============================================================================
// GESTURES
// =============================================================================

/// Position of an element dragged by `delta` from `start`.
///
/// Clamps, snaps, then clamps again so that a snap near the far edge cannot
/// push the element off the canvas.
#[must_use]
pub fn dragged(start: Geometry, delta: Point, canvas: CanvasSize, flags: &EditorFlags) -> Geometry {
    let axis = |origin: f64, d: f64, size: f64, limit: f64| {
        let pos = clamp_position(origin + finite_or(d, 0.0), size, limit);
        clamp_position(snap_if_enabled(pos, flags), size, limit)
    };
    Geometry {
        x: axis(start.x, delta.x, start.width, canvas.width),
        y: axis(start.y, delta.y, start.height, canvas.height),
        ..start
    }
}

/// Geometry of an element resized from `start` by dragging `anchor` by `delta`.
///
/// Edges that the anchor does not move stay fixed. A moving right/bottom edge
/// changes the size, which is bounded by the minimum element size and by the
/// room left before the canvas edge, then snapped. A moving left/top edge is
/// snapped as a position and bounded so the opposite edge stays put and the
/// minimum size holds.
#[must_use]
pub fn resized(
    start: Geometry,
    anchor: ResizeAnchor,
    delta: Point,
    canvas: CanvasSize,
    flags: &EditorFlags,
) -> Geometry {
    let dx = finite_or(delta.x, 0.0);
    let dy = finite_or(delta.y, 0.0);
    let (x, width) = resize_axis(
        start.x,
        start.width,
        dx,
        anchor.moves_left(),
        anchor.moves_right(),
        MIN_ELEMENT_WIDTH,
        canvas.width,
        flags,
    );
    let (y, height) = resize_axis(
        start.y,
        start.height,
        dy,
        anchor.moves_top(),
        anchor.moves_bottom(),
        MIN_ELEMENT_HEIGHT,
        canvas.height,
        flags,
    );
    Geometry { x, y, width, height }
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn resize_axis(
    pos: f64,
    size: f64,
    delta: f64,
    moves_start: bool,
    moves_end: bool,
    min: f64,
    limit: f64,
    flags: &EditorFlags,
) -> (f64, f64) {
    if moves_end {
        let max = limit - pos;
        let grown = clamp_size(size + delta, min, max);
        return (pos, clamp_size(snap_if_enabled(grown, flags), min, max));
    }
    if moves_start {
        let end = pos + size;
        let upper = (end - min).max(0.0);
        let moved = snap_if_enabled(pos + delta, flags).clamp(0.0, upper);
        return (moved, end - moved);
    }
    (pos, size)
}

/// Canvas size after dragging the canvas grip by `delta` from `start`.
#[must_use]
pub fn resized_canvas(start: CanvasSize, delta: Point, flags: &EditorFlags) -> CanvasSize {
    let axis = |size: f64, d: f64| {
        let grown = clamp_size(size + finite_or(d, 0.0), MIN_CANVAS_SIZE, MAX_CANVAS_SIZE);
        clamp_size(snap_if_enabled(grown, flags), MIN_CANVAS_SIZE, MAX_CANVAS_SIZE)
    };
    CanvasSize { width: axis(start.width, delta.x), height: axis(start.height, delta.y) }
}
