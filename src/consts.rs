//! Shared numeric constants for the editing engine.

use std::time::Duration;

// ── Element bounds ──────────────────────────────────────────────

/// Smallest width an element may be resized to, in canvas pixels.
pub const MIN_ELEMENT_WIDTH: f64 = 50.0;

/// Smallest height an element may be resized to, in canvas pixels.
pub const MIN_ELEMENT_HEIGHT: f64 = 30.0;

// ── Canvas bounds ───────────────────────────────────────────────

/// Smallest canvas edge length in pixels.
pub const MIN_CANVAS_SIZE: f64 = 200.0;

/// Largest canvas edge length in pixels.
pub const MAX_CANVAS_SIZE: f64 = 2000.0;

// ── Editing ─────────────────────────────────────────────────────

/// Offset applied to both axes when pasting or duplicating an element.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Trailing debounce before pending element updates are written out.
pub const FLUSH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Full turn in degrees; rotations wrap modulo this value.
pub const FULL_TURN_DEG: f64 = 360.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Screen-space size of the canvas resize grip in the bottom-right corner.
pub const CANVAS_GRIP_PX: f64 = 16.0;
