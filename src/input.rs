//! Input model: buttons, modifier keys, cursors and the interaction session.
//!
//! `InputState` is the gesture being tracked between pointer-down and
//! pointer-up. Each active variant carries the pointer position and the
//! geometry captured at pointer-down; every move recomputes the result from
//! that baseline instead of accumulating frame-to-frame deltas, so rounding
//! from snapping never drifts.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::element::{ElementId, Geometry};
use crate::geometry::CanvasSize;
use crate::hit::ResizeAnchor;
use crate::viewport::Point;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch / pen contact).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"c"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison for letter keys (`"c"` vs `"C"` with shift).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Pointer cursor the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    Default,
    Move,
    ResizeNs,
    ResizeEw,
    ResizeNesw,
    ResizeNwse,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::ResizeNs => "ns-resize",
            Self::ResizeEw => "ew-resize",
            Self::ResizeNesw => "nesw-resize",
            Self::ResizeNwse => "nwse-resize",
        }
    }
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
    /// Element whose settings popover is open.
    pub settings_open_for: Option<ElementId>,
    /// Element whose text content is being edited in place.
    pub editing_id: Option<ElementId>,
    /// A host text field (outside the canvas) has keyboard focus.
    pub text_focus: bool,
}

impl UiState {
    /// Whether keystrokes are currently going to a text field.
    #[must_use]
    pub fn typing(&self) -> bool {
        self.text_focus || self.editing_id.is_some()
    }
}

/// The active interaction session.
///
/// At most one exists at a time; a pointer-down while a session is active is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element across the canvas.
    Dragging {
        /// Id of the element being dragged.
        id: ElementId,
        /// Canvas-space pointer position at pointer-down.
        start_pointer: Point,
        /// Element geometry at pointer-down.
        start_geometry: Geometry,
    },
    /// The user is resizing an element by one of its eight handles.
    Resizing {
        /// Id of the element being resized.
        id: ElementId,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Canvas-space pointer position at pointer-down.
        start_pointer: Point,
        /// Element geometry at pointer-down.
        start_geometry: Geometry,
    },
    /// The user is dragging the canvas grip to change the canvas size.
    CanvasResizing {
        /// Canvas-space pointer position at pointer-down.
        start_pointer: Point,
        /// Canvas size at pointer-down.
        start_canvas: CanvasSize,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Element targeted by the current gesture, if any.
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
            Self::Idle | Self::CanvasResizing { .. } => None,
        }
    }
}
