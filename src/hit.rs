#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{CANVAS_GRIP_PX, HANDLE_RADIUS_PX};
use crate::element::{ElementId, ElementRecord, Geometry};
use crate::geometry::CanvasSize;
use crate::input::Cursor;
use crate::store::ElementStore;
use crate::viewport::{Point, Viewport};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::Nw,
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
    ];

    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Handle position on the unrotated box.
    #[must_use]
    pub fn position(self, g: &Geometry) -> Point {
        let cx = g.x + g.width / 2.0;
        let cy = g.y + g.height / 2.0;
        let x = if self.moves_left() {
            g.x
        } else if self.moves_right() {
            g.right()
        } else {
            cx
        };
        let y = if self.moves_top() {
            g.y
        } else if self.moves_bottom() {
            g.bottom()
        } else {
            cy
        };
        Point::new(x, y)
    }

    /// Resize cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> Cursor {
        match self {
            Self::N | Self::S => Cursor::ResizeNs,
            Self::E | Self::W => Cursor::ResizeEw,
            Self::Ne | Self::Sw => Cursor::ResizeNesw,
            Self::Nw | Self::Se => Cursor::ResizeNwse,
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// An element body or one of the selected element's handles.
    Element { id: ElementId, part: HitPart },
    /// The canvas resize grip in the bottom-right corner.
    CanvasGrip,
}

/// Rotate `pt` into the unrotated frame of an element.
fn to_local(pt: Point, element: &ElementRecord) -> Point {
    let c = element.geometry().center();
    let local = pt.delta_from(c).rotated(-element.rotation);
    Point::new(c.x + local.x, c.y + local.y)
}

/// Test what is under the canvas-space point `pt`.
///
/// Priority: handles of the selected element, then the canvas grip, then
/// element bodies from the top of the paint order down.
#[must_use]
pub fn hit_test(
    pt: Point,
    store: &ElementStore,
    viewport: &Viewport,
    canvas: CanvasSize,
    selected_id: Option<ElementId>,
) -> Option<Hit> {
    let slop = viewport.screen_dist_to_canvas(HANDLE_RADIUS_PX);

    if let Some(selected) = selected_id.and_then(|id| store.get(&id)) {
        let local = to_local(pt, selected);
        let g = selected.geometry();
        for anchor in ResizeAnchor::ALL {
            let h = anchor.position(&g);
            if (local.x - h.x).abs() <= slop && (local.y - h.y).abs() <= slop {
                return Some(Hit::Element { id: selected.id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    let grip = viewport.screen_dist_to_canvas(CANVAS_GRIP_PX);
    if pt.x >= canvas.width - grip
        && pt.x <= canvas.width + slop
        && pt.y >= canvas.height - grip
        && pt.y <= canvas.height + slop
    {
        return Some(Hit::CanvasGrip);
    }

    store
        .paint_order()
        .into_iter()
        .rev()
        .find(|e| e.geometry().contains(to_local(pt, e)))
        .map(|e| Hit::Element { id: e.id, part: HitPart::Body })
}
