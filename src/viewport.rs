#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    /// This vector rotated by `degrees` (clockwise on screen, y down).
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Point {
        if degrees.abs() < f64::EPSILON {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point { x: self.x * cos - self.y * sin, y: self.x * sin + self.y * cos }
    }
}

/// Placement of the canvas inside the host page.
///
/// `origin_x` / `origin_y` are the screen coordinates of the canvas's
/// top-left corner in CSS pixels. `scale` is the display scale of the canvas
/// (1.0 = one canvas pixel per CSS pixel), used when the host fits a large
/// card into a smaller editor pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin_x: 0.0, origin_y: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    /// Build a viewport, falling back to a scale of 1.0 for degenerate input.
    #[must_use]
    pub fn new(origin_x: f64, origin_y: f64, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { origin_x, origin_y, scale }
    }

    /// Convert a screen-space point (CSS pixels) to canvas-local coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x) / self.scale,
            y: (screen.y - self.origin_y) / self.scale,
        }
    }

    /// Convert a canvas-local point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x * self.scale + self.origin_x,
            y: canvas.y * self.scale + self.origin_y,
        }
    }

    /// Convert a screen-space distance (pixels) to canvas-space distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
