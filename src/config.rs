//! Editor feature flags supplied by the host.
//!
//! The host passes these alongside the element list whenever a card is opened
//! or the user flips a toolbar toggle. Every field has a default so a partial
//! JSON object (or `{}`) is a valid configuration.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_SHOW_GRID: bool = true;
const DEFAULT_SNAP_TO_GRID: bool = false;
const DEFAULT_GRID_SIZE: f64 = 20.0;
const DEFAULT_SHOW_BORDER: bool = true;

/// How finely the grid quantizes coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapPrecision {
    /// Twice the configured grid size.
    Coarse,
    /// Exactly the configured grid size.
    #[default]
    Medium,
    /// Half the configured grid size.
    Fine,
}

impl SnapPrecision {
    /// Multiplier applied to the configured grid size.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Coarse => 2.0,
            Self::Medium => 1.0,
            Self::Fine => 0.5,
        }
    }
}

/// Feature flags controlling grid display and snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorFlags {
    /// Draw the grid behind the elements.
    pub show_grid: bool,
    /// Quantize drag, resize and canvas-resize results to the grid.
    pub snap_to_grid: bool,
    /// Base grid spacing in canvas pixels.
    pub grid_size: f64,
    /// Scale applied to `grid_size` when snapping.
    pub snap_precision: SnapPrecision,
    /// Draw the canvas border.
    pub show_border: bool,
}

impl Default for EditorFlags {
    fn default() -> Self {
        Self {
            show_grid: DEFAULT_SHOW_GRID,
            snap_to_grid: DEFAULT_SNAP_TO_GRID,
            grid_size: DEFAULT_GRID_SIZE,
            snap_precision: SnapPrecision::default(),
            show_border: DEFAULT_SHOW_BORDER,
        }
    }
}

impl EditorFlags {
    /// Parse flags from the host's JSON props, sanitizing the grid size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if `raw` is not a JSON object of the
    /// expected shape.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let flags: Self = serde_json::from_str(raw)?;
        Ok(flags.sanitized())
    }

    /// Replace a non-finite or non-positive grid size with the default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            self.grid_size = DEFAULT_GRID_SIZE;
        }
        self
    }

    /// Grid spacing actually used for snapping.
    #[must_use]
    pub fn effective_grid(&self) -> f64 {
        self.grid_size * self.snap_precision.factor()
    }
}
