//! Error types.
//!
//! Geometry problems and references to missing elements never surface as
//! errors: they are clamped or ignored and logged. What remains is the
//! persistence boundary, host configuration and the wasm JSON boundary.

use serde::Serialize;

use crate::element::{ElementId, ElementPatch};

/// The external update collaborator rejected a write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("element update rejected: {0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// One element update that could not be delivered during a flush.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpdate {
    /// Element the update was addressed to.
    pub id: ElementId,
    /// Accumulated fields that were dropped from the pending map.
    pub fields: ElementPatch,
    /// Collaborator-supplied reason.
    pub reason: String,
}

/// A flush delivered some updates but at least one was rejected.
///
/// The failed entries have already been removed from the pending map; they
/// are handed back here so the host can decide whether to re-queue them.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{} of {attempted} element updates failed", .failed.len())]
pub struct FlushError {
    /// Number of updates attempted in this flush.
    pub attempted: usize,
    /// Updates the collaborator rejected.
    pub failed: Vec<FailedUpdate>,
}

/// Host-supplied feature flags could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid editor flags: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed data crossing the wasm boundary.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("invalid element list: {0}")]
    Elements(#[source] serde_json::Error),
    #[error("invalid constraint: {0}")]
    Constraint(#[source] serde_json::Error),
    #[error("invalid element patch: {0}")]
    Patch(#[source] serde_json::Error),
    #[error("unknown {what}: {value:?}")]
    Keyword { what: &'static str, value: String },
    #[error("invalid element id: {0}")]
    ElementId(#[from] uuid::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
