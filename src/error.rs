//! Renderer error types

use glam::UVec3;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors reported by explicit renderer operations (bakes, resize).
///
/// Per-frame rendering never returns these; pass failures are logged and the
/// frame carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Invalid probe grid resolution {0}")]
    InvalidGrid(UVec3),
    #[error("No {0} probes configured")]
    NoProbes(&'static str),
}
