//! Error types for the reconciliation runtime.

use thiserror::Error;

use crate::types::{InstanceId, NodeId, SurfaceHandle};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Everything that can go wrong while diffing, mounting or updating.
///
/// None of these are retried. `NotMounted` and `TargetNotFound` are usage
/// errors surfaced to the caller; the rest are broken invariants and mean a
/// bug in the caller or in a [`crate::surface::Surface`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// `set_state`/`set_props` on an instance that is not (or no longer) mounted.
    #[error("usage error: component instance {0} is not mounted")]
    NotMounted(InstanceId),

    /// The mount target does not exist on the surface.
    #[error("mount target not found: {0}")]
    TargetNotFound(String),

    /// The identity map has no surface handle for this snapshot.
    #[error("snapshot {0} has no surface handle")]
    Untracked(NodeId),

    /// Props handed to a component could not be downcast to its props type.
    #[error("props type mismatch for component `{0}`")]
    PropsMismatch(&'static str),

    /// A surface was asked to operate on a handle it does not know.
    #[error("unknown surface handle {0}")]
    UnknownHandle(SurfaceHandle),
}

impl ReconcileError {
    /// True for errors caused by calling the API in the wrong lifecycle state
    /// or with a bad target, as opposed to internal invariant violations.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NotMounted(_) | Self::TargetNotFound(_))
    }
}
