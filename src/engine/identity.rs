//! Identity Map - snapshot id to surface handle.
//!
//! The side table that tells the diff which live surface object a snapshot
//! stands for. Keys are [`NodeId`]s, so an entry never keeps a snapshot
//! alive; entries for discarded subtrees are removed explicitly.
//!
//! When the diff decides that an old and a new snapshot are the same logical
//! node, the handle is moved (not copied) to the new id with [`replace`].

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{ReconcileError, Result};
use crate::types::{NodeId, SurfaceHandle};

// =============================================================================
// Identity State
// =============================================================================

thread_local! {
    /// Map snapshot id to the surface handle backing it.
    static HANDLES: RefCell<HashMap<NodeId, SurfaceHandle>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Operations
// =============================================================================

/// Register `handle` for `node`, overwriting any previous entry.
pub fn set(node: NodeId, handle: SurfaceHandle) {
    HANDLES.with(|map| {
        map.borrow_mut().insert(node, handle);
    })
}

/// Surface handle for `node`, if tracked.
pub fn get(node: NodeId) -> Option<SurfaceHandle> {
    HANDLES.with(|map| map.borrow().get(&node).copied())
}

/// Move the handle of `old` to `new` and return it.
///
/// Fails with [`ReconcileError::Untracked`] if `old` has no entry; callers
/// only move identity when reuse is certain.
pub fn replace(old: NodeId, new: NodeId) -> Result<SurfaceHandle> {
    HANDLES.with(|map| {
        let mut map = map.borrow_mut();
        let handle = map.remove(&old).ok_or(ReconcileError::Untracked(old))?;
        map.insert(new, handle);
        Ok(handle)
    })
}

/// Drop the entry for `node`. Returns the handle it had.
pub fn remove(node: NodeId) -> Option<SurfaceHandle> {
    HANDLES.with(|map| map.borrow_mut().remove(&node))
}

/// Like [`get`], but a missing entry is an error.
pub fn require(node: NodeId) -> Result<SurfaceHandle> {
    get(node).ok_or(ReconcileError::Untracked(node))
}

/// Number of tracked snapshots.
pub fn tracked_count() -> usize {
    HANDLES.with(|map| map.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Clear all entries (for testing).
pub fn reset_identity() {
    HANDLES.with(|map| map.borrow_mut().clear());
}
