//! Mount API - attach a snapshot tree under a named target and drive it.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{mount, run_frames, MemorySurface};
//!
//! let mut surface = MemorySurface::new();
//! surface.add_target("app");
//!
//! let mut handle = mount(&mut surface, "app", app(()))?;
//!
//! // Host loop: one tick per display refresh.
//! run_frames(&mut surface, 16)?;
//!
//! // Parent-driven update of the whole tree.
//! handle.update(&mut surface, app(()))?;
//!
//! handle.unmount(&mut surface)?;
//! ```

use std::rc::Rc;

use crate::engine::identity;
use crate::engine::scheduler::{self, pending_frames};
use crate::error::{ReconcileError, Result};
use crate::reconcile::{diff, discard};
use crate::surface::Surface;
use crate::types::SurfaceHandle;
use crate::vdom::Node;
use super::apply::{apply_operation, materialize};

// =============================================================================
// Mount Handle
// =============================================================================

/// A mounted root.
///
/// Holds the current root snapshot and the target it hangs under. Dropping
/// the handle leaves the tree mounted; call [`MountHandle::unmount`] to tear
/// it down.
#[derive(Debug)]
pub struct MountHandle {
    root: Rc<Node>,
    target: SurfaceHandle,
}

impl MountHandle {
    /// Current root snapshot.
    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// Mount target the tree is attached to.
    pub fn target(&self) -> SurfaceHandle {
        self.target
    }

    /// Surface node currently backing the root.
    ///
    /// Follows replacements made by component re-renders.
    pub fn handle(&self) -> Option<SurfaceHandle> {
        identity::get(self.root.id())
    }

    /// Diff the current root against `next` and apply the result.
    pub fn update(&mut self, surface: &mut dyn Surface, next: Rc<Node>) -> Result<()> {
        let operation = diff(&self.root, &next)?;
        tracing::debug!(
            root = %next.id(),
            kind = ?operation.kind(),
            operations = operation.count(),
            "root update"
        );
        self.root = next;
        apply_operation(surface, operation)
    }

    /// Detach the tree and unmount every component in it.
    pub fn unmount(self, surface: &mut dyn Surface) -> Result<()> {
        let handle = identity::require(self.root.id())?;
        discard(&self.root);
        surface.remove_child(handle)?;
        tracing::debug!(target_handle = %self.target, "root unmounted");
        Ok(())
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Materialize `root` and append it under the target named `target`.
///
/// Component `did_mount` hooks run on the next [`tick`].
pub fn mount(surface: &mut dyn Surface, target: &str, root: Rc<Node>) -> Result<MountHandle> {
    let parent = surface
        .find_target(target)
        .ok_or_else(|| ReconcileError::TargetNotFound(target.to_string()))?;

    let handle = materialize(surface, &root)?;
    surface.append_child(parent, handle)?;
    tracing::debug!(target, root = %root.id(), %handle, "mounted");

    Ok(MountHandle { root, target: parent })
}

// =============================================================================
// Frame Loop
// =============================================================================

/// Advance one frame. See [`scheduler::tick`].
pub fn tick(surface: &mut dyn Surface) -> Result<usize> {
    scheduler::tick(surface)
}

/// Tick until nothing is queued, or `max_frames` frames have run.
///
/// Returns the number of frames run.
pub fn run_frames(surface: &mut dyn Surface, max_frames: usize) -> Result<usize> {
    let mut frames = 0;
    while frames < max_frames && pending_frames() > 0 {
        tick(surface)?;
        frames += 1;
    }
    Ok(frames)
}
