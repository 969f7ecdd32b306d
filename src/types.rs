//! Core identity types for spark-vdom.
//!
//! Everything in the runtime is addressed by small copyable ids rather than
//! references: snapshots by [`NodeId`], live surface objects by
//! [`SurfaceHandle`], component instances by [`InstanceId`] and scheduled
//! frame work by [`FrameToken`]. The registries in [`crate::engine`] map
//! between them.

use std::fmt;

// =============================================================================
// Node Id
// =============================================================================

/// Stable identity stamped onto every snapshot at construction.
///
/// Two snapshots are "the same node" by reference exactly when their ids
/// are equal. Ids are never reused within a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Raw numeric value (for logs and tests).
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// =============================================================================
// Surface Handle
// =============================================================================

/// Opaque reference to a live object owned by a [`crate::surface::Surface`].
///
/// The surface decides what the number means; the runtime only stores and
/// passes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

// =============================================================================
// Instance Id
// =============================================================================

/// Identity of a live component instance.
///
/// Unlike snapshots, an instance keeps its id across renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

// =============================================================================
// Frame Token
// =============================================================================

/// Cancellation token for a callback queued on the frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub(crate) u64);

impl fmt::Display for FrameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(NodeId(3).to_string(), "n3");
        assert_eq!(SurfaceHandle(7).to_string(), "h7");
        assert_eq!(InstanceId(1).to_string(), "i1");
        assert_eq!(FrameToken(9).to_string(), "f9");
    }

    #[test]
    fn test_ids_order_by_value() {
        assert!(NodeId(1) < NodeId(2));
        assert_eq!(NodeId(4).get(), 4);
    }
}
