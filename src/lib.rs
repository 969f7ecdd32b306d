//! # spark-vdom
//!
//! A minimal UI reconciliation runtime.
//!
//! Application code describes the UI as immutable snapshot trees. The runtime
//! diffs each new tree against the previous one, turns the difference into an
//! [`Operation`] tree, and applies it to a [`Surface`] (the retained,
//! mutable on-screen objects). Stateful [`Component`]s own subtrees and
//! schedule their own re-renders on a frame clock.
//!
//! ## Architecture
//!
//! ```text
//! render() ─▶ Rc<Node> ─▶ diff(old, new) ─▶ Operation ─▶ apply_operation ─▶ Surface
//!                             │
//!                             ├─ identity map   (NodeId → SurfaceHandle)
//!                             └─ instance table (NodeId → InstanceId)
//!
//! Link::set_state ─▶ request_frame ─▶ tick ─▶ re-render + patch ─▶ did_update (next tick)
//! ```
//!
//! All runtime state is thread-local. A tree mounted on one thread must be
//! updated, ticked and unmounted on that thread.
//!
//! ## Modules
//!
//! - [`types`] - Identity newtypes (NodeId, SurfaceHandle, InstanceId, FrameToken)
//! - [`vdom`] - Snapshot node model and builders
//! - [`reconcile`] - Diff engine and operation model
//! - [`component`] - Component contract, Context, Link
//! - [`engine`] - Identity map, instance table, frame clock
//! - [`surface`] - Surface trait and the in-memory surface
//! - [`pipeline`] - Materialize, apply, mount, settings

pub mod component;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod surface;
pub mod types;
pub mod vdom;

// Re-export commonly used items
pub use types::*;

pub use error::{ReconcileError, Result};

pub use vdom::{
    component, diff_attrs, element, text, AttrDelta, AttrValue, Attributes, Child, ComponentKind,
    ComponentRef, Element, Event, Listener, Node, NodeKind,
};

pub use component::{Component, Context, Link};

pub use reconcile::{diff, diff_children, MountCallback, Operation, OperationKind};

pub use engine::{
    cancel_frame, instance_of, pending_frames, request_frame, FrameCallback, Lifecycle,
};

pub use surface::{MemorySurface, Surface};

pub use pipeline::{
    apply_operation, materialize, mount, reset_settings, run_frames, set_settings, settings, tick,
    MountHandle, Settings,
};

/// Clear every thread-local table: identity map, instance table, frame
/// queue and settings. Hooks do not run.
///
/// For tests that share a thread between cases.
pub fn reset_runtime() {
    engine::identity::reset_identity();
    engine::instances::reset_instances();
    engine::scheduler::reset_scheduler();
    pipeline::reset_settings();
}
