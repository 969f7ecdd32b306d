//! Runtime Engine - the thread-local tables behind reconciliation.
//!
//! - [`identity`] - snapshot id → surface handle
//! - [`instances`] - component instances, slots and lifecycle
//! - [`scheduler`] - frame clock for deferred re-renders and hooks
//!
//! # Threading
//!
//! All state is thread-local and single-writer: a diff and the apply that
//! follows it run to completion before the next frame callback fires, so no
//! locking is needed. Each thread (and so each test) gets its own runtime.

pub mod identity;
pub mod instances;
pub mod scheduler;

pub use instances::{instance_of, Lifecycle};
pub use scheduler::{cancel_frame, pending_frames, request_frame, tick, FrameCallback};
