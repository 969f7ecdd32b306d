//! Pipeline - from snapshots to surface mutations.
//!
//! - [`apply`] - materialize snapshots, interpret operation trees
//! - [`mount`] - root mount, [`MountHandle`], frame loop
//! - [`settings`] - per-thread runtime settings
//!
//! ```text
//! snapshot ──diff──▶ Operation ──apply_operation──▶ Surface
//!     │                                               ▲
//!     └────────────────materialize────────────────────┘
//! ```

pub mod apply;
pub mod mount;
pub mod settings;

// Re-exports

pub use apply::{apply_operation, materialize};
pub use mount::{mount, run_frames, tick, MountHandle};
pub use settings::{
    reset_settings, set_settings, settings, Settings, ENV_MAX_CALLBACKS, ENV_TRACE_OPERATIONS,
};
