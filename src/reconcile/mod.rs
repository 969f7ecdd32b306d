//! Reconciliation - diff engine and operation model.
//!
//! - [`diff`](fn@diff) - compare two snapshots, produce an [`Operation`] tree
//! - [`Operation`] - the closed set of surface mutations

mod diff;
mod operation;

pub(crate) use diff::discard;
pub use diff::{diff, diff_children};
pub use operation::*;
