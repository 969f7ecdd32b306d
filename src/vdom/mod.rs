//! Node Model - immutable snapshot trees.
//!
//! - [`node`] - Node variants, component references and builders
//! - [`attrs`] - Typed attribute values, listeners and attribute deltas

mod attrs;
mod node;

pub use attrs::*;
pub use node::*;
