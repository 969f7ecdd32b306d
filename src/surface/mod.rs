//! Surface - the actuation layer the runtime drives.
//!
//! The runtime never touches concrete on-screen objects. It asks a
//! [`Surface`] to create nodes, bind attributes and move children, and keeps
//! only the opaque [`SurfaceHandle`]s it gets back.
//!
//! [`MemorySurface`] is a retained in-memory implementation used by tests
//! and demos.

mod memory;

pub use memory::MemorySurface;

use crate::error::Result;
use crate::types::SurfaceHandle;
use crate::vdom::AttrValue;

/// Presentation surface operations consumed by the runtime.
pub trait Surface {
    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> SurfaceHandle;

    /// Create a detached text node.
    fn create_text(&mut self, value: &str) -> SurfaceHandle;

    /// Bind one attribute or listener, replacing any previous binding.
    ///
    /// [`AttrValue::Listener`] values are listener bindings and must not be
    /// written as plain attributes.
    fn bind_attribute(&mut self, handle: SurfaceHandle, key: &str, value: &AttrValue) -> Result<()>;

    /// Remove an attribute or listener binding.
    fn unbind_attribute(&mut self, handle: SurfaceHandle, key: &str) -> Result<()>;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: SurfaceHandle, child: SurfaceHandle) -> Result<()>;

    /// Put `new` where `old` is. No-op if `old` has no parent.
    fn replace_child(&mut self, old: SurfaceHandle, new: SurfaceHandle) -> Result<()>;

    /// Detach `handle` from its parent. No-op if it has none.
    fn remove_child(&mut self, handle: SurfaceHandle) -> Result<()>;

    /// Overwrite the content of a text node.
    fn set_text_content(&mut self, handle: SurfaceHandle, value: &str) -> Result<()>;

    /// Look up a mount target by name.
    fn find_target(&self, name: &str) -> Option<SurfaceHandle>;
}
