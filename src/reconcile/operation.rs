//! Operation Model - mutation instructions produced by the diff.
//!
//! Operations form a tree mirroring the compared subtree: an
//! [`Operation::Update`] carries one child operation per child position.

use std::fmt;
use std::rc::Rc;

use crate::types::SurfaceHandle;
use crate::vdom::{AttrDelta, Node};

/// Completion callback for a replace, given the new surface handle once it
/// is attached.
pub type MountCallback = Box<dyn FnOnce(SurfaceHandle)>;

/// One required mutation of the surface.
pub enum Operation {
    /// Materialize `node` and append it under `parent`.
    Append { node: Rc<Node>, parent: SurfaceHandle },
    /// Materialize `node` and swap it in for `target`.
    Replace {
        node: Rc<Node>,
        target: SurfaceHandle,
        on_mount: Option<MountCallback>,
    },
    /// Detach `target` from its parent.
    Remove { target: SurfaceHandle },
    /// Patch attributes of `target` in place, then apply child operations.
    Update {
        attrs: AttrDelta,
        children: Vec<Operation>,
        target: SurfaceHandle,
    },
    /// Overwrite the content of a text node.
    Text { value: String, target: SurfaceHandle },
    /// Nothing to do.
    Skip,
}

/// Fieldless mirror of [`Operation`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Append,
    Replace,
    Remove,
    Update,
    Text,
    Skip,
}

impl Operation {
    /// Replace without a completion callback.
    pub fn replace(node: Rc<Node>, target: SurfaceHandle) -> Self {
        Self::Replace { node, target, on_mount: None }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Append { .. } => OperationKind::Append,
            Self::Replace { .. } => OperationKind::Replace,
            Self::Remove { .. } => OperationKind::Remove,
            Self::Update { .. } => OperationKind::Update,
            Self::Text { .. } => OperationKind::Text,
            Self::Skip => OperationKind::Skip,
        }
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Surface node this operation mutates (the parent, for an append).
    pub fn target(&self) -> Option<SurfaceHandle> {
        match self {
            Self::Append { parent, .. } => Some(*parent),
            Self::Replace { target, .. }
            | Self::Remove { target }
            | Self::Update { target, .. }
            | Self::Text { target, .. } => Some(*target),
            Self::Skip => None,
        }
    }

    /// Child operations of an update; empty otherwise.
    pub fn children(&self) -> &[Operation] {
        match self {
            Self::Update { children, .. } => children,
            _ => &[],
        }
    }

    /// Number of operations in this tree, skips included.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Operation::count).sum::<usize>()
    }

    /// True if applying this tree would not touch the surface.
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Skip => true,
            Self::Update { attrs, children, .. } => {
                attrs.is_empty() && children.iter().all(Operation::is_noop)
            }
            _ => false,
        }
    }

    /// Chain `callback` after any existing completion callback of a replace.
    ///
    /// Other operations are returned unchanged.
    pub fn then_on_mount(self, callback: impl FnOnce(SurfaceHandle) + 'static) -> Self {
        match self {
            Self::Replace { node, target, on_mount } => {
                let chained: MountCallback = match on_mount {
                    Some(first) => Box::new(move |handle| {
                        first(handle);
                        callback(handle);
                    }),
                    None => Box::new(callback),
                };
                Self::Replace { node, target, on_mount: Some(chained) }
            }
            other => other,
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append { node, parent } => f
                .debug_struct("Append")
                .field("node", node)
                .field("parent", parent)
                .finish(),
            Self::Replace { node, target, on_mount } => f
                .debug_struct("Replace")
                .field("node", node)
                .field("target", target)
                .field("on_mount", &on_mount.is_some())
                .finish(),
            Self::Remove { target } => f.debug_struct("Remove").field("target", target).finish(),
            Self::Update { attrs, children, target } => f
                .debug_struct("Update")
                .field("attrs", attrs)
                .field("children", children)
                .field("target", target)
                .finish(),
            Self::Text { value, target } => f
                .debug_struct("Text")
                .field("value", value)
                .field("target", target)
                .finish(),
            Self::Skip => f.write_str("Skip"),
        }
    }
}
