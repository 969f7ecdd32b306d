//! Patcher - turn snapshots and operations into surface calls.
//!
//! [`materialize`] builds surface nodes for a whole snapshot; [`apply_operation`]
//! interprets an operation tree from the diff. Both keep the identity map in
//! step with what they create.

use std::rc::Rc;

use crate::engine::{identity, instances};
use crate::error::{ReconcileError, Result};
use crate::reconcile::Operation;
use crate::surface::Surface;
use crate::types::SurfaceHandle;
use crate::vdom::{Node, NodeKind};
use super::settings::settings;

/// Create surface nodes for `node` and its subtree.
///
/// Component references without an instance get one: it is created, rendered
/// and marked mounted at the returned handle. The caller attaches the
/// returned handle.
pub fn materialize(surface: &mut dyn Surface, node: &Rc<Node>) -> Result<SurfaceHandle> {
    let handle = match node.kind() {
        NodeKind::Text(value) => surface.create_text(value),
        NodeKind::Element(element) => {
            let handle = surface.create_element(&element.tag);
            for (key, value) in element.attrs.iter() {
                surface.bind_attribute(handle, key, value)?;
            }
            for child in &element.children {
                let child_handle = materialize(surface, child)?;
                surface.append_child(handle, child_handle)?;
            }
            handle
        }
        NodeKind::Component(_) => match instances::instance_of(node.id()) {
            // Already instantiated: build its current subtree again.
            Some(instance) => {
                let root = instances::root_of(instance)
                    .ok_or(ReconcileError::NotMounted(instance))?;
                let handle = materialize(surface, &root)?;
                instances::notify_mounted(instance, handle);
                handle
            }
            None => {
                let (instance, root) = instances::instantiate(node)?;
                let handle = materialize(surface, &root)?;
                instances::notify_mounted(instance, handle);
                handle
            }
        },
    };

    identity::set(node.id(), handle);
    Ok(handle)
}

/// Apply one operation tree to the surface.
pub fn apply_operation(surface: &mut dyn Surface, operation: Operation) -> Result<()> {
    if settings().trace_operations {
        tracing::trace!(kind = ?operation.kind(), target = ?operation.target(), "apply");
    }

    match operation {
        Operation::Skip => {}
        Operation::Text { value, target } => {
            surface.set_text_content(target, &value)?;
        }
        Operation::Replace { node, target, on_mount } => {
            let replacement = materialize(surface, &node)?;
            surface.replace_child(target, replacement)?;
            if let Some(callback) = on_mount {
                callback(replacement);
            }
        }
        Operation::Remove { target } => {
            surface.remove_child(target)?;
        }
        Operation::Append { node, parent } => {
            let child = materialize(surface, &node)?;
            surface.append_child(parent, child)?;
        }
        Operation::Update { attrs, children, target } => {
            for (key, value) in &attrs {
                match value {
                    Some(value) => surface.bind_attribute(target, key, value)?,
                    None => surface.unbind_attribute(target, key)?,
                }
            }
            for child in children {
                apply_operation(surface, child)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::identity::reset_identity;
    use crate::reconcile::diff;
    use crate::surface::MemorySurface;
    use crate::vdom::{element, text, Attributes};

    #[test]
    fn test_materialize_tracks_every_node() {
        reset_identity();
        let mut surface = MemorySurface::new();
        let hello = text("hello");
        let attrs = Attributes::new().with("id", "greeting");
        let node = element("p")(attrs, vec![hello.clone().into()]);

        let handle = materialize(&mut surface, &node).unwrap();

        assert_eq!(surface.to_markup(handle), "<p id=\"greeting\">hello</p>");
        assert_eq!(identity::get(node.id()), Some(handle));
        assert_eq!(identity::get(hello.id()), Some(surface.children(handle)[0]));
    }

    #[test]
    fn test_apply_update_round() {
        reset_identity();
        let mut surface = MemorySurface::new();
        let root = surface.add_target("root");
        let ul = element("ul");

        let old = ul(Attributes::new().with("class", "a"), vec!["one".into(), "two".into()]);
        let handle = materialize(&mut surface, &old).unwrap();
        surface.append_child(root, handle).unwrap();

        let new = ul(Attributes::new(), vec!["one".into(), "2".into(), "three".into()]);
        let operation = diff(&old, &new).unwrap();
        apply_operation(&mut surface, operation).unwrap();

        assert_eq!(surface.to_markup(root), "<ul>one2three</ul>");
        assert_eq!(identity::get(new.id()), Some(handle));
    }

    #[test]
    fn test_apply_replace_swaps_node() {
        reset_identity();
        let mut surface = MemorySurface::new();
        let root = surface.add_target("root");

        let old = element("div")(Attributes::new(), vec!["x".into()]);
        let handle = materialize(&mut surface, &old).unwrap();
        surface.append_child(root, handle).unwrap();

        let new = text("plain");
        apply_operation(&mut surface, diff(&old, &new).unwrap()).unwrap();

        assert_eq!(surface.to_markup(root), "plain");
        assert_ne!(identity::get(new.id()), Some(handle));
        assert_eq!(surface.parent(handle), None);
    }

    #[test]
    fn test_apply_hand_built_text() {
        reset_identity();
        let mut surface = MemorySurface::new();
        let node = text("before");
        let handle = materialize(&mut surface, &node).unwrap();

        let operation = Operation::Text { value: "after".into(), target: handle };
        apply_operation(&mut surface, operation).unwrap();

        assert_eq!(surface.text(handle), Some("after"));
    }

    #[test]
    fn test_apply_remove_tail() {
        reset_identity();
        let mut surface = MemorySurface::new();
        let root = surface.add_target("root");
        let ul = element("ul");

        let old = ul(Attributes::new(), vec!["a".into(), "b".into(), "c".into()]);
        let handle = materialize(&mut surface, &old).unwrap();
        surface.append_child(root, handle).unwrap();

        let new = ul(Attributes::new(), vec!["a".into()]);
        apply_operation(&mut surface, diff(&old, &new).unwrap()).unwrap();

        assert_eq!(surface.to_markup(root), "<ul>a</ul>");
        assert_eq!(identity::tracked_count(), 2);
    }
}
