//! Diff Engine - compare two snapshots and produce an operation tree.
//!
//! # Algorithm
//!
//! For `diff(old, new)`, the first matching rule wins:
//!
//! 1. Same snapshot (reference) → `Skip`
//! 2. Both text, same value → `Skip` (the handle, if any, moves along)
//! 3. Move `old`'s surface handle to `new`; it is the target below
//! 4. Same component type with a live instance → hand the instance over;
//!    same props (reference) → `Skip`, else the instance's prop update
//! 5. `old` is a component → unmount its instance, `Replace(new)`
//! 6. `new` is a component → create an instance, `Replace(first render)`
//!    and record the mounted handle on completion
//! 7. Either side text (including two texts that differ) → `Replace(new)`
//! 8. Element tags differ → `Replace(new)`
//! 9. Same tag → `Update(attribute delta, child operations)`
//!
//! The diff never emits `Text`; that variant is for callers building
//! operations by hand.
//!
//! Children are compared by position, not by key. Inserting or removing
//! anywhere but the tail shifts every later sibling onto a different
//! counterpart, producing replace/update churn. That is the accepted
//! behaviour.
//!
//! Whatever the diff decides is gone is pruned here: identity entries of the
//! discarded subtree are removed and every live instance inside it is
//! unmounted.

use std::rc::Rc;

use crate::engine::{identity, instances};
use crate::error::Result;
use crate::types::SurfaceHandle;
use crate::vdom::{diff_attrs, Node, NodeKind};
use super::operation::Operation;

/// Compute the operation that turns the surface for `old` into `new`.
pub fn diff(old: &Rc<Node>, new: &Rc<Node>) -> Result<Operation> {
    if Rc::ptr_eq(old, new) {
        return Ok(Operation::Skip);
    }

    if let (NodeKind::Text(a), NodeKind::Text(b)) = (old.kind(), new.kind()) {
        if a == b {
            // Keep the surface node findable from the new snapshot.
            if let Some(handle) = identity::remove(old.id()) {
                identity::set(new.id(), handle);
            }
            return Ok(Operation::Skip);
        }
    }

    let target = identity::replace(old.id(), new.id())?;

    if let (NodeKind::Component(a), NodeKind::Component(b)) = (old.kind(), new.kind()) {
        if a.kind == b.kind {
            if let Some(instance) = instances::transfer(old.id(), new.id()) {
                if a.same_props(b) {
                    return Ok(Operation::Skip);
                }
                return instances::set_props(instance, b.props.clone());
            }
        }
    }

    if let NodeKind::Component(_) = old.kind() {
        if let Some(instance) = instances::detach(old.id()) {
            instances::unmount(instance);
        }
        tracing::trace!(old = %old.id(), new = %new.id(), "component slot replaced");
        return Ok(Operation::replace(new.clone(), target));
    }

    if let NodeKind::Component(_) = new.kind() {
        discard_children(old);
        let (instance, root) = instances::instantiate(new)?;
        return Ok(Operation::Replace {
            node: root,
            target,
            on_mount: Some(Box::new(move |handle| instances::notify_mounted(instance, handle))),
        });
    }

    match (old.kind(), new.kind()) {
        (NodeKind::Element(a), NodeKind::Element(b)) if a.tag == b.tag => Ok(Operation::Update {
            attrs: diff_attrs(&a.attrs, &b.attrs),
            children: diff_children(&a.children, &b.children, target)?,
            target,
        }),
        _ => {
            discard_children(old);
            Ok(Operation::replace(new.clone(), target))
        }
    }
}

/// Positional child diff under `parent`.
///
/// One operation per index up to the longer list: `Append` where only the
/// new list has a child, `Remove` where only the old one does, a recursive
/// diff otherwise.
pub fn diff_children(
    old: &[Rc<Node>],
    new: &[Rc<Node>],
    parent: SurfaceHandle,
) -> Result<Vec<Operation>> {
    let len = old.len().max(new.len());
    let mut operations = Vec::with_capacity(len);

    for i in 0..len {
        let operation = match (old.get(i), new.get(i)) {
            (None, Some(added)) => Operation::Append {
                node: added.clone(),
                parent,
            },
            (Some(removed), None) => {
                let target = identity::require(removed.id())?;
                discard(removed);
                Operation::Remove { target }
            }
            (Some(a), Some(b)) => diff(a, b)?,
            (None, None) => continue,
        };
        operations.push(operation);
    }

    Ok(operations)
}

// =============================================================================
// Discarding
// =============================================================================

/// Forget a whole subtree: drop identity entries, unmount instances.
pub(crate) fn discard(node: &Rc<Node>) {
    identity::remove(node.id());
    match node.kind() {
        NodeKind::Element(element) => {
            for child in &element.children {
                discard(child);
            }
        }
        NodeKind::Component(_) => {
            if let Some(instance) = instances::detach(node.id()) {
                instances::unmount(instance);
            }
        }
        NodeKind::Text(_) => {}
    }
}

/// Forget everything below `node`, keeping `node`'s own entry.
fn discard_children(node: &Rc<Node>) {
    for child in node.children() {
        discard(child);
    }
}
