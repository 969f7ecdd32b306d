//! Instance Table - live component instances and their lifecycle.
//!
//! Snapshots carry no instance pointer. Instead this table maps a component
//! reference's [`NodeId`] (its slot) to the [`InstanceId`] living there.
//! When the diff reuses an instance across renders the slot entry moves to
//! the new reference with [`transfer`], mirroring the identity map.
//!
//! Each instance keeps:
//! - its lifecycle state (`Created` → `Mounted` → `Unmounted`)
//! - the last rendered root snapshot
//! - the surface handle it is anchored to
//! - at most one pending re-render token (state changes coalesce per frame)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::component::{Body, Component, Holder};
use crate::error::{ReconcileError, Result};
use crate::pipeline::apply_operation;
use crate::reconcile::{self, Operation};
use crate::surface::Surface;
use crate::types::{FrameToken, InstanceId, NodeId, SurfaceHandle};
use crate::vdom::{Node, NodeKind};
use super::{identity, scheduler};

// =============================================================================
// Instance
// =============================================================================

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Rendered once, not yet attached to the surface.
    Created,
    /// Attached; accepts state and prop updates.
    Mounted,
    /// Torn down. Terminal.
    ///
    /// Seen only by code already holding the instance when it is torn down
    /// (a `set_state` whose updater unmounts it, say). The table drops the
    /// instance right away, so [`lifecycle`] reports `None` from then on.
    Unmounted,
}

pub(crate) struct Instance {
    id: InstanceId,
    body: Box<dyn Body>,
    lifecycle: Cell<Lifecycle>,
    /// Component reference currently holding this instance.
    owner: Cell<NodeId>,
    root: RefCell<Option<Rc<Node>>>,
    handle: Cell<Option<SurfaceHandle>>,
    scheduled: Cell<Option<FrameToken>>,
}

impl Instance {
    fn ensure_mounted(&self) -> Result<()> {
        match self.lifecycle.get() {
            Lifecycle::Mounted => Ok(()),
            _ => Err(ReconcileError::NotMounted(self.id)),
        }
    }

    fn holder<C: Component>(&self) -> Result<&Holder<C>> {
        self.body
            .as_any()
            .downcast_ref::<Holder<C>>()
            .ok_or(ReconcileError::PropsMismatch(self.body.name()))
    }

    fn root(&self) -> Option<Rc<Node>> {
        self.root.borrow().clone()
    }

    fn cancel_scheduled(&self) {
        if let Some(token) = self.scheduled.take() {
            scheduler::cancel_frame(token);
        }
    }
}

// =============================================================================
// Table State
// =============================================================================

thread_local! {
    /// Live instances by id.
    static INSTANCES: RefCell<HashMap<InstanceId, Rc<Instance>>> = RefCell::new(HashMap::new());

    /// Component reference slot to the instance living in it.
    static SLOTS: RefCell<HashMap<NodeId, InstanceId>> = RefCell::new(HashMap::new());

    /// Next instance id.
    static NEXT_INSTANCE: Cell<u64> = const { Cell::new(1) };
}

fn lookup(id: InstanceId) -> Result<Rc<Instance>> {
    INSTANCES
        .with(|instances| instances.borrow().get(&id).cloned())
        .ok_or(ReconcileError::NotMounted(id))
}

/// Instance whose current root is `node`, i.e. the component directly
/// enclosing a component reference that is itself a render root.
fn enclosing(node: NodeId) -> Option<Rc<Instance>> {
    INSTANCES.with(|instances| {
        instances
            .borrow()
            .values()
            .find(|instance| instance.root.borrow().as_ref().is_some_and(|root| root.id() == node))
            .cloned()
    })
}

// =============================================================================
// Slots
// =============================================================================

/// Instance living in the slot of component reference `node`.
pub fn instance_of(node: NodeId) -> Option<InstanceId> {
    SLOTS.with(|slots| slots.borrow().get(&node).copied())
}

/// Move the instance in slot `old` to slot `new`.
///
/// Returns `None` (and moves nothing) if `old` holds no instance.
pub(crate) fn transfer(old: NodeId, new: NodeId) -> Option<InstanceId> {
    let id = SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        let id = slots.remove(&old)?;
        slots.insert(new, id);
        Some(id)
    })?;
    if let Ok(instance) = lookup(id) {
        instance.owner.set(new);
    }
    Some(id)
}

/// Remove and return the instance in slot `node`.
pub(crate) fn detach(node: NodeId) -> Option<InstanceId> {
    SLOTS.with(|slots| slots.borrow_mut().remove(&node))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Create an instance for component reference `node` and render it once.
///
/// Returns the new instance and its first rendered snapshot.
pub(crate) fn instantiate(node: &Rc<Node>) -> Result<(InstanceId, Rc<Node>)> {
    let NodeKind::Component(reference) = node.kind() else {
        return Err(ReconcileError::Untracked(node.id()));
    };

    let id = NEXT_INSTANCE.with(|next| {
        let value = next.get();
        next.set(value + 1);
        InstanceId(value)
    });
    let instance = Rc::new(Instance {
        id,
        body: reference.kind.instantiate(),
        lifecycle: Cell::new(Lifecycle::Created),
        owner: Cell::new(node.id()),
        root: RefCell::new(None),
        handle: Cell::new(None),
        scheduled: Cell::new(None),
    });

    INSTANCES.with(|instances| {
        instances.borrow_mut().insert(id, instance.clone());
    });
    SLOTS.with(|slots| {
        slots.borrow_mut().insert(node.id(), id);
    });

    let root = instance.body.init_props(id, reference.props.clone())?;
    *instance.root.borrow_mut() = Some(root.clone());

    tracing::debug!(instance = %id, component = reference.kind.name(), "instance created");
    Ok((id, root))
}

/// Last rendered root of an instance.
pub(crate) fn root_of(id: InstanceId) -> Option<Rc<Node>> {
    lookup(id).ok().and_then(|instance| instance.root())
}

/// Record that the instance's subtree is attached at `handle` and queue its
/// `did_mount` hook for the next frame.
pub(crate) fn notify_mounted(id: InstanceId, handle: SurfaceHandle) {
    let Ok(instance) = lookup(id) else {
        tracing::warn!(instance = %id, "mount notification for unknown instance");
        return;
    };
    match instance.lifecycle.get() {
        Lifecycle::Unmounted => return,
        // Rebuilt somewhere else; did_mount already ran.
        Lifecycle::Mounted => {
            recapture(&instance, handle);
            return;
        }
        Lifecycle::Created => {}
    }

    instance.lifecycle.set(Lifecycle::Mounted);
    recapture(&instance, handle);
    tracing::debug!(instance = %id, %handle, "instance mounted");

    scheduler::request_frame(move |_| {
        match lookup(id) {
            Ok(instance) if instance.lifecycle.get() == Lifecycle::Mounted => {
                instance.body.did_mount(id, instance.handle.get());
            }
            _ => tracing::warn!(instance = %id, "skipping did_mount for unmounted instance"),
        }
        Ok(())
    });
}

/// Re-anchor an instance at `handle`.
///
/// Also re-points the identity entry of the owning reference and walks out
/// through enclosing instances whose root is that reference.
fn recapture(instance: &Instance, handle: SurfaceHandle) {
    instance.handle.set(Some(handle));
    let owner = instance.owner.get();
    identity::set(owner, handle);
    if let Some(parent) = enclosing(owner) {
        if parent.id != instance.id {
            recapture(&parent, handle);
        }
    }
}

/// Push new props into a mounted instance and return its update synchronously.
///
/// A re-render already queued for this instance is cancelled: the update
/// returned here renders the latest state.
pub(crate) fn set_props(id: InstanceId, props: Rc<dyn std::any::Any>) -> Result<Operation> {
    let instance = lookup(id)?;
    instance.ensure_mounted()?;
    instance.cancel_scheduled();
    instance.body.receive_props(id, props)?;
    update_operation(&instance)
}

/// Typed state update behind [`crate::component::Link::set_state`].
pub(crate) fn set_state<C: Component>(
    id: InstanceId,
    updater: impl FnOnce(&Rc<C::State>) -> Rc<C::State>,
) -> Result<()> {
    let instance = lookup(id)?;
    instance.ensure_mounted()?;
    let holder = instance.holder::<C>()?;
    let current = holder.state().ok_or(ReconcileError::NotMounted(id))?;

    let next = updater(&current);
    if Rc::ptr_eq(&current, &next) {
        return Ok(());
    }

    // The updater may have unmounted us.
    instance.ensure_mounted()?;
    holder.commit_state(next);
    schedule_rerender(&instance);
    Ok(())
}

pub(crate) fn state_of<C: Component>(id: InstanceId) -> Result<Rc<C::State>> {
    let instance = lookup(id)?;
    instance.holder::<C>()?.state().ok_or(ReconcileError::NotMounted(id))
}

pub(crate) fn props_of<C: Component>(id: InstanceId) -> Result<Rc<C::Props>> {
    let instance = lookup(id)?;
    instance.holder::<C>()?.props().ok_or(ReconcileError::NotMounted(id))
}

/// Queue a re-render, superseding any pending one.
fn schedule_rerender(instance: &Instance) {
    instance.cancel_scheduled();
    let id = instance.id;
    let token = scheduler::request_frame(move |surface| rerender(id, surface));
    instance.scheduled.set(Some(token));
}

/// Frame work for a scheduled re-render: render, diff, patch.
fn rerender(id: InstanceId, surface: &mut dyn Surface) -> Result<()> {
    let instance = lookup(id)?;
    instance.scheduled.set(None);
    instance.ensure_mounted()?;

    let operation = update_operation(&instance)?;
    tracing::trace!(instance = %id, operations = operation.count(), "applying scheduled update");
    apply_operation(surface, operation)
}

/// Render again, diff against the previous root and queue `did_update`.
fn update_operation(instance: &Instance) -> Result<Operation> {
    let id = instance.id;
    let new_root = instance.body.render(id, instance.handle.get())?;
    let old_root = instance.root().ok_or(ReconcileError::NotMounted(id))?;

    let operation = reconcile::diff(&old_root, &new_root)?;
    *instance.root.borrow_mut() = Some(new_root);

    scheduler::request_frame(move |_| {
        match lookup(id) {
            Ok(instance) if instance.lifecycle.get() == Lifecycle::Mounted => {
                instance.body.did_update(id, instance.handle.get());
            }
            _ => tracing::warn!(instance = %id, "skipping did_update for unmounted instance"),
        }
        Ok(())
    });

    // A replace swaps the surface node this instance is anchored to.
    Ok(operation.then_on_mount(move |handle| {
        if let Ok(instance) = lookup(id) {
            recapture(&instance, handle);
        }
    }))
}

/// Tear an instance down.
///
/// Runs `will_unmount`, cancels pending work, and discards the rendered
/// subtree (which unmounts nested instances). Later calls through a
/// [`crate::component::Link`] fail with a usage error.
pub fn unmount(id: InstanceId) {
    let Ok(instance) = lookup(id) else { return };
    if instance.lifecycle.get() == Lifecycle::Unmounted {
        return;
    }

    instance.body.will_unmount();
    instance.lifecycle.set(Lifecycle::Unmounted);
    instance.cancel_scheduled();
    instance.handle.set(None);

    INSTANCES.with(|instances| {
        instances.borrow_mut().remove(&id);
    });
    let owner = instance.owner.get();
    SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        if slots.get(&owner) == Some(&id) {
            slots.remove(&owner);
        }
    });

    let root = instance.root.borrow_mut().take();
    if let Some(root) = root {
        reconcile::discard(&root);
    }
    tracing::debug!(instance = %id, "instance unmounted");
}

// =============================================================================
// Lookups
// =============================================================================

/// Lifecycle state of a live instance.
///
/// `None` means unmounted (or never created): unmounted instances are removed
/// from the table, so `Some(Lifecycle::Unmounted)` is never returned.
pub fn lifecycle(id: InstanceId) -> Option<Lifecycle> {
    lookup(id).ok().map(|instance| instance.lifecycle.get())
}

/// Surface handle the instance is anchored to.
pub fn handle_of(id: InstanceId) -> Option<SurfaceHandle> {
    lookup(id).ok().and_then(|instance| instance.handle.get())
}

/// True if a re-render is queued for the instance.
pub fn has_scheduled_render(id: InstanceId) -> bool {
    lookup(id)
        .ok()
        .and_then(|instance| instance.scheduled.get())
        .is_some_and(scheduler::is_pending)
}

/// Number of live instances.
pub fn live_count() -> usize {
    INSTANCES.with(|instances| instances.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Drop every instance without running hooks (for testing).
pub fn reset_instances() {
    INSTANCES.with(|instances| instances.borrow_mut().clear());
    SLOTS.with(|slots| slots.borrow_mut().clear());
}
