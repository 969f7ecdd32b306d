//! Render context and instance links.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::engine::instances;
use crate::error::Result;
use crate::types::{InstanceId, SurfaceHandle};
use super::Component;

// =============================================================================
// Context
// =============================================================================

/// What a component sees while rendering or running a hook.
pub struct Context<C: Component> {
    props: Rc<C::Props>,
    state: Rc<C::State>,
    link: Link<C>,
    handle: Option<SurfaceHandle>,
}

impl<C: Component> Context<C> {
    pub(crate) fn new(
        props: Rc<C::Props>,
        state: Rc<C::State>,
        link: Link<C>,
        handle: Option<SurfaceHandle>,
    ) -> Self {
        Self { props, state, link, handle }
    }

    pub fn props(&self) -> &Rc<C::Props> {
        &self.props
    }

    pub fn state(&self) -> &Rc<C::State> {
        &self.state
    }

    /// A cloneable link back to this instance, for listeners and hooks.
    pub fn link(&self) -> Link<C> {
        self.link
    }

    /// Surface node this instance is anchored to.
    ///
    /// `None` during the first render; set once the instance is mounted.
    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.handle
    }
}

// =============================================================================
// Link
// =============================================================================

/// Handle to a live instance of `C`.
///
/// Links outlive the instance safely: once it is unmounted every call fails
/// with a usage error.
pub struct Link<C: Component> {
    id: InstanceId,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> Link<C> {
    pub(crate) fn new(id: InstanceId) -> Self {
        Self { id, _marker: PhantomData }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Replace the state with `updater(current)`.
    ///
    /// Returning the same `Rc` is a no-op. Otherwise the new state is
    /// committed right away and one re-render is scheduled for the next
    /// frame; a re-render already pending for this instance is superseded.
    ///
    /// Fails if the instance is not mounted.
    pub fn set_state(&self, updater: impl FnOnce(&Rc<C::State>) -> Rc<C::State>) -> Result<()> {
        instances::set_state::<C>(self.id, updater)
    }

    /// Current committed state.
    pub fn state(&self) -> Result<Rc<C::State>> {
        instances::state_of::<C>(self.id)
    }

    /// Current committed props.
    pub fn props(&self) -> Result<Rc<C::Props>> {
        instances::props_of::<C>(self.id)
    }

    pub fn is_mounted(&self) -> bool {
        instances::lifecycle(self.id) == Some(instances::Lifecycle::Mounted)
    }
}

impl<C: Component> Clone for Link<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Component> Copy for Link<C> {}

impl<C: Component> PartialEq for Link<C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<C: Component> fmt::Debug for Link<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link<{}>({})", std::any::type_name::<C>(), self.id)
    }
}
