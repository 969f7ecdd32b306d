//! Components - stateful units that render snapshot subtrees.
//!
//! A component type implements [`Component`]. The runtime creates one
//! instance per mounted component reference and keeps it alive across parent
//! re-renders for as long as the reference keeps the same type in the same
//! slot.
//!
//! # Lifecycle
//!
//! ```text
//! Created --notify_mounted--> Mounted --unmount--> Unmounted (terminal)
//! ```
//!
//! - `initial_state` + first `render` happen when the reference is first diffed
//!   or materialized
//! - `did_mount` runs on the frame after the rendered subtree is attached
//! - new props from a parent render go through `will_receive_props`, then a
//!   synchronous re-render; `did_update` follows on the next frame
//! - [`Link::set_state`] commits immediately and schedules one coalesced
//!   re-render for the next frame
//! - `will_unmount` runs when the slot is replaced or its parent removed
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default)]
//! struct Counter;
//!
//! impl Component for Counter {
//!     type Props = ();
//!     type State = u32;
//!
//!     fn initial_state(_props: &()) -> u32 { 0 }
//!
//!     fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
//!         let link = ctx.link();
//!         button(
//!             Attributes::new().on("onClick", move |_| {
//!                 let _ = link.set_state(|n| Rc::new(**n + 1));
//!             }),
//!             vec![ctx.state().to_string().into()],
//!         )
//!     }
//! }
//! ```

mod context;

pub use context::{Context, Link};

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ReconcileError, Result};
use crate::types::{InstanceId, SurfaceHandle};
use crate::vdom::Node;

// =============================================================================
// Component Contract
// =============================================================================

/// A stateful component.
///
/// `render` must be a pure function of props and state. State is replaced
/// wholesale through [`Link::set_state`]; returning the same `Rc` from an
/// updater means "no change" and schedules nothing.
pub trait Component: Default + 'static {
    /// Input properties handed down by the parent.
    type Props: 'static;
    /// Internal state, owned by the instance.
    type State: 'static;

    /// State for a freshly created instance.
    fn initial_state(props: &Self::Props) -> Self::State;

    /// Produce the subtree for the current props and state.
    fn render(&self, ctx: &Context<Self>) -> Rc<Node>;

    /// Derive state from incoming props before they are committed.
    fn will_receive_props(
        &mut self,
        _props: &Rc<Self::Props>,
        state: &Rc<Self::State>,
    ) -> Rc<Self::State> {
        state.clone()
    }

    /// Runs on the frame after the first render is attached to the surface.
    fn did_mount(&mut self, _ctx: &Context<Self>) {}

    /// Runs on the frame after an update was produced.
    fn did_update(&mut self, _ctx: &Context<Self>) {}

    /// Runs right before the instance is torn down.
    fn will_unmount(&mut self) {}
}

// =============================================================================
// Type-erased Body
// =============================================================================

/// Object-safe view of a component instance's user data.
pub(crate) trait Body {
    fn name(&self) -> &'static str;

    /// Commit the first props, build initial state and render once.
    fn init_props(&self, id: InstanceId, props: Rc<dyn Any>) -> Result<Rc<Node>>;

    /// Run `will_receive_props` and commit props and derived state.
    fn receive_props(&self, id: InstanceId, props: Rc<dyn Any>) -> Result<()>;

    fn render(&self, id: InstanceId, handle: Option<SurfaceHandle>) -> Result<Rc<Node>>;

    fn did_mount(&self, id: InstanceId, handle: Option<SurfaceHandle>);

    fn did_update(&self, id: InstanceId, handle: Option<SurfaceHandle>);

    fn will_unmount(&self);

    fn as_any(&self) -> &dyn Any;
}

/// Concrete body for component type `C`.
///
/// Props and state sit in their own cells so a hook holding the component
/// mutably can still call [`Link::set_state`].
pub(crate) struct Holder<C: Component> {
    component: RefCell<C>,
    props: RefCell<Option<Rc<C::Props>>>,
    state: RefCell<Option<Rc<C::State>>>,
}

impl<C: Component> Holder<C> {
    pub(crate) fn create() -> Box<dyn Body> {
        Box::new(Self {
            component: RefCell::new(C::default()),
            props: RefCell::new(None),
            state: RefCell::new(None),
        })
    }

    pub(crate) fn props(&self) -> Option<Rc<C::Props>> {
        self.props.borrow().clone()
    }

    pub(crate) fn state(&self) -> Option<Rc<C::State>> {
        self.state.borrow().clone()
    }

    pub(crate) fn commit_state(&self, state: Rc<C::State>) {
        *self.state.borrow_mut() = Some(state);
    }

    fn context(&self, id: InstanceId, handle: Option<SurfaceHandle>) -> Result<Context<C>> {
        match (self.props(), self.state()) {
            (Some(props), Some(state)) => Ok(Context::new(props, state, Link::new(id), handle)),
            _ => Err(ReconcileError::NotMounted(id)),
        }
    }

    fn downcast_props(&self, props: Rc<dyn Any>) -> Result<Rc<C::Props>> {
        props
            .downcast::<C::Props>()
            .map_err(|_| ReconcileError::PropsMismatch(self.name()))
    }
}

impl<C: Component> Body for Holder<C> {
    fn name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn init_props(&self, id: InstanceId, props: Rc<dyn Any>) -> Result<Rc<Node>> {
        let props = self.downcast_props(props)?;
        let state = Rc::new(C::initial_state(&props));
        *self.props.borrow_mut() = Some(props);
        *self.state.borrow_mut() = Some(state);
        self.render(id, None)
    }

    fn receive_props(&self, id: InstanceId, props: Rc<dyn Any>) -> Result<()> {
        let props = self.downcast_props(props)?;
        let state = self.state().ok_or(ReconcileError::NotMounted(id))?;
        let next = self.component.borrow_mut().will_receive_props(&props, &state);
        *self.props.borrow_mut() = Some(props);
        *self.state.borrow_mut() = Some(next);
        Ok(())
    }

    fn render(&self, id: InstanceId, handle: Option<SurfaceHandle>) -> Result<Rc<Node>> {
        let ctx = self.context(id, handle)?;
        Ok(self.component.borrow().render(&ctx))
    }

    fn did_mount(&self, id: InstanceId, handle: Option<SurfaceHandle>) {
        if let Ok(ctx) = self.context(id, handle) {
            self.component.borrow_mut().did_mount(&ctx);
        }
    }

    fn did_update(&self, id: InstanceId, handle: Option<SurfaceHandle>) {
        if let Ok(ctx) = self.context(id, handle) {
            self.component.borrow_mut().did_update(&ctx);
        }
    }

    fn will_unmount(&self) {
        self.component.borrow_mut().will_unmount();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::text;

    #[derive(Default)]
    struct Echo {
        received: usize,
    }

    impl Component for Echo {
        type Props = String;
        type State = usize;

        fn initial_state(props: &String) -> usize {
            props.len()
        }

        fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
            text(format!("{}:{}", ctx.props(), ctx.state()))
        }

        fn will_receive_props(&mut self, props: &Rc<String>, _state: &Rc<usize>) -> Rc<usize> {
            self.received += 1;
            Rc::new(props.len() * 10)
        }
    }

    #[test]
    fn test_init_props_renders() {
        let body = Holder::<Echo>::create();
        let root = body.init_props(InstanceId(1), Rc::new("abc".to_string())).unwrap();
        assert_eq!(root.as_text(), Some("abc:3"));
    }

    #[test]
    fn test_render_before_init_fails() {
        let body = Holder::<Echo>::create();
        assert_eq!(
            body.render(InstanceId(2), None).unwrap_err(),
            ReconcileError::NotMounted(InstanceId(2))
        );
    }

    #[test]
    fn test_receive_props_derives_state() {
        let body = Holder::<Echo>::create();
        body.init_props(InstanceId(1), Rc::new("a".to_string())).unwrap();
        body.receive_props(InstanceId(1), Rc::new("abcd".to_string())).unwrap();

        let root = body.render(InstanceId(1), None).unwrap();
        assert_eq!(root.as_text(), Some("abcd:40"));

        let holder = body.as_any().downcast_ref::<Holder<Echo>>().unwrap();
        assert_eq!(holder.component.borrow().received, 1);
    }

    #[test]
    fn test_props_type_mismatch() {
        let body = Holder::<Echo>::create();
        let err = body.init_props(InstanceId(1), Rc::new(5u8)).unwrap_err();
        assert!(matches!(err, ReconcileError::PropsMismatch(name) if name.ends_with("Echo")));
    }
}
