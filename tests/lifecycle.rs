//! Whole mount / update / tick cycles against the in-memory surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_vdom::engine::instances;
use spark_vdom::{
    component, element, instance_of, mount, pending_frames, reset_runtime, run_frames, text, tick,
    Attributes, Component, Context, Lifecycle, Link, MemorySurface, Node, ReconcileError, Surface,
};

thread_local! {
    static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static COUNTER_LINK: Cell<Option<Link<Counter>>> = const { Cell::new(None) };
    static OUTER_LINK: Cell<Option<Link<Outer>>> = const { Cell::new(None) };
    static INNER_LINK: Cell<Option<Link<Inner>>> = const { Cell::new(None) };
}

fn log(event: impl Into<String>) {
    EVENTS.with(|events| events.borrow_mut().push(event.into()));
}

fn events() -> Vec<String> {
    EVENTS.with(|events| events.borrow().clone())
}

fn setup() -> MemorySurface {
    reset_runtime();
    EVENTS.with(|events| events.borrow_mut().clear());
    let mut surface = MemorySurface::new();
    surface.add_target("app");
    surface
}

// =============================================================================
// Components
// =============================================================================

#[derive(Default)]
struct Counter;

impl Component for Counter {
    type Props = String;
    type State = u32;

    fn initial_state(_props: &String) -> u32 {
        0
    }

    fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
        COUNTER_LINK.with(|link| link.set(Some(ctx.link())));
        log(format!("render {}", ctx.state()));
        element("p")(Attributes::new(), vec![format!("{} {}", ctx.props(), ctx.state()).into()])
    }

    fn did_mount(&mut self, ctx: &Context<Self>) {
        log(format!("did_mount {}", ctx.state()));
    }

    fn did_update(&mut self, ctx: &Context<Self>) {
        log(format!("did_update {}", ctx.state()));
    }

    fn will_unmount(&mut self) {
        log("counter unmount");
    }
}

fn counter_link() -> Link<Counter> {
    COUNTER_LINK.with(|link| link.get()).expect("counter rendered")
}

#[derive(Default)]
struct Other;

impl Component for Other {
    type Props = ();
    type State = ();

    fn initial_state(_props: &()) {}

    fn render(&self, _ctx: &Context<Self>) -> Rc<Node> {
        text("other")
    }

    fn will_unmount(&mut self) {
        log("other unmount");
    }
}

/// Renders a component reference as its root.
#[derive(Default)]
struct Outer;

impl Component for Outer {
    type Props = ();
    type State = String;

    fn initial_state(_props: &()) -> String {
        "first".into()
    }

    fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
        OUTER_LINK.with(|link| link.set(Some(ctx.link())));
        component::<Inner>(ctx.state().as_str().to_string())
    }
}

/// Switches its root element between `div` and `span`.
#[derive(Default)]
struct Inner;

impl Component for Inner {
    type Props = String;
    type State = bool;

    fn initial_state(_props: &String) -> bool {
        false
    }

    fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
        INNER_LINK.with(|link| link.set(Some(ctx.link())));
        let tag = if **ctx.state() { "span" } else { "div" };
        element(tag)(Attributes::new(), vec![ctx.props().as_str().into()])
    }
}

// =============================================================================
// Scheduling
// =============================================================================

#[test]
fn test_state_updates_coalesce_into_one_render() {
    let mut surface = setup();
    let handle = mount(&mut surface, "app", component::<Counter>("count".to_string())).unwrap();
    run_frames(&mut surface, 4).unwrap();
    let backing = handle.handle().unwrap();

    let link = counter_link();
    link.set_state(|n| Rc::new(**n + 1)).unwrap();
    link.set_state(|n| Rc::new(**n * 10)).unwrap();

    // Both writes landed on state, nothing rendered yet.
    assert_eq!(*link.state().unwrap(), 10);
    assert_eq!(surface.to_markup(backing), "<p>count 0</p>");

    tick(&mut surface).unwrap();

    assert_eq!(surface.to_markup(backing), "<p>count 10</p>");
    let renders: Vec<_> = events().into_iter().filter(|e| e.starts_with("render")).collect();
    assert_eq!(renders, vec!["render 0", "render 10"]);
}

#[test]
fn test_hooks_run_after_the_mutation_batch() {
    let mut surface = setup();
    mount(&mut surface, "app", component::<Counter>("c".to_string())).unwrap();

    assert_eq!(events(), vec!["render 0"]);
    tick(&mut surface).unwrap();
    assert_eq!(events(), vec!["render 0", "did_mount 0"]);

    counter_link().set_state(|n| Rc::new(**n + 1)).unwrap();
    tick(&mut surface).unwrap();
    assert_eq!(events().last().map(String::as_str), Some("render 1"));

    tick(&mut surface).unwrap();
    assert_eq!(events().last().map(String::as_str), Some("did_update 1"));
    assert_eq!(pending_frames(), 0);
}

// =============================================================================
// Mount / Unmount
// =============================================================================

#[test]
fn test_set_state_after_unmount_is_a_usage_error() {
    let mut surface = setup();
    let handle = mount(&mut surface, "app", component::<Counter>("c".to_string())).unwrap();
    let link = counter_link();

    handle.unmount(&mut surface).unwrap();
    let mutations = surface.mutation_count();
    let pending = pending_frames();

    let error = link.set_state(|n| Rc::new(**n + 1)).unwrap_err();
    assert!(error.is_usage_error());
    assert!(matches!(error, ReconcileError::NotMounted(_)));
    assert!(!link.is_mounted());

    // Nothing was scheduled by the failed call.
    assert_eq!(pending_frames(), pending);
    assert!(!instances::has_scheduled_render(link.id()));

    // The pending did_mount is skipped; nothing touches the surface.
    run_frames(&mut surface, 4).unwrap();
    assert_eq!(pending_frames(), 0);
    assert_eq!(surface.mutation_count(), mutations);
    assert!(!events().iter().any(|e| e.starts_with("did_mount")));
    assert_eq!(events().last().map(String::as_str), Some("counter unmount"));
}

#[test]
fn test_missing_target() {
    let mut surface = setup();
    let error = mount(&mut surface, "nope", text("x")).unwrap_err();
    assert_eq!(error, ReconcileError::TargetNotFound("nope".into()));
    assert!(error.is_usage_error());
}

// =============================================================================
// Reuse vs Replace
// =============================================================================

#[test]
fn test_same_type_reuses_instance() {
    let mut surface = setup();
    let app = surface.find_target("app").unwrap();
    let div = element("div");

    let first = component::<Counter>("a".to_string());
    let root = div(Attributes::new(), vec![first.clone().into()]);
    let mut handle = mount(&mut surface, "app", root).unwrap();
    let instance = instance_of(first.id()).unwrap();

    let second = component::<Counter>("b".to_string());
    handle.update(&mut surface, div(Attributes::new(), vec![second.clone().into()])).unwrap();

    assert_eq!(instance_of(second.id()), Some(instance));
    assert_eq!(instance_of(first.id()), None);
    assert_eq!(instances::lifecycle(instance), Some(Lifecycle::Mounted));
    assert_eq!(surface.to_markup(app), "<div><p>b 0</p></div>");
}

#[test]
fn test_same_props_reference_skips_render() {
    let mut surface = setup();
    let div = element("div");
    let props = Rc::new("same".to_string());

    let mut handle = mount(
        &mut surface,
        "app",
        div(Attributes::new(), vec![component::<Counter>(props.clone()).into()]),
    )
    .unwrap();
    let mutations = surface.mutation_count();

    handle
        .update(&mut surface, div(Attributes::new(), vec![component::<Counter>(props).into()]))
        .unwrap();

    assert_eq!(surface.mutation_count(), mutations);
    let renders = events().iter().filter(|e| e.starts_with("render")).count();
    assert_eq!(renders, 1);
}

#[test]
fn test_new_props_supersede_pending_state_render() {
    let mut surface = setup();
    let app = surface.find_target("app").unwrap();
    let div = element("div");

    let first = component::<Counter>("a".to_string());
    let root = div(Attributes::new(), vec![first.into()]);
    let mut handle = mount(&mut surface, "app", root).unwrap();
    run_frames(&mut surface, 4).unwrap();

    let link = counter_link();
    link.set_state(|n| Rc::new(**n + 1)).unwrap();
    assert!(instances::has_scheduled_render(link.id()));

    let second = component::<Counter>("b".to_string());
    handle.update(&mut surface, div(Attributes::new(), vec![second.into()])).unwrap();

    // The prop update rendered the committed state and took over the frame.
    assert!(!instances::has_scheduled_render(link.id()));
    assert_eq!(surface.to_markup(app), "<div><p>b 1</p></div>");

    run_frames(&mut surface, 4).unwrap();

    let renders: Vec<_> = events().into_iter().filter(|e| e.starts_with("render")).collect();
    assert_eq!(renders, vec!["render 0", "render 1"]);
    assert_eq!(surface.to_markup(app), "<div><p>b 1</p></div>");
    assert_eq!(events().last().map(String::as_str), Some("did_update 1"));
}

#[test]
fn test_type_change_replaces_instance() {
    let mut surface = setup();
    let app = surface.find_target("app").unwrap();
    let div = element("div");

    let counter = component::<Counter>("a".to_string());
    let root = div(Attributes::new(), vec![counter.clone().into()]);
    let mut handle = mount(&mut surface, "app", root).unwrap();
    let old = instance_of(counter.id()).unwrap();

    let other = component::<Other>(());
    handle.update(&mut surface, div(Attributes::new(), vec![other.clone().into()])).unwrap();

    let new = instance_of(other.id()).unwrap();
    assert_ne!(new, old);
    assert_eq!(instances::lifecycle(old), None);
    assert_eq!(instances::lifecycle(new), Some(Lifecycle::Mounted));
    assert!(events().contains(&"counter unmount".to_string()));
    assert_eq!(surface.to_markup(app), "<div>other</div>");
}

#[test]
fn test_removed_child_unmounts_component() {
    let mut surface = setup();
    let app = surface.find_target("app").unwrap();
    let div = element("div");

    let mut handle = mount(
        &mut surface,
        "app",
        div(Attributes::new(), vec!["a".into(), component::<Counter>("c".to_string()).into()]),
    )
    .unwrap();
    assert_eq!(instances::live_count(), 1);

    handle.update(&mut surface, div(Attributes::new(), vec!["a".into()])).unwrap();

    assert_eq!(instances::live_count(), 0);
    assert_eq!(events().last().map(String::as_str), Some("counter unmount"));
    assert_eq!(surface.to_markup(app), "<div>a</div>");
}

// =============================================================================
// Handle Recapture
// =============================================================================

#[test]
fn test_nested_component_replace_recaptures_handles() {
    let mut surface = setup();
    let app = surface.find_target("app").unwrap();
    let handle = mount(&mut surface, "app", component::<Outer>(())).unwrap();
    run_frames(&mut surface, 4).unwrap();
    let before = handle.handle().unwrap();
    assert_eq!(surface.to_markup(app), "<div>first</div>");

    // Inner swaps its root element: every enclosing anchor must follow.
    let inner = INNER_LINK.with(|link| link.get()).unwrap();
    inner.set_state(|_| Rc::new(true)).unwrap();
    tick(&mut surface).unwrap();

    let after = handle.handle().unwrap();
    assert_ne!(after, before);
    assert_eq!(surface.tag(after), Some("span"));
    assert_eq!(surface.to_markup(app), "<span>first</span>");

    // Outer re-renders with new props for Inner: patched in place.
    let outer = OUTER_LINK.with(|link| link.get()).unwrap();
    outer.set_state(|_| Rc::new("second".to_string())).unwrap();
    tick(&mut surface).unwrap();

    assert_eq!(handle.handle(), Some(after));
    assert_eq!(surface.to_markup(app), "<span>second</span>");
}

// =============================================================================
// Listeners
// =============================================================================

#[test]
fn test_updated_listener_replaces_old_binding() {
    let mut surface = setup();
    let button = element("button");
    let clicks = Rc::new(RefCell::new(Vec::new()));

    let first = clicks.clone();
    let mut handle = mount(
        &mut surface,
        "app",
        button(
            Attributes::new().on("onClick", move |_| first.borrow_mut().push("first")),
            vec![],
        ),
    )
    .unwrap();
    let backing = handle.handle().unwrap();

    let second = clicks.clone();
    handle
        .update(
            &mut surface,
            button(
                Attributes::new().on("onClick", move |_| second.borrow_mut().push("second")),
                vec![],
            ),
        )
        .unwrap();

    assert!(surface.dispatch(backing, "onClick"));
    assert_eq!(*clicks.borrow(), vec!["second"]);

    handle.update(&mut surface, button(Attributes::new(), vec![])).unwrap();
    assert!(!surface.dispatch(backing, "onClick"));
}
