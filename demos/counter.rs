//! Toggle demo.
//!
//! A panel whose click handler flips a flag and grows a label. While the
//! flag is set the panel shows a `Badge` component; otherwise a plain
//! `<div>` takes its slot, which unmounts the badge.
//!
//! Run with: `RUST_LOG=spark_vdom=trace SPARK_VDOM_TRACE_OPS=1 cargo run --example counter`

use std::rc::Rc;

use spark_vdom::{
    component, element, mount, run_frames, set_settings, Attributes, Component, Context,
    Listener, MemorySurface, Node, Settings,
};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Badge
// =============================================================================

struct BadgeProps {
    on_click: Listener,
    label: String,
}

#[derive(Default)]
struct Badge;

impl Component for Badge {
    type Props = BadgeProps;
    type State = ();

    fn initial_state(_props: &BadgeProps) {}

    fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
        let props = ctx.props();
        element("button")(
            Attributes::new().with("onClick", props.on_click.clone()),
            vec![props.label.clone().into()],
        )
    }

    fn will_unmount(&mut self) {
        println!("badge: unmount");
    }
}

// =============================================================================
// Panel
// =============================================================================

#[derive(Debug, Clone)]
struct PanelState {
    name: String,
    toggle: bool,
}

#[derive(Default)]
struct Panel;

impl Component for Panel {
    type Props = ();
    type State = PanelState;

    fn initial_state(_props: &()) -> PanelState {
        PanelState { name: "123".into(), toggle: true }
    }

    fn render(&self, ctx: &Context<Self>) -> Rc<Node> {
        let div = element("div");
        let state = ctx.state();
        let link = ctx.link();

        let slot = if state.toggle {
            component::<Badge>(BadgeProps {
                on_click: Listener::new(|event| println!("badge: click on {}", event.target)),
                label: "!231241".into(),
            })
        } else {
            div(Attributes::new(), vec![])
        };

        div(
            Attributes::new().on("onClick", move |event| {
                println!("panel: click on {}", event.target);
                let result = link.set_state(|prev| {
                    Rc::new(PanelState { name: format!("{}1", prev.name), toggle: !prev.toggle })
                });
                if let Err(error) = result {
                    tracing::warn!(%error, "click after unmount");
                }
            }),
            vec![
                slot.into(),
                element("span")(Attributes::new(), vec![state.name.clone().into()]).into(),
            ],
        )
    }

    fn did_mount(&mut self, ctx: &Context<Self>) {
        tracing::info!(handle = ?ctx.handle(), "panel mounted");
    }

    fn did_update(&mut self, ctx: &Context<Self>) {
        tracing::info!(name = %ctx.state().name, "panel updated");
    }
}

fn main() -> spark_vdom::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_settings(Settings::from_env());

    let mut surface = MemorySurface::new();
    let root = surface.add_target("root");

    let handle = mount(&mut surface, "root", component::<Panel>(()))?;
    run_frames(&mut surface, 4)?;
    println!("{}", surface.to_markup(root));

    for _ in 0..3 {
        if let Some(panel) = handle.handle() {
            surface.dispatch(panel, "onClick");
        }
        run_frames(&mut surface, 4)?;
        println!("{}", surface.to_markup(root));
    }

    handle.unmount(&mut surface)?;
    println!("after unmount: {:?}", surface.to_markup(root));
    Ok(())
}
