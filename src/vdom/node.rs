//! Snapshot nodes and their builders.
//!
//! A snapshot is an `Rc<Node>`. Nodes are never mutated after construction;
//! each render builds a fresh tree, optionally sharing subtrees that did not
//! change. Every node gets a fresh [`NodeId`] when it is built, which is what
//! the identity map and the instance table key on.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::component::{Body, Component, Holder};
use crate::types::NodeId;
use super::attrs::Attributes;

// =============================================================================
// Id Allocation
// =============================================================================

thread_local! {
    /// Next snapshot id for this thread.
    static NEXT_NODE_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_node_id() -> NodeId {
    NEXT_NODE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        NodeId(id)
    })
}

// =============================================================================
// Node
// =============================================================================

/// One node of a snapshot tree.
pub struct Node {
    id: NodeId,
    kind: NodeKind,
}

/// The three node variants.
pub enum NodeKind {
    Text(String),
    Element(Element),
    Component(ComponentRef),
}

impl Node {
    fn new(kind: NodeKind) -> Rc<Self> {
        Rc::new(Self { id: next_node_id(), kind })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match &self.kind {
            NodeKind::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Children of an element; empty for text and component references.
    pub fn children(&self) -> &[Rc<Node>] {
        match &self.kind {
            NodeKind::Element(element) => &element.children,
            _ => &[],
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Text(value) => write!(f, "Text#{}({:?})", self.id.get(), value),
            NodeKind::Element(element) => f
                .debug_struct(&format!("<{}>#{}", element.tag, self.id.get()))
                .field("attrs", &element.attrs)
                .field("children", &element.children)
                .finish(),
            NodeKind::Component(component) => {
                write!(f, "{}#{}", component.kind.name, self.id.get())
            }
        }
    }
}

// =============================================================================
// Element
// =============================================================================

/// A tagged element with attributes and ordered children.
#[derive(Debug)]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Rc<Node>>,
}

// =============================================================================
// Component Reference
// =============================================================================

/// Reference to a component type plus the props to render it with.
///
/// The live instance is not stored here; the instance table keys it by the
/// reference's [`NodeId`].
pub struct ComponentRef {
    pub kind: ComponentKind,
    pub props: Rc<dyn Any>,
}

impl ComponentRef {
    /// Reference-equality of props, the fast path for skipping an update.
    pub fn same_props(&self, other: &ComponentRef) -> bool {
        Rc::ptr_eq(&self.props, &other.props)
    }
}

/// Type identity and constructor for a component type.
#[derive(Clone, Copy)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
    create: fn() -> Box<dyn Body>,
}

impl ComponentKind {
    /// Kind descriptor for component type `C`.
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            create: Holder::<C>::create,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name of the component.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Body> {
        (self.create)()
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// Builders
// =============================================================================

/// A child passed to an element factory: a snapshot or a raw string.
pub enum Child {
    Node(Rc<Node>),
    Text(String),
}

impl From<Rc<Node>> for Child {
    fn from(node: Rc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<&Rc<Node>> for Child {
    fn from(node: &Rc<Node>) -> Self {
        Self::Node(node.clone())
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Child {
    fn into_node(self) -> Rc<Node> {
        match self {
            Self::Node(node) => node,
            Self::Text(value) => text(value),
        }
    }
}

/// Create a text snapshot.
pub fn text(value: impl Into<String>) -> Rc<Node> {
    Node::new(NodeKind::Text(value.into()))
}

/// Create an element factory for `tag`.
///
/// The factory builds a fresh element from attributes and children; string
/// children are wrapped as text snapshots.
///
/// ```ignore
/// let div = element("div");
/// let node = div(Attributes::new().with("class", "row"), vec!["hello".into()]);
/// ```
pub fn element(tag: impl Into<String>) -> impl Fn(Attributes, Vec<Child>) -> Rc<Node> {
    let tag = tag.into();
    move |attrs, children| {
        Node::new(NodeKind::Element(Element {
            tag: tag.clone(),
            attrs,
            children: children.into_iter().map(Child::into_node).collect(),
        }))
    }
}

/// Create a component reference for `C`.
///
/// Passing an existing `Rc` of props lets a parent re-render hand the same
/// props to the child, which the diff treats as "nothing to do".
pub fn component<C: Component>(props: impl Into<Rc<C::Props>>) -> Rc<Node> {
    let props: Rc<C::Props> = props.into();
    Node::new(NodeKind::Component(ComponentRef {
        kind: ComponentKind::of::<C>(),
        props,
    }))
}
