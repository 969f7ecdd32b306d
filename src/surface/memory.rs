//! In-memory retained surface.
//!
//! Keeps a tree of plain nodes keyed by handle. Useful for asserting what a
//! patch did without a real display, and for driving listeners by hand.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ReconcileError, Result};
use crate::types::SurfaceHandle;
use crate::vdom::{AttrValue, Event, Listener};
use super::Surface;

#[derive(Debug)]
enum Content {
    Element(String),
    Text(String),
    Target(String),
}

#[derive(Debug)]
struct Retained {
    content: Content,
    attrs: BTreeMap<String, String>,
    listeners: BTreeMap<String, Listener>,
    children: Vec<SurfaceHandle>,
    parent: Option<SurfaceHandle>,
}

impl Retained {
    fn new(content: Content) -> Self {
        Self {
            content,
            attrs: BTreeMap::new(),
            listeners: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Retained-tree surface kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: HashMap<SurfaceHandle, Retained>,
    targets: HashMap<String, SurfaceHandle>,
    next: u64,
    mutations: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named mount target.
    pub fn add_target(&mut self, name: &str) -> SurfaceHandle {
        let handle = self.insert(Content::Target(name.to_string()));
        self.targets.insert(name.to_string(), handle);
        handle
    }

    fn insert(&mut self, content: Content) -> SurfaceHandle {
        self.next += 1;
        let handle = SurfaceHandle(self.next);
        self.nodes.insert(handle, Retained::new(content));
        handle
    }

    fn node(&self, handle: SurfaceHandle) -> Result<&Retained> {
        self.nodes.get(&handle).ok_or(ReconcileError::UnknownHandle(handle))
    }

    fn node_mut(&mut self, handle: SurfaceHandle) -> Result<&mut Retained> {
        self.nodes.get_mut(&handle).ok_or(ReconcileError::UnknownHandle(handle))
    }

    /// Unlink `handle` from its current parent, if any.
    fn detach(&mut self, handle: SurfaceHandle) -> Result<()> {
        let Some(parent) = self.node_mut(handle)?.parent.take() else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|child| *child != handle);
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Tag of an element node.
    pub fn tag(&self, handle: SurfaceHandle) -> Option<&str> {
        match &self.nodes.get(&handle)?.content {
            Content::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, handle: SurfaceHandle) -> Option<&str> {
        match &self.nodes.get(&handle)?.content {
            Content::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn attribute(&self, handle: SurfaceHandle, key: &str) -> Option<&str> {
        self.nodes.get(&handle)?.attrs.get(key).map(String::as_str)
    }

    pub fn has_listener(&self, handle: SurfaceHandle, key: &str) -> bool {
        self.nodes
            .get(&handle)
            .is_some_and(|node| node.listeners.contains_key(key))
    }

    pub fn children(&self, handle: SurfaceHandle) -> &[SurfaceHandle] {
        self.nodes
            .get(&handle)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, handle: SurfaceHandle) -> Option<SurfaceHandle> {
        self.nodes.get(&handle)?.parent
    }

    /// Number of mutating calls made so far (creation included).
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Fire the listener bound under `key` on `handle`.
    ///
    /// Returns false if nothing is bound there.
    pub fn dispatch(&self, handle: SurfaceHandle, key: &str) -> bool {
        let Some(listener) = self
            .nodes
            .get(&handle)
            .and_then(|node| node.listeners.get(key))
            .cloned()
        else {
            return false;
        };
        listener.call(&Event { name: key.to_string(), target: handle });
        true
    }

    /// Serialize the subtree at `handle` as markup.
    ///
    /// Listeners are not rendered. Mount targets render only their children.
    pub fn to_markup(&self, handle: SurfaceHandle) -> String {
        let mut out = String::new();
        self.write_markup(handle, &mut out);
        out
    }

    fn write_markup(&self, handle: SurfaceHandle, out: &mut String) {
        let Some(node) = self.nodes.get(&handle) else { return };
        match &node.content {
            Content::Text(value) => out.push_str(value),
            Content::Target(_) => {
                for child in &node.children {
                    self.write_markup(*child, out);
                }
            }
            Content::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in &node.attrs {
                    out.push_str(&format!(" {key}=\"{value}\""));
                }
                out.push('>');
                for child in &node.children {
                    self.write_markup(*child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

impl Surface for MemorySurface {
    fn create_element(&mut self, tag: &str) -> SurfaceHandle {
        self.mutations += 1;
        self.insert(Content::Element(tag.to_string()))
    }

    fn create_text(&mut self, value: &str) -> SurfaceHandle {
        self.mutations += 1;
        self.insert(Content::Text(value.to_string()))
    }

    fn bind_attribute(
        &mut self,
        handle: SurfaceHandle,
        key: &str,
        value: &AttrValue,
    ) -> Result<()> {
        self.mutations += 1;
        let node = self.node_mut(handle)?;
        match value {
            AttrValue::Listener(listener) => {
                node.listeners.insert(key.to_string(), listener.clone());
            }
            other => {
                if let Some(text) = other.as_text() {
                    node.attrs.insert(key.to_string(), text);
                }
            }
        }
        Ok(())
    }

    fn unbind_attribute(&mut self, handle: SurfaceHandle, key: &str) -> Result<()> {
        self.mutations += 1;
        let node = self.node_mut(handle)?;
        node.attrs.remove(key);
        node.listeners.remove(key);
        Ok(())
    }

    fn append_child(&mut self, parent: SurfaceHandle, child: SurfaceHandle) -> Result<()> {
        self.mutations += 1;
        self.node(parent)?;
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn replace_child(&mut self, old: SurfaceHandle, new: SurfaceHandle) -> Result<()> {
        self.mutations += 1;
        let Some(parent) = self.node(old)?.parent else {
            return Ok(());
        };
        self.detach(new)?;

        let siblings = &mut self.node_mut(parent)?.children;
        if let Some(slot) = siblings.iter_mut().find(|child| **child == old) {
            *slot = new;
        }
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, handle: SurfaceHandle) -> Result<()> {
        self.mutations += 1;
        self.detach(handle)
    }

    fn set_text_content(&mut self, handle: SurfaceHandle, value: &str) -> Result<()> {
        self.mutations += 1;
        if let Content::Text(text) = &mut self.node_mut(handle)?.content {
            *text = value.to_string();
            return Ok(());
        }

        // Element text content replaces all children with one text node.
        let old_children = std::mem::take(&mut self.node_mut(handle)?.children);
        for child in old_children {
            self.node_mut(child)?.parent = None;
        }
        let text = self.insert(Content::Text(value.to_string()));
        self.node_mut(text)?.parent = Some(handle);
        self.node_mut(handle)?.children.push(text);
        Ok(())
    }

    fn find_target(&self, name: &str) -> Option<SurfaceHandle> {
        self.targets.get(name).copied()
    }
}
