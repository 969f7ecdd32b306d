//! Attributes, event listeners and attribute deltas.
//!
//! Attribute values are typed. A listener is its own variant, so the surface
//! never has to guess from a key's spelling whether a binding is an event
//! handler or a plain attribute.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::types::SurfaceHandle;

// =============================================================================
// Events
// =============================================================================

/// An event delivered by the surface to a bound listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Attribute key the listener was bound under (e.g. `"onClick"`).
    pub name: String,
    /// Surface node the event fired on.
    pub target: SurfaceHandle,
}

/// Shared event callback.
///
/// Listeners compare by identity: re-creating the closure on every render
/// produces a delta entry and a re-bind.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the listener.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Attribute Value
// =============================================================================

/// Value bound under an attribute key.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
}

impl AttrValue {
    /// True if this binding is an event listener.
    #[inline]
    pub fn is_listener(&self) -> bool {
        matches!(self, Self::Listener(_))
    }

    /// String form used by surfaces that store attributes as text.
    ///
    /// Listeners have no string form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Listener(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Listener> for AttrValue {
    fn from(value: Listener) -> Self {
        Self::Listener(value)
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute and listener bindings of an element, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    /// Empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a plain attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder: add an event listener.
    pub fn on(mut self, key: impl Into<String>, f: impl Fn(&Event) + 'static) -> Self {
        self.0.insert(key.into(), AttrValue::Listener(Listener::new(f)));
        self
    }

    /// Insert or overwrite a binding.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Attribute Delta
// =============================================================================

/// Changed bindings between two attribute sets.
///
/// `None` means the key was dropped and must be unbound.
pub type AttrDelta = BTreeMap<String, Option<AttrValue>>;

/// Compute the minimal attribute delta from `old` to `new`.
///
/// Keys whose value is unchanged are omitted. Keys missing from `new` map to
/// `None`. Keys new in `new`, or with a different value, map to the new value.
pub fn diff_attrs(old: &Attributes, new: &Attributes) -> AttrDelta {
    let mut delta = AttrDelta::new();

    for (key, old_value) in old.iter() {
        match new.get(key) {
            Some(new_value) if new_value == old_value => {}
            new_value => {
                delta.insert(key.clone(), new_value.cloned());
            }
        }
    }

    for (key, new_value) in new.iter() {
        if !old.contains_key(key) {
            delta.insert(key.clone(), Some(new_value.clone()));
        }
    }

    delta
}
