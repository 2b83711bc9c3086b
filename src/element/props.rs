//! Props - the property map carried by an element.
//!
//! Ordinary props live in an ordered string-keyed map and are what the
//! host sees. The reserved entries (`children`, the error-boundary catch
//! handler and fallback) are typed fields instead of map keys.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::Node;
use crate::error::{ComponentError, ErrorInfo};
use crate::types::Value;

/// Error-boundary catch capability.
pub type CatchHandler = Rc<dyn Fn(&ComponentError, &ErrorInfo)>;

/// Content rendered in place of a boundary's children.
#[derive(Clone)]
pub enum Fallback {
    /// Fixed content.
    Node(Node),
    /// Content computed from the caught failure.
    Render(Rc<dyn Fn(&ComponentError) -> Node>),
}

impl Fallback {
    /// Produce the fallback content, given the failure if there is one.
    pub fn resolve(&self, error: Option<&ComponentError>) -> Node {
        match (self, error) {
            (Self::Node(node), _) => node.clone(),
            (Self::Render(render), Some(error)) => render(error),
            (Self::Render(_), None) => Node::Empty,
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Render(a), Self::Render(b)) => Rc::ptr_eq(a, b),
            (Self::Node(a), Self::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Element properties.
#[derive(Clone, Default)]
pub struct Props {
    attrs: BTreeMap<String, Value>,
    children: Rc<Vec<Node>>,
    catch: Option<CatchHandler>,
    fallback: Option<Fallback>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Add a prop.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Add an event handler prop.
    pub fn on(self, event: impl Into<String>, handler: impl Fn(&Value) + 'static) -> Self {
        self.with(event, Value::handler(handler))
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children = Rc::new(children.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the error-catch capability, making this element an error boundary.
    pub fn on_catch(mut self, handler: impl Fn(&ComponentError, &ErrorInfo) + 'static) -> Self {
        self.catch = Some(Rc::new(handler));
        self
    }

    /// Fixed fallback content.
    pub fn with_fallback(mut self, fallback: impl Into<Node>) -> Self {
        self.fallback = Some(Fallback::Node(fallback.into()));
        self
    }

    /// Fallback content computed from the caught failure.
    pub fn with_fallback_fn(mut self, render: impl Fn(&ComponentError) -> Node + 'static) -> Self {
        self.fallback = Some(Fallback::Render(Rc::new(render)));
        self
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attrs.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Borrow an `Any` prop as `T`.
    pub fn get_any<T: 'static>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(Value::downcast_ref::<T>)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Iterate ordinary props in key order. Reserved entries are not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn catch(&self) -> Option<&CatchHandler> {
        self.catch.as_ref()
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    /// True if this element declares the error-catch capability.
    pub fn is_error_boundary(&self) -> bool {
        self.catch.is_some()
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Equality of the props a host sees (reserved entries ignored).
    pub fn host_eq(&self, other: &Self) -> bool {
        self.attrs == other.attrs
    }

    /// Shallow equality: same keys, identical values, same children list.
    ///
    /// This is the default comparison for memoized components.
    pub fn shallow_eq(&self, other: &Self) -> bool {
        let same_children = Rc::ptr_eq(&self.children, &other.children)
            || (self.children.is_empty() && other.children.is_empty());
        let same_catch = match (&self.catch, &other.catch) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        let same_fallback = match (&self.fallback, &other.fallback) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        self.host_eq(other) && same_children && same_catch && same_fallback
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.attrs.iter());
        if !self.children.is_empty() {
            map.entry(&"children", &self.children.len());
        }
        if self.catch.is_some() {
            map.entry(&"catch", &"..");
        }
        map.finish()
    }
}
