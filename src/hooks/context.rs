//! Context - values provided to a whole subtree.
//!
//! A context holds one shared cell. Rendering its provider writes the cell;
//! [`Scope::use_context`] reads it. Reads fall back to the default when no
//! provider has rendered during the current pass.
//!
//! The cell is not scoped: providers of the same context nested inside each
//! other share it, so after an inner provider renders, later readers under
//! the outer provider see the inner value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::Scope;
use crate::element::{Element, Node, Props, create_element};
use crate::primitives::Component;
use crate::types::Value;

const VALUE_PROP: &str = "value";

struct Provided<T> {
    pass: u64,
    value: T,
}

/// A context object created by [`create_context`].
pub struct Context<T> {
    default: Rc<T>,
    cell: Rc<RefCell<Option<Provided<T>>>>,
    provider: Component,
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            default: self.default.clone(),
            cell: self.cell.clone(),
            provider: self.provider.clone(),
        }
    }
}

/// Create a context whose readers see `default` outside any provider.
pub fn create_context<T: Clone + 'static>(default: T) -> Context<T> {
    let cell: Rc<RefCell<Option<Provided<T>>>> = Rc::new(RefCell::new(None));
    let writer = cell.clone();

    let provider = Component::new("Provider", move |cx, props| {
        match props.get_any::<T>(VALUE_PROP) {
            Some(value) => {
                *writer.borrow_mut() = Some(Provided {
                    pass: cx.pass(),
                    value: value.clone(),
                });
            }
            None => warn!(path = %cx.path(), "context provider rendered without a value"),
        }
        Ok(Node::List(props.children().to_vec()))
    });

    Context {
        default: Rc::new(default),
        cell,
        provider,
    }
}

impl<T: Clone + 'static> Context<T> {
    /// A provider element giving `value` to `children`.
    pub fn provider<I>(&self, value: T, children: I) -> Element
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        create_element(&self.provider, Props::new().with(VALUE_PROP, Value::any(value)), children)
    }

    /// The provider component itself.
    pub fn provider_component(&self) -> &Component {
        &self.provider
    }

    fn read(&self, pass: u64) -> T {
        match &*self.cell.borrow() {
            Some(provided) if provided.pass == pass => provided.value.clone(),
            _ => (*self.default).clone(),
        }
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("provided", &self.cell.borrow().is_some())
            .finish()
    }
}

impl Scope<'_> {
    /// Current value of `context` for this render.
    ///
    /// Does not claim a hook slot.
    pub fn use_context<T: Clone + 'static>(&mut self, context: &Context<T>) -> T {
        self.mark_reads_context();
        context.read(self.pass())
    }

    pub(crate) fn pass(&self) -> u64 {
        self.scheduler.current_pass()
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::HookHarness;
    use super::*;

    #[test]
    fn test_default_without_provider() {
        let theme = create_context("light");
        let mut h = HookHarness::new();
        assert_eq!(h.render(|cx| cx.use_context(&theme)), "light");
    }

    #[test]
    fn test_provider_element_carries_value() {
        let theme = create_context(String::from("light"));
        let el = theme.provider(String::from("dark"), ["child"]);
        assert_eq!(el.props().get_any::<String>(VALUE_PROP).map(String::as_str), Some("dark"));
        assert_eq!(el.children().len(), 1);
    }
}
