//! Function components, memoization and ref forwarding.

use std::fmt;
use std::rc::Rc;

use crate::element::{Element, Node, Props, create_element};
use crate::error::Throw;
use crate::hooks::Scope;

/// What a component returns: output, or a reason it has none.
pub type Render = Result<Node, Throw>;

/// Props comparison used by memoized components. `true` means "equal, skip".
pub type PropsCompare = Rc<dyn Fn(&Props, &Props) -> bool>;

type RenderFn = dyn Fn(&mut Scope<'_>, &Props) -> Render;

/// A function component.
///
/// Identity matters: two components are the same type only if they are
/// clones of the same `Component` value. Create components once and reuse
/// them rather than building a fresh one on every render.
///
/// ```ignore
/// let greeting = Component::new("Greeting", |cx, props| {
///     let (count, set_count) = cx.use_state(0);
///     Ok(create_element("span", Props::new(), [format!("{} {count}", props.get_str("name").unwrap_or(""))]).into())
/// });
/// ```
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

struct ComponentInner {
    name: Rc<str>,
    render: Rc<RenderFn>,
    compare: Option<PropsCompare>,
}

impl Component {
    pub fn new<F>(name: impl Into<Rc<str>>, render: F) -> Self
    where
        F: Fn(&mut Scope<'_>, &Props) -> Render + 'static,
    {
        Self {
            inner: Rc::new(ComponentInner {
                name: name.into(),
                render: Rc::new(render),
                compare: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// True if this component skips renders when its props compare equal.
    pub fn is_memo(&self) -> bool {
        self.inner.compare.is_some()
    }

    /// Build an element of this component with no children.
    pub fn element(&self, props: Props) -> Element {
        create_element(self, props, Vec::<Node>::new())
    }

    pub(crate) fn compare(&self) -> Option<&PropsCompare> {
        self.inner.compare.as_ref()
    }

    pub(crate) fn render(&self, scope: &mut Scope<'_>, props: &Props) -> Render {
        (self.inner.render)(scope, props)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.inner.name)
            .field("memo", &self.is_memo())
            .finish()
    }
}

// =============================================================================
// memo / forward_ref
// =============================================================================

/// Wrap a component so it re-renders only when its props change
/// (shallow comparison).
pub fn memo(component: &Component) -> Component {
    memo_with(component, |prev, next| prev.shallow_eq(next))
}

/// Wrap a component with a custom props comparison.
///
/// When `compare(prev, next)` returns `true` and a previous output exists,
/// the previous output is reused without calling the component or touching
/// its hooks.
pub fn memo_with(
    component: &Component,
    compare: impl Fn(&Props, &Props) -> bool + 'static,
) -> Component {
    Component {
        inner: Rc::new(ComponentInner {
            name: component.inner.name.clone(),
            render: component.inner.render.clone(),
            compare: Some(Rc::new(compare)),
        }),
    }
}

/// Identity pass-through. Refs travel as ordinary props.
pub fn forward_ref(component: Component) -> Component {
    component
}
