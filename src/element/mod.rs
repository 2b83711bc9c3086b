//! Element descriptors.
//!
//! An [`Element`] is an immutable value saying "render this type with these
//! props and these children". [`Node`] is anything that can appear as a
//! child: an element, text, nothing, or a list of nodes.
//!
//! # Element kinds
//!
//! ```text
//! Host("div")        -> host instance created via the Host Interface
//! Component(f)       -> f(scope, props) produces more nodes
//! Fragment           -> children only, no instance
//! Suspense           -> children, or fallback while something below is pending
//! ```
//!
//! Text and numbers normalize to the synthetic [`TEXT_ELEMENT`] host type
//! with a `nodeValue` prop.

mod props;

use std::fmt;
use std::rc::Rc;

pub use props::*;

use crate::primitives::Component;
use crate::types::Value;

/// Host type used for normalized text children.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Prop holding the text of a [`TEXT_ELEMENT`].
pub const NODE_VALUE: &str = "nodeValue";

// =============================================================================
// ElementType
// =============================================================================

/// The closed set of element kinds.
#[derive(Clone)]
pub enum ElementType {
    /// Host primitive identified by its tag.
    Host(Rc<str>),
    /// Function component.
    Component(Component),
    /// Grouping marker without an instance.
    Fragment,
    /// Suspense boundary marker.
    Suspense,
}

impl ElementType {
    pub fn host(tag: impl Into<Rc<str>>) -> Self {
        Self::Host(tag.into())
    }

    /// Type equality used by the diff: host tags by string, components by
    /// function identity, markers by kind. Props never take part.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => a.ptr_eq(b),
            (Self::Fragment, Self::Fragment) => true,
            (Self::Suspense, Self::Suspense) => true,
            _ => false,
        }
    }

    /// Host tag, if this is a host primitive.
    pub fn host_tag(&self) -> Option<&str> {
        match self {
            Self::Host(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.host_tag() == Some(TEXT_ELEMENT)
    }

    /// Short name for logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Component(c) => c.name(),
            Self::Fragment => "Fragment",
            Self::Suspense => "Suspense",
        }
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => write!(f, "Host({tag})"),
            Self::Component(c) => write!(f, "Component({})", c.name()),
            Self::Fragment => f.write_str("Fragment"),
            Self::Suspense => f.write_str("Suspense"),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        Self::Host(Rc::from(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        Self::Host(Rc::from(tag))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&Component> for ElementType {
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable element descriptor. Cloning is cheap.
#[derive(Clone)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    pub fn new(ty: impl Into<ElementType>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            props: Rc::new(props),
        }
    }

    /// A text element holding `text`.
    pub fn text(text: impl Into<Value>) -> Self {
        let value = match text.into() {
            Value::Str(s) => Value::Str(s),
            other => Value::from(other.to_string()),
        };
        Self::new(ElementType::host(TEXT_ELEMENT), Props::new().with(NODE_VALUE, value))
    }

    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn props_rc(&self) -> Rc<Props> {
        self.props.clone()
    }

    pub fn children(&self) -> &[Node] {
        self.props.children()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.ty.same_as(&other.ty) && Rc::ptr_eq(&self.props, &other.props)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("ty", &self.ty)
            .field("props", &self.props)
            .finish()
    }
}

/// Create an element, flattening list children one level and dropping empties.
///
/// ```ignore
/// let el = create_element("div", Props::new().with("className", "x"), ["Hi"]);
/// ```
pub fn create_element<I>(ty: impl Into<ElementType>, props: Props, children: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    let mut flat = Vec::new();
    for child in children {
        match child.into() {
            Node::Empty => {}
            Node::List(items) => flat.extend(items.into_iter().filter(|n| !n.is_empty())),
            other => flat.push(other),
        }
    }
    let props = if flat.is_empty() { props } else { props.with_children(flat) };
    Element::new(ty, props)
}

/// Group children without a host instance.
pub fn fragment<I>(children: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    create_element(ElementType::Fragment, Props::new(), children)
}

// =============================================================================
// Node
// =============================================================================

/// Anything that can appear in a child position.
#[derive(Clone, Default)]
pub enum Node {
    /// Renders nothing (`null`, `false`).
    #[default]
    Empty,
    Text(Rc<str>),
    Element(Element),
    List(Vec<Node>),
}

impl Node {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(t) => write!(f, "Text({t:?})"),
            Self::Element(e) => fmt::Debug::fmt(e, f),
            Self::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(Rc::from(text))
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(Rc::from(text))
    }
}

impl From<Rc<str>> for Node {
    fn from(text: Rc<str>) -> Self {
        Self::Text(text)
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Self::Text(Rc::from(n.to_string()))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Self::Text(Rc::from(n.to_string()))
    }
}

impl From<u32> for Node {
    fn from(n: u32) -> Self {
        Self::Text(Rc::from(n.to_string()))
    }
}

impl From<usize> for Node {
    fn from(n: usize) -> Self {
        Self::Text(Rc::from(n.to_string()))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Self::Text(Rc::from(n.to_string()))
    }
}

/// Booleans render nothing, so `cond && el`-style children can be written
/// as `cond.then(|| el)` or passed as plain `false`.
impl From<bool> for Node {
    fn from(_: bool) -> Self {
        Self::Empty
    }
}

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Turn child nodes into the element sequence the reconciler walks.
///
/// Lists are flattened, empties dropped, text becomes [`TEXT_ELEMENT`].
pub(crate) fn normalize_children(nodes: &[Node]) -> Vec<Element> {
    let mut out = Vec::with_capacity(nodes.len());
    push_normalized(nodes, &mut out);
    out
}

fn push_normalized(nodes: &[Node], out: &mut Vec<Element>) {
    for node in nodes {
        match node {
            Node::Empty => {}
            Node::Text(text) => out.push(Element::text(text.clone())),
            Node::Element(element) => out.push(element.clone()),
            Node::List(items) => push_normalized(items, out),
        }
    }
}
