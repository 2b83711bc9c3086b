//! Core types for act-core.
//!
//! These types define the foundation that everything builds on.
//! They flow from element descriptors through the work-unit tree and
//! define what the host backends understand.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Value - Dynamic property value
// =============================================================================

/// Event handler stored in a prop (e.g. `onClick`).
///
/// Handlers are compared by identity, never by behavior.
pub type Handler = Rc<dyn Fn(&Value)>;

/// A property value carried in [`Props`](crate::element::Props).
///
/// Primitive variants compare by value. `Handler` and `Any` compare by
/// pointer identity, which is the shallow comparison used for memoization
/// and for deciding whether a host update is needed.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent / null value.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Callback invoked by the host when an event fires.
    Handler(Handler),
    /// Arbitrary application value (context values, refs, opaque data).
    Any(Rc<dyn Any>),
}

impl Value {
    /// Wrap a closure as a handler value.
    pub fn handler(f: impl Fn(&Value) + 'static) -> Self {
        Self::Handler(Rc::new(f))
    }

    /// Wrap an arbitrary value.
    pub fn any<T: 'static>(value: T) -> Self {
        Self::Any(Rc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Borrow the inner value of an `Any` variant as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Any(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => Rc::ptr_eq(a, b),
            (Self::Any(a), Self::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Any(_) => f.write_str("Any(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Handler(_) => f.write_str("[handler]"),
            Self::Any(_) => f.write_str("[object]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<Handler> for Value {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

// =============================================================================
// Path - Positional identity
// =============================================================================

/// Positional identity of a tree position: `root.0.1.f0`.
///
/// Hook state and the diff are keyed by path, so a path is stable across
/// renders as long as the shape and element types above it are unchanged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Rc<str>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self(Rc::from("root"))
    }

    /// Path of the `index`-th regular child.
    pub fn child(&self, index: usize) -> Self {
        Self(Rc::from(format!("{}.{index}", self.0)))
    }

    /// Path of the `index`-th child of a fallback branch.
    ///
    /// Fallback content gets its own segment so it never shares hook state
    /// with the children it replaces.
    pub fn fallback_child(&self, index: usize) -> Self {
        Self(Rc::from(format!("{}.f{index}", self.0)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `self` is `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &Path) -> bool {
        match self.0.strip_prefix(&*ancestor.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }

    /// True if `self` lies below `ancestor` through its regular children,
    /// not through its fallback branch.
    pub fn is_within_children(&self, ancestor: &Path) -> bool {
        match self.0.strip_prefix(&*ancestor.0).and_then(|rest| rest.strip_prefix('.')) {
            Some(rest) => !rest.starts_with('f'),
            None => false,
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({})", self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tag - Host instance counter
// =============================================================================

/// Engine-issued number handed to the host with every created instance.
///
/// Bridge-style backends use it as the native view id. The counter starts
/// at 1 and is reset on unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Effect tags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Diff decision recorded on a work unit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EffectTag: u8 {
        const NONE = 0;
        const PLACEMENT = 1 << 0;
        const UPDATE = 1 << 1;
        const DELETION = 1 << 2;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_primitive_equality() {
        assert_eq!(Value::from("x"), Value::from(String::from("x")));
        assert_eq!(Value::from(3), Value::Int(3));
        assert_ne!(Value::from(3), Value::from(3.0));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_value_handler_identity() {
        let a = Value::handler(|_| {});
        let b = Value::handler(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_downcast() {
        let v = Value::any(vec![1, 2, 3]);
        assert_eq!(v.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert!(v.downcast_ref::<String>().is_none());
        assert!(Value::from(1).downcast_ref::<i64>().is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("Hi").to_string(), "Hi");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_path_segments() {
        let root = Path::root();
        assert_eq!(root.child(0).as_str(), "root.0");
        assert_eq!(root.child(0).child(2).as_str(), "root.0.2");
        assert_eq!(root.child(1).fallback_child(0).as_str(), "root.1.f0");
    }

    #[test]
    fn test_path_is_within() {
        let parent = Path::root().child(1);
        assert!(parent.child(0).is_within(&parent));
        assert!(parent.is_within(&parent));
        assert!(!Path::root().child(10).is_within(&parent));
        assert!(!Path::root().is_within(&parent));
    }

    #[test]
    fn test_path_is_within_children() {
        let boundary = Path::root().child(1);
        assert!(boundary.child(0).child(3).is_within_children(&boundary));
        assert!(!boundary.fallback_child(0).is_within_children(&boundary));
        assert!(!boundary.is_within_children(&boundary));
        assert!(!Path::root().child(10).is_within_children(&boundary));
    }

    #[test]
    fn test_effect_tag_flags() {
        let tag = EffectTag::PLACEMENT;
        assert!(tag.contains(EffectTag::PLACEMENT));
        assert!(!tag.intersects(EffectTag::UPDATE | EffectTag::DELETION));
        assert_eq!(EffectTag::default(), EffectTag::NONE);
    }
}
