//! In-memory host.
//!
//! A node tree held in a flat vector, plus a log of every mutation the
//! engine applied. Node handles stay valid for the life of the host, even
//! after a node is detached.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::rc::Rc;

use tracing::trace;

use super::Host;
use crate::element::{NODE_VALUE, Props, TEXT_ELEMENT};
use crate::error::HostError;
use crate::types::{Tag, Value};

/// Handle of a [`MemoryHost`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { id: NodeId, tag: Tag, ty: String },
    Append { parent: Option<NodeId>, child: NodeId },
    Insert { parent: Option<NodeId>, child: NodeId, before: NodeId },
    Update { id: NodeId, changed: Vec<String> },
    Remove { parent: Option<NodeId>, child: NodeId },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Detached,
    Container,
    Node(NodeId),
}

impl Attachment {
    fn of(parent: Option<NodeId>) -> Self {
        match parent {
            Some(id) => Self::Node(id),
            None => Self::Container,
        }
    }
}

struct HostNode {
    tag: Tag,
    ty: Rc<str>,
    props: Props,
    parent: Attachment,
    children: Vec<NodeId>,
}

/// A host backed by an in-memory tree.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    container: Vec<NodeId>,
    log: Vec<Mutation>,
    unsupported: HashSet<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline to create instances of `ty` from now on.
    pub fn set_unsupported(&mut self, ty: impl Into<String>) {
        self.unsupported.insert(ty.into());
    }

    // =========================================================================
    // Mutation log
    // =========================================================================

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Take the log, leaving it empty.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Nodes attached directly to the container.
    pub fn root_children(&self) -> &[NodeId] {
        &self.container
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes.get(id.0)?.parent {
            Attachment::Node(parent) => Some(parent),
            _ => None,
        }
    }

    /// True if `id` is reachable from the container.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.nodes.get(current.0).map(|n| n.parent) {
                Some(Attachment::Container) => return true,
                Some(Attachment::Node(parent)) => current = parent,
                _ => return false,
            }
        }
    }

    pub fn ty(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| &*n.ty)
    }

    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        self.nodes.get(id.0).map(|n| n.tag)
    }

    pub fn props(&self, id: NodeId) -> Option<&Props> {
        self.nodes.get(id.0).map(|n| &n.props)
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.props(id)?.get(key)
    }

    /// Node created with the engine tag `tag`.
    pub fn find_by_tag(&self, tag: Tag) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.tag == tag).map(NodeId)
    }

    /// Attached nodes of type `ty`, in document order.
    pub fn find_by_type(&self, ty: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &id in &self.container {
            self.walk(id, &mut |node_id, node| {
                if &*node.ty == ty {
                    out.push(node_id);
                }
            });
        }
        out
    }

    fn walk(&self, id: NodeId, visit: &mut impl FnMut(NodeId, &HostNode)) {
        if let Some(node) = self.nodes.get(id.0) {
            visit(id, node);
            for &child in &node.children {
                self.walk(child, visit);
            }
        }
    }

    /// Concatenated text of every attached text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for &id in &self.container {
            self.push_text(id, &mut out);
        }
        out
    }

    /// Concatenated text below `id`.
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: NodeId, out: &mut String) {
        self.walk(id, &mut |_, node| {
            if &*node.ty == TEXT_ELEMENT {
                if let Some(value) = node.props.get(NODE_VALUE) {
                    let _ = write!(out, "{value}");
                }
            }
        });
    }

    /// Serialize the attached tree as markup.
    ///
    /// Primitive props become attributes in key order. Handlers and opaque
    /// values are left out.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &id in &self.container {
            self.push_markup(id, &mut out);
        }
        out
    }

    fn push_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if &*node.ty == TEXT_ELEMENT {
            if let Some(value) = node.props.get(NODE_VALUE) {
                let _ = write!(out, "{value}");
            }
            return;
        }

        let _ = write!(out, "<{}", node.ty);
        for (key, value) in node.props.iter() {
            match value {
                Value::Handler(_) | Value::Any(_) | Value::Null => {}
                _ => {
                    let _ = write!(out, " {key}=\"{value}\"");
                }
            }
        }
        out.push('>');
        for &child in &node.children {
            self.push_markup(child, out);
        }
        let _ = write!(out, "</{}>", node.ty);
    }

    /// Invoke the `event` handler prop of `id` with `payload`.
    ///
    /// Returns false if the node has no such handler.
    pub fn dispatch(&self, id: NodeId, event: &str, payload: &Value) -> bool {
        let handler = self
            .attr(id, event)
            .and_then(Value::as_handler)
            .cloned();
        match handler {
            Some(handler) => {
                trace!(?id, event, "dispatching event");
                handler(payload);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Tree surgery
    // =========================================================================

    fn live(&self, id: NodeId) -> Result<(), HostError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(HostError::MissingInstance)
        }
    }

    fn child_list(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            Some(id) => &mut self.nodes[id.0].children,
            None => &mut self.container,
        }
    }

    /// Remove `child` from wherever it is attached.
    fn detach(&mut self, child: NodeId) {
        let parent = match self.nodes[child.0].parent {
            Attachment::Detached => return,
            Attachment::Container => None,
            Attachment::Node(parent) => Some(parent),
        };
        self.child_list(parent).retain(|&c| c != child);
        self.nodes[child.0].parent = Attachment::Detached;
    }
}

impl Host for MemoryHost {
    type Instance = NodeId;

    fn create_instance(&mut self, tag: Tag, ty: &str, props: &Props) -> Option<NodeId> {
        if self.unsupported.contains(ty) {
            return None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(HostNode {
            tag,
            ty: Rc::from(ty),
            props: props.clone(),
            parent: Attachment::Detached,
            children: Vec::new(),
        });
        self.log.push(Mutation::Create {
            id,
            tag,
            ty: ty.to_string(),
        });
        Some(id)
    }

    fn append_child(&mut self, parent: Option<&NodeId>, child: &NodeId) -> Result<(), HostError> {
        let parent = parent.copied();
        let child = *child;
        self.live(child)?;
        if let Some(parent) = parent {
            self.live(parent)?;
        }

        self.detach(child);
        self.child_list(parent).push(child);
        self.nodes[child.0].parent = Attachment::of(parent);
        self.log.push(Mutation::Append { parent, child });
        Ok(())
    }

    fn insert_before(&mut self, parent: Option<&NodeId>, child: &NodeId, before: &NodeId) -> Result<(), HostError> {
        let parent = parent.copied();
        let (child, before) = (*child, *before);
        self.live(child)?;
        self.live(before)?;
        if child == before || self.nodes[before.0].parent != Attachment::of(parent) {
            return Err(HostError::NotAChild);
        }

        self.detach(child);
        let list = self.child_list(parent);
        let index = list.iter().position(|&c| c == before).unwrap_or(list.len());
        list.insert(index, child);
        self.nodes[child.0].parent = Attachment::of(parent);
        self.log.push(Mutation::Insert { parent, child, before });
        Ok(())
    }

    fn remove_child(&mut self, parent: Option<&NodeId>, child: &NodeId) -> Result<(), HostError> {
        let parent = parent.copied();
        let child = *child;
        self.live(child)?;
        if self.nodes[child.0].parent != Attachment::of(parent) {
            return Err(HostError::NotAChild);
        }

        self.detach(child);
        self.log.push(Mutation::Remove { parent, child });
        Ok(())
    }

    fn commit_update(&mut self, instance: &NodeId, old: &Props, new: &Props) -> Result<(), HostError> {
        let id = *instance;
        self.live(id)?;

        let mut changed: Vec<String> = old
            .iter()
            .filter(|&(key, value)| new.get(key) != Some(value))
            .map(|(key, _)| key.to_string())
            .collect();
        changed.extend(
            new.iter()
                .filter(|&(key, _)| !old.contains(key))
                .map(|(key, _)| key.to_string()),
        );
        changed.sort();

        self.nodes[id.0].props = new.clone();
        if !changed.is_empty() {
            self.log.push(Mutation::Update { id, changed });
        }
        Ok(())
    }

    fn clear(&mut self) {
        for id in std::mem::take(&mut self.container) {
            self.nodes[id.0].parent = Attachment::Detached;
        }
        self.log.push(Mutation::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(host: &mut MemoryHost, tag: u32, value: &str) -> NodeId {
        let props = Props::new().with(NODE_VALUE, value);
        host.create_instance(Tag(tag), TEXT_ELEMENT, &props).unwrap()
    }

    #[test]
    fn test_build_and_serialize() {
        let mut host = MemoryHost::new();
        let div = host
            .create_instance(Tag(1), "div", &Props::new().with("id", "a").on("onClick", |_| {}))
            .unwrap();
        let hi = text(&mut host, 2, "Hi");
        host.append_child(Some(&div), &hi).unwrap();
        host.append_child(None, &div).unwrap();

        assert_eq!(host.to_markup(), "<div id=\"a\">Hi</div>");
        assert_eq!(host.text_content(), "Hi");
        assert_eq!(host.find_by_tag(Tag(2)), Some(hi));
        assert_eq!(host.find_by_type("div"), vec![div]);
    }

    #[test]
    fn test_append_moves_attached_node() {
        let mut host = MemoryHost::new();
        let a = host.create_instance(Tag(1), "a", &Props::new()).unwrap();
        let b = host.create_instance(Tag(2), "b", &Props::new()).unwrap();
        host.append_child(None, &a).unwrap();
        host.append_child(None, &b).unwrap();
        host.append_child(Some(&b), &a).unwrap();

        assert_eq!(host.root_children(), &[b]);
        assert_eq!(host.parent_of(a), Some(b));
    }

    #[test]
    fn test_insert_before_orders_children() {
        let mut host = MemoryHost::new();
        let x = text(&mut host, 1, "x");
        let y = text(&mut host, 2, "y");
        host.append_child(None, &y).unwrap();
        host.insert_before(None, &x, &y).unwrap();
        assert_eq!(host.text_content(), "xy");

        let z = text(&mut host, 3, "z");
        assert!(matches!(host.insert_before(None, &y, &z), Err(HostError::NotAChild)));
    }

    #[test]
    fn test_remove_non_child_fails() {
        let mut host = MemoryHost::new();
        let a = host.create_instance(Tag(1), "a", &Props::new()).unwrap();
        assert!(matches!(host.remove_child(None, &a), Err(HostError::NotAChild)));
        host.append_child(None, &a).unwrap();
        host.remove_child(None, &a).unwrap();
        assert!(!host.is_attached(a));
    }

    #[test]
    fn test_commit_update_records_changed_keys() {
        let mut host = MemoryHost::new();
        let old = Props::new().with("a", 1).with("b", 2);
        let new = Props::new().with("a", 1).with("c", 3);
        let id = host.create_instance(Tag(1), "div", &old).unwrap();
        host.take_mutations();

        host.commit_update(&id, &old, &new).unwrap();
        assert_eq!(
            host.take_mutations(),
            vec![Mutation::Update {
                id,
                changed: vec!["b".to_string(), "c".to_string()],
            }]
        );
        assert_eq!(host.attr(id, "c"), Some(&Value::Int(3)));
        assert!(host.attr(id, "b").is_none());
    }

    #[test]
    fn test_unsupported_type_declined() {
        let mut host = MemoryHost::new();
        host.set_unsupported("canvas");
        assert!(host.create_instance(Tag(1), "canvas", &Props::new()).is_none());
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_dispatch_calls_handler() {
        use std::cell::Cell;

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let mut host = MemoryHost::new();
        let props = Props::new().on("onClick", move |v| seen.set(seen.get() + v.as_int().unwrap_or(0)));
        let button = host.create_instance(Tag(1), "button", &props).unwrap();

        assert!(host.dispatch(button, "onClick", &Value::from(5)));
        assert!(!host.dispatch(button, "onHover", &Value::Null));
        assert_eq!(hits.get(), 5);
    }

    #[test]
    fn test_clear_detaches_everything() {
        let mut host = MemoryHost::new();
        let a = host.create_instance(Tag(1), "a", &Props::new()).unwrap();
        host.append_child(None, &a).unwrap();
        host.clear();
        assert!(host.root_children().is_empty());
        assert_eq!(host.mutations().last(), Some(&Mutation::Clear));
    }
}
