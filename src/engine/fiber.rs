//! Work units and the arena that owns them.
//!
//! Fibers link to each other by [`FiberId`], never by reference. Ids are
//! recycled through a free list the way component indices are: release an
//! id and the next allocation takes it back.

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::element::{ElementType, Props};
use crate::error::ComponentError;
use crate::hooks::QueuedEffect;
use crate::primitives::Pending;
use crate::types::{EffectTag, Path};

/// Stable index of a fiber in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct FiberId(usize);

/// Error-boundary state. Once set it stays set for the life of the mount.
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundaryState {
    pub(crate) has_error: bool,
    pub(crate) error: Option<ComponentError>,
}

/// Suspense-boundary state.
#[derive(Debug, Clone, Default)]
pub(crate) struct SuspenseState {
    pub(crate) did_throw: bool,
    /// The pending value that redirected this boundary.
    pub(crate) waiting_on: Option<Pending>,
}

impl SuspenseState {
    /// State to carry into the next render: kept only while still waiting.
    pub(crate) fn carried(&self) -> Self {
        match &self.waiting_on {
            Some(pending) if self.did_throw && !pending.is_settled() => self.clone(),
            _ => Self::default(),
        }
    }
}

/// One node of the work-unit tree.
pub(crate) struct Fiber<I> {
    pub(crate) ty: ElementType,
    pub(crate) props: Rc<Props>,
    pub(crate) instance: Option<I>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect_tag: EffectTag,
    pub(crate) path: Path,
    pub(crate) boundary: BoundaryState,
    pub(crate) suspense: SuspenseState,
    /// Effects queued by this unit's last render.
    pub(crate) effects: Vec<QueuedEffect>,
}

impl<I> Fiber<I> {
    pub(crate) fn new(ty: ElementType, props: Rc<Props>, path: Path) -> Self {
        Self {
            ty,
            props,
            instance: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect_tag: EffectTag::NONE,
            path,
            boundary: BoundaryState::default(),
            suspense: SuspenseState::default(),
            effects: Vec::new(),
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

pub(crate) struct FiberArena<I> {
    slots: Vec<Option<Fiber<I>>>,
    free: Vec<usize>,
}

impl<I> Default for FiberArena<I> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<I> FiberArena<I> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a fiber, reusing a freed slot if one exists.
    pub(crate) fn alloc(&mut self, fiber: Fiber<I>) -> FiberId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(fiber);
                FiberId(index)
            }
            None => {
                self.slots.push(Some(fiber));
                FiberId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: FiberId) -> Option<Fiber<I>> {
        let fiber = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(fiber)
    }

    pub(crate) fn get(&self, id: FiberId) -> Option<&Fiber<I>> {
        self.slots.get(id.0)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<I>> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Children of `id` in sibling order.
    pub(crate) fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|f| f.child);
        while let Some(child) = next {
            out.push(child);
            next = self.get(child).and_then(|f| f.sibling);
        }
        out
    }

    /// `root` and everything below it, in pre-order.
    pub(crate) fn preorder(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Release every fiber not reachable from `root`. Returns how many were
    /// released.
    pub(crate) fn sweep(&mut self, root: Option<FiberId>) -> usize {
        let mut keep = vec![false; self.slots.len()];
        if let Some(root) = root {
            for id in self.preorder(root) {
                keep[id.0] = true;
            }
        }
        let mut released = 0;
        for (index, kept) in keep.into_iter().enumerate() {
            if !kept && self.release(FiberId(index)).is_some() {
                released += 1;
            }
        }
        released
    }
}

impl<I> Index<FiberId> for FiberArena<I> {
    type Output = Fiber<I>;

    fn index(&self, id: FiberId) -> &Fiber<I> {
        match self.get(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {id:?} is not live"),
        }
    }
}

impl<I> IndexMut<FiberId> for FiberArena<I> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<I> {
        match self.get_mut(id) {
            Some(fiber) => fiber,
            None => panic!("fiber {id:?} is not live"),
        }
    }
}
