//! Hook Store - per-path persistent hook state.
//!
//! Every component position ([`Path`]) owns a [`HookState`]: an ordered
//! vector of slots plus a cursor that restarts at 0 on each render of that
//! path. Hooks claim slots in call order, so a component must call the same
//! hooks in the same order on every render.
//!
//! Slots are type-checked. If the hook at a position changes type (a
//! conditional hook call), the slot is re-initialized and a warning is
//! logged; the engine does not panic.
//!
//! Components reach the store through a [`Scope`], which carries the
//! component's path and the scheduler used by setters.

mod context;
mod effect;
mod memo;
mod state;

use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

pub use context::{Context, create_context};
pub use effect::{Cleanup, IntoEffectOutcome, cleanup};
pub use memo::{Callback, Ref};
pub use state::{Dispatch, Setter};

pub(crate) use effect::{EffectKind, EffectSlot, QueuedEffect};

use crate::element::{Node, Props};
use crate::engine::Scheduler;
use crate::primitives::Component;
use crate::types::Path;

type Slot = Option<Box<dyn Any>>;

// =============================================================================
// HookState
// =============================================================================

/// Hook slots of one component path.
pub(crate) struct HookState {
    pub(crate) component: Component,
    slots: Vec<Slot>,
    cursor: usize,
    /// Props of the last completed render (memo comparison).
    pub(crate) prev_props: Option<Rc<Props>>,
    /// Output of the last completed render (memo short-circuit).
    pub(crate) prev_output: Option<Node>,
    /// Set by this path's setters until the next render.
    stale: Rc<Cell<bool>>,
    /// Whether the last render read a context.
    reads_context: bool,
}

impl HookState {
    fn new(component: Component) -> Self {
        Self {
            component,
            slots: Vec::new(),
            cursor: 0,
            prev_props: None,
            prev_output: None,
            stale: Rc::new(Cell::new(false)),
            reads_context: false,
        }
    }

    /// True if the previous output can stand in for a fresh render: no
    /// setter has fired since, and no context was read.
    pub(crate) fn can_reuse_output(&self) -> bool {
        !self.stale.get() && !self.reads_context
    }

    pub(crate) fn effect_mut(&mut self, index: usize) -> Option<&mut EffectSlot> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .and_then(|slot| slot.downcast_mut::<EffectSlot>())
    }

    /// Take every pending effect cleanup, layout effects first.
    pub(crate) fn take_cleanups(&mut self) -> Vec<Cleanup> {
        let mut layout = Vec::new();
        let mut passive = Vec::new();
        for slot in self.slots.iter_mut().flatten() {
            if let Some(effect) = slot.downcast_mut::<EffectSlot>() {
                if let Some(cleanup) = effect.cleanup.take() {
                    match effect.kind {
                        EffectKind::Layout => layout.push(cleanup),
                        EffectKind::Passive => passive.push(cleanup),
                    }
                }
            }
        }
        layout.extend(passive);
        layout
    }
}

// =============================================================================
// HookStore
// =============================================================================

/// All hook state owned by one mounted root.
#[derive(Default)]
pub(crate) struct HookStore {
    states: HashMap<Path, HookState>,
    /// States replaced by a different component at the same path.
    retired: Vec<HookState>,
    /// Cleanups detached from slots that were re-initialized.
    orphaned: Vec<Cleanup>,
}

impl HookStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Prepare `path` for a render of `component`: reset the cursor, and
    /// retire the existing state if a different component lived there.
    pub(crate) fn begin(
        &mut self,
        path: &Path,
        component: &Component,
    ) -> (&mut HookState, &mut Vec<Cleanup>) {
        if let Some(existing) = self.states.get(path) {
            if !existing.component.ptr_eq(component) {
                debug!(%path, old = existing.component.name(), new = component.name(), "component changed; retiring hook state");
                if let Some(old) = self.states.remove(path) {
                    self.retired.push(old);
                }
            }
        }
        let state = self
            .states
            .entry(path.clone())
            .or_insert_with(|| HookState::new(component.clone()));
        state.cursor = 0;
        state.stale.set(false);
        state.reads_context = false;
        (state, &mut self.orphaned)
    }

    pub(crate) fn get(&self, path: &Path) -> Option<&HookState> {
        self.states.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut HookState> {
        self.states.get_mut(path)
    }

    pub(crate) fn remove(&mut self, path: &Path) -> Option<HookState> {
        self.states.remove(path)
    }

    /// Paths with live state.
    pub(crate) fn paths(&self) -> Vec<Path> {
        self.states.keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    /// Cleanups owed by retired states and re-initialized slots.
    pub(crate) fn take_detached_cleanups(&mut self) -> Vec<Cleanup> {
        let mut cleanups = std::mem::take(&mut self.orphaned);
        for mut state in self.retired.drain(..) {
            cleanups.extend(state.take_cleanups());
        }
        cleanups
    }

    /// Every cleanup the store still owes, leaving the store empty.
    pub(crate) fn drain_all_cleanups(&mut self) -> Vec<Cleanup> {
        let mut cleanups = self.take_detached_cleanups();
        for (_, mut state) in self.states.drain() {
            cleanups.extend(state.take_cleanups());
        }
        cleanups
    }
}

// =============================================================================
// Scope
// =============================================================================

/// The hook API handed to a component while it renders.
///
/// ```ignore
/// let view = Component::new("Counter", |cx, _| {
///     let (count, set_count) = cx.use_state(0);
///     let clicks = cx.use_ref(0u32);
///     cx.use_effect(count, move || tracing::info!(count, "changed"));
///     Ok(count.into())
/// });
/// ```
pub struct Scope<'a> {
    path: &'a Path,
    state: &'a mut HookState,
    orphaned: &'a mut Vec<Cleanup>,
    effects: &'a mut Vec<QueuedEffect>,
    scheduler: &'a Scheduler,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        path: &'a Path,
        state: &'a mut HookState,
        orphaned: &'a mut Vec<Cleanup>,
        effects: &'a mut Vec<QueuedEffect>,
        scheduler: &'a Scheduler,
    ) -> Self {
        Self {
            path,
            state,
            orphaned,
            effects,
            scheduler,
        }
    }

    /// Path of the component being rendered.
    pub fn path(&self) -> &Path {
        self.path
    }

    /// Handle for requesting renders of this root.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Claim the next slot as a `T`, initializing it on first use, and run
    /// `f` against it.
    fn next_slot<T: 'static, R>(&mut self, init: impl FnOnce() -> T, f: impl FnOnce(&mut T) -> R) -> R {
        let index = self.state.cursor;
        self.state.cursor += 1;
        if self.state.slots.len() <= index {
            self.state.slots.resize_with(index + 1, || None);
        }

        let mut value = match self.state.slots[index].take().map(|slot| slot.downcast::<T>()) {
            Some(Ok(value)) => value,
            Some(Err(other)) => {
                warn!(path = %self.path, index, "hook order changed between renders; reinitializing slot");
                self.orphan(other);
                Box::new(init())
            }
            None => Box::new(init()),
        };

        let out = f(&mut value);
        self.state.slots[index] = Some(value);
        out
    }

    fn cursor(&self) -> usize {
        self.state.cursor
    }

    fn stale_flag(&self) -> Rc<Cell<bool>> {
        self.state.stale.clone()
    }

    fn mark_reads_context(&mut self) {
        self.state.reads_context = true;
    }

    fn orphan(&mut self, slot: Box<dyn Any>) {
        if let Ok(mut effect) = slot.downcast::<EffectSlot>() {
            if let Some(cleanup) = effect.cleanup.take() {
                self.orphaned.push(cleanup);
            }
        }
    }

    fn queue_effect(&mut self, effect: QueuedEffect) {
        self.effects.push(effect);
    }
}

// =============================================================================
// Test harness
// =============================================================================
