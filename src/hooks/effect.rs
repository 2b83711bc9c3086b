//! Effect hooks - `use_effect`, `use_layout_effect`, `use_imperative_handle`.
//!
//! Effects are not run during render. A render only decides whether an effect
//! is due (its deps changed, or it has none) and queues it on the work unit.
//! The commit phase then flushes layout effects before passive effects, each
//! running the previous cleanup right before the new body.

use std::any::Any;
use std::fmt;

use super::{Ref, Scope};
use crate::types::Path;

/// Teardown returned by an effect body.
pub type Cleanup = Box<dyn FnOnce()>;

/// Box a closure as a [`Cleanup`].
pub fn cleanup(f: impl FnOnce() + 'static) -> Cleanup {
    Box::new(f)
}

/// What an effect body may return.
///
/// Returning an `Err` logs the failure; other queued effects still run.
pub trait IntoEffectOutcome {
    fn into_outcome(self) -> anyhow::Result<Option<Cleanup>>;
}

impl IntoEffectOutcome for () {
    fn into_outcome(self) -> anyhow::Result<Option<Cleanup>> {
        Ok(None)
    }
}

impl IntoEffectOutcome for Cleanup {
    fn into_outcome(self) -> anyhow::Result<Option<Cleanup>> {
        Ok(Some(self))
    }
}

impl IntoEffectOutcome for Option<Cleanup> {
    fn into_outcome(self) -> anyhow::Result<Option<Cleanup>> {
        Ok(self)
    }
}

impl<T: IntoEffectOutcome> IntoEffectOutcome for anyhow::Result<T> {
    fn into_outcome(self) -> anyhow::Result<Option<Cleanup>> {
        self.and_then(IntoEffectOutcome::into_outcome)
    }
}

// =============================================================================
// Slot and queue records
// =============================================================================

/// Which flush an effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EffectKind {
    Layout,
    Passive,
}

/// Hook slot of an effect: the deps it last ran with and its pending cleanup.
pub(crate) struct EffectSlot {
    pub(crate) kind: EffectKind,
    pub(crate) deps: Option<Box<dyn Any>>,
    pub(crate) cleanup: Option<Cleanup>,
}

impl EffectSlot {
    fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            deps: None,
            cleanup: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_cleanup(kind: EffectKind, cleanup: Cleanup) -> Self {
        Self {
            cleanup: Some(cleanup),
            ..Self::new(kind)
        }
    }
}

type EffectBody = Box<dyn FnOnce() -> anyhow::Result<Option<Cleanup>>>;

/// An effect due to run after the commit of the render that queued it.
pub(crate) struct QueuedEffect {
    pub(crate) path: Path,
    pub(crate) index: usize,
    pub(crate) kind: EffectKind,
    pub(crate) run: EffectBody,
    /// Deps to record once the body has run.
    pub(crate) deps: Option<Box<dyn Any>>,
}

impl fmt::Debug for QueuedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEffect")
            .field("path", &self.path)
            .field("index", &self.index)
            .field("kind", &self.kind)
            .finish()
    }
}

// =============================================================================
// Hooks
// =============================================================================

impl Scope<'_> {
    /// Run `f` after commit whenever `deps` differs from the previous render.
    ///
    /// Deps compare with `PartialEq`; use a tuple for several values and `()`
    /// to run only once after mount.
    pub fn use_effect<D, F, O>(&mut self, deps: D, f: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> O + 'static,
        O: IntoEffectOutcome,
    {
        self.effect_hook(EffectKind::Passive, Some(deps), f);
    }

    /// Run `f` after every commit.
    pub fn use_effect_always<F, O>(&mut self, f: F)
    where
        F: FnOnce() -> O + 'static,
        O: IntoEffectOutcome,
    {
        self.effect_hook(EffectKind::Passive, None::<()>, f);
    }

    /// Like [`use_effect`](Self::use_effect), flushed before passive effects.
    pub fn use_layout_effect<D, F, O>(&mut self, deps: D, f: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> O + 'static,
        O: IntoEffectOutcome,
    {
        self.effect_hook(EffectKind::Layout, Some(deps), f);
    }

    pub fn use_layout_effect_always<F, O>(&mut self, f: F)
    where
        F: FnOnce() -> O + 'static,
        O: IntoEffectOutcome,
    {
        self.effect_hook(EffectKind::Layout, None::<()>, f);
    }

    /// Publish a handle into `target` after commit, clearing it again on
    /// cleanup.
    pub fn use_imperative_handle<T, D, F>(&mut self, target: &Ref<Option<T>>, deps: D, create: F)
    where
        T: 'static,
        D: PartialEq + 'static,
        F: FnOnce() -> T + 'static,
    {
        let target = target.clone();
        self.use_layout_effect(deps, move || {
            target.set(Some(create()));
            cleanup(move || target.set(None))
        });
    }

    fn effect_hook<D, F, O>(&mut self, kind: EffectKind, deps: Option<D>, f: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> O + 'static,
        O: IntoEffectOutcome,
    {
        let index = self.cursor();
        let due = self.next_slot(
            || EffectSlot::new(kind),
            |slot: &mut EffectSlot| {
                slot.kind = kind;
                match (&deps, &slot.deps) {
                    (Some(next), Some(prev)) => prev.downcast_ref::<D>().is_none_or(|prev| prev != next),
                    _ => true,
                }
            },
        );

        if due {
            self.queue_effect(QueuedEffect {
                path: self.path().clone(),
                index,
                kind,
                run: Box::new(move || f().into_outcome()),
                deps: deps.map(|d| Box::new(d) as Box<dyn Any>),
            });
        }
    }
}
