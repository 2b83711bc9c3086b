//! Memoization hooks - `use_memo`, `use_callback`, `use_ref`.

use std::cell::{self, RefCell};
use std::fmt;
use std::rc::Rc;

use super::Scope;

/// A cached function value returned by [`Scope::use_callback`].
pub type Callback<A, R = ()> = Rc<dyn Fn(A) -> R>;

/// A stable mutable box. The same box comes back on every render of the
/// slot that created it.
pub struct Ref<T>(Rc<RefCell<T>>);

impl<T> Ref<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn current(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    pub fn borrow(&self) -> cell::Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref").field("current", &self.0.borrow()).finish()
    }
}

struct MemoSlot<T, D> {
    value: T,
    deps: D,
}

impl Scope<'_> {
    /// Value computed by `compute`, recomputed only when `deps` changes.
    pub fn use_memo<T, D>(&mut self, deps: D, compute: impl FnOnce() -> T) -> T
    where
        T: Clone + 'static,
        D: PartialEq + 'static,
    {
        self.next_slot(
            || None::<MemoSlot<T, D>>,
            |slot: &mut Option<MemoSlot<T, D>>| {
                if let Some(memo) = slot.as_ref() {
                    if memo.deps == deps {
                        return memo.value.clone();
                    }
                }
                let value = compute();
                *slot = Some(MemoSlot {
                    value: value.clone(),
                    deps,
                });
                value
            },
        )
    }

    /// `f` as a shared callback whose identity only changes with `deps`.
    pub fn use_callback<A, R, D>(&mut self, deps: D, f: impl Fn(A) -> R + 'static) -> Callback<A, R>
    where
        A: 'static,
        R: 'static,
        D: PartialEq + 'static,
    {
        self.use_memo(deps, move || Rc::new(f) as Callback<A, R>)
    }

    /// Stable mutable box, initialized once.
    pub fn use_ref<T: 'static>(&mut self, initial: T) -> Ref<T> {
        self.next_slot(move || Ref::new(initial), |r: &mut Ref<T>| r.clone())
    }
}
