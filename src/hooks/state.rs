//! State hooks - `use_state` and `use_reducer`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::Scope;
use crate::engine::Scheduler;

// =============================================================================
// Setter
// =============================================================================

/// Updates one state slot and requests a render.
///
/// The setter is stable: every render of a component gets the same setter
/// back. Writes apply immediately; the component sees them on its next
/// render, and several writes before that render produce one pass.
pub struct Setter<T> {
    cell: Rc<RefCell<T>>,
    stale: Rc<Cell<bool>>,
    scheduler: Scheduler,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            stale: self.stale.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: 'static> Setter<T> {
    fn new(value: T, stale: Rc<Cell<bool>>, scheduler: Scheduler) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
            stale,
            scheduler,
        }
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
        self.changed();
    }

    /// Replace the value with `f(previous)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        *self.cell.borrow_mut() = next;
        self.changed();
    }

    fn changed(&self) {
        self.stale.set(true);
        self.scheduler.request_render();
    }

    /// The latest written value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: fmt::Debug> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Setter").field(&self.cell.borrow()).finish()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

type Reducer<S, A> = Rc<dyn Fn(&S, A) -> S>;

/// Sends actions to a reducer.
pub struct Dispatch<A> {
    send: Rc<dyn Fn(A)>,
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            send: self.send.clone(),
        }
    }
}

impl<A> Dispatch<A> {
    pub fn dispatch(&self, action: A) {
        (self.send)(action);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.send, &other.send)
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch(..)")
    }
}

struct ReducerSlot<S, A> {
    setter: Setter<S>,
    /// Replaced every render so dispatch uses the latest reducer.
    reducer: Rc<RefCell<Reducer<S, A>>>,
    dispatch: Dispatch<A>,
}

// =============================================================================
// Hooks
// =============================================================================

impl Scope<'_> {
    /// State slot initialized with `initial` on first render.
    pub fn use_state<T>(&mut self, initial: T) -> (T, Setter<T>)
    where
        T: Clone + 'static,
    {
        self.use_state_with(move || initial)
    }

    /// State slot whose initial value is computed once, on first render.
    pub fn use_state_with<T>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>)
    where
        T: Clone + 'static,
    {
        let scheduler = self.scheduler();
        let stale = self.stale_flag();
        self.next_slot(
            move || Setter::new(init(), stale, scheduler),
            |setter: &mut Setter<T>| (setter.get(), setter.clone()),
        )
    }

    /// State updated by folding actions through `reducer`.
    pub fn use_reducer<S, A, R>(&mut self, reducer: R, initial: S) -> (S, Dispatch<A>)
    where
        S: Clone + 'static,
        A: 'static,
        R: Fn(&S, A) -> S + 'static,
    {
        self.use_reducer_with(reducer, initial, |s| s)
    }

    /// Like [`use_reducer`](Self::use_reducer) with the initial state
    /// computed once as `init(arg)`.
    pub fn use_reducer_with<S, A, R, I>(&mut self, reducer: R, arg: I, init: impl FnOnce(I) -> S) -> (S, Dispatch<A>)
    where
        S: Clone + 'static,
        A: 'static,
        R: Fn(&S, A) -> S + 'static,
        I: 'static,
    {
        let scheduler = self.scheduler();
        let stale = self.stale_flag();
        let reducer: Reducer<S, A> = Rc::new(reducer);
        let fresh = reducer.clone();

        self.next_slot(
            move || {
                let setter = Setter::new(init(arg), stale, scheduler);
                let current = Rc::new(RefCell::new(fresh));
                let dispatch = {
                    let setter = setter.clone();
                    let current = current.clone();
                    Dispatch {
                        send: Rc::new(move |action: A| {
                            let reducer = current.borrow().clone();
                            setter.update(|prev| reducer(prev, action));
                        }),
                    }
                };
                ReducerSlot {
                    setter,
                    reducer: current,
                    dispatch,
                }
            },
            |slot: &mut ReducerSlot<S, A>| {
                *slot.reducer.borrow_mut() = reducer;
                (slot.setter.get(), slot.dispatch.clone())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::HookHarness;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_state_initial_and_update() {
        let mut h = HookHarness::new();
        let (value, setter) = h.render(|cx| cx.use_state(1));
        assert_eq!(value, 1);

        setter.set(5);
        setter.update(|v| v * 2);
        let (value, again) = h.render(|cx| cx.use_state(1));
        assert_eq!(value, 10);
        assert!(again.ptr_eq(&setter));
    }

    #[test]
    fn test_state_thunk_runs_once() {
        let mut h = HookHarness::new();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            h.render(|cx| {
                cx.use_state_with(move || {
                    calls.set(calls.get() + 1);
                    "init"
                })
            });
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reducer_is_a_left_fold() {
        let reducer = |state: &i64, action: i64| state * 10 + action;
        let mut h = HookHarness::new();
        let (_, dispatch) = h.render(|cx| cx.use_reducer(reducer, 0));

        let actions = [3, 1, 4, 1, 5];
        for (i, action) in actions.iter().enumerate() {
            dispatch.dispatch(*action);
            let (state, _) = h.render(|cx| cx.use_reducer(reducer, 0));
            let expected = actions[..=i].iter().fold(0, |acc, a| reducer(&acc, *a));
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn test_reducer_with_init() {
        let mut h = HookHarness::new();
        let (state, _) = h.render(|cx| cx.use_reducer_with(|s: &String, a: char| format!("{s}{a}"), 3usize, |n| "x".repeat(n)));
        assert_eq!(state, "xxx");
    }
}
