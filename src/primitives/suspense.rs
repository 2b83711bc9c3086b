//! Suspense protocol - pending values, deferred results and lazy components.
//!
//! A component that cannot render yet returns `Err(Throw::Suspend(pending))`.
//! The engine routes that to the nearest [`suspense`] boundary, which renders
//! its fallback and asks for a new render once the pending value settles.
//!
//! # Pattern: Deferred as the pending value
//!
//! ```ignore
//! let module: Deferred<Component> = Deferred::new();
//! let loader = module.clone();
//! let lazy_view = lazy(move || loader.clone());
//!
//! root.render(suspense("Loading...", [lazy_view.element(Props::new())]))?;
//! // fallback committed
//! module.resolve(real_view);
//! root.flush()?;
//! // real view committed
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::Component;
use crate::element::{Element, ElementType, Node, Props, create_element};
use crate::error::{ComponentError, Throw};

// =============================================================================
// Thenable / Pending
// =============================================================================

/// The "then" capability of a pending value.
pub trait Thenable {
    /// True once the value has resolved or rejected.
    fn is_settled(&self) -> bool;

    /// Run `callback` once the value settles (immediately if it already has).
    fn then(&self, callback: Box<dyn FnOnce()>);
}

/// Signal carried by [`Throw::Suspend`].
#[derive(Clone)]
pub struct Pending(Rc<dyn Thenable>);

impl Pending {
    pub fn new(thenable: Rc<dyn Thenable>) -> Self {
        Self(thenable)
    }

    pub fn is_settled(&self) -> bool {
        self.0.is_settled()
    }

    pub fn then(&self, callback: impl FnOnce() + 'static) {
        self.0.then(Box::new(callback));
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").field("settled", &self.is_settled()).finish()
    }
}

// =============================================================================
// Deferred
// =============================================================================

/// Settlement state of a [`Deferred`].
#[derive(Clone, Debug)]
pub enum AsyncState<T> {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Resolved(T),
    /// Settled with a failure.
    Rejected(ComponentError),
}

struct DeferredCell<T> {
    state: RefCell<AsyncState<T>>,
    waiters: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl<T> Thenable for DeferredCell<T> {
    fn is_settled(&self) -> bool {
        !matches!(*self.state.borrow(), AsyncState::Pending)
    }

    fn then(&self, callback: Box<dyn FnOnce()>) {
        if self.is_settled() {
            callback();
        } else {
            self.waiters.borrow_mut().push(callback);
        }
    }
}

/// A single-threaded value that settles later, resolved or rejected by
/// whoever owns it.
pub struct Deferred<T> {
    cell: Rc<DeferredCell<T>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Clone + 'static> Deferred<T> {
    pub fn new() -> Self {
        Self::with_state(AsyncState::Pending)
    }

    /// An already-resolved value (a cached load).
    pub fn resolved(value: T) -> Self {
        Self::with_state(AsyncState::Resolved(value))
    }

    pub fn rejected(error: impl Into<anyhow::Error>) -> Self {
        Self::with_state(AsyncState::Rejected(ComponentError::new(error)))
    }

    fn with_state(state: AsyncState<T>) -> Self {
        Self {
            cell: Rc::new(DeferredCell {
                state: RefCell::new(state),
                waiters: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn resolve(&self, value: T) {
        self.settle(AsyncState::Resolved(value));
    }

    pub fn reject(&self, error: impl Into<anyhow::Error>) {
        self.settle(AsyncState::Rejected(ComponentError::new(error)));
    }

    /// Current settlement state.
    pub fn state(&self) -> AsyncState<T> {
        self.cell.state.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.cell.is_settled()
    }

    /// The signal to throw while this value is unsettled.
    pub fn pending(&self) -> Pending {
        Pending::new(self.cell.clone())
    }

    fn settle(&self, next: AsyncState<T>) {
        {
            let mut state = self.cell.state.borrow_mut();
            if !matches!(*state, AsyncState::Pending) {
                debug!("deferred value already settled; ignoring");
                return;
            }
            *state = next;
        }
        // Waiters may register further waiters or read the state.
        let waiters = std::mem::take(&mut *self.cell.waiters.borrow_mut());
        for waiter in waiters {
            waiter();
        }
    }
}

impl<T: Clone + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// suspense() / lazy()
// =============================================================================

/// A Suspense boundary: renders `children`, or `fallback` while anything
/// below is pending.
pub fn suspense<I>(fallback: impl Into<Node>, children: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    create_element(ElementType::Suspense, Props::new().with_fallback(fallback), children)
}

#[derive(Clone)]
enum LazyState {
    Idle,
    Loading(Deferred<Component>),
    Resolved(Component),
    Failed(ComponentError),
}

impl LazyState {
    /// Move `Loading` forward once its deferred value has settled.
    fn refresh(&mut self) {
        if let Self::Loading(deferred) = self {
            match deferred.state() {
                AsyncState::Pending => {}
                AsyncState::Resolved(component) => *self = Self::Resolved(component),
                AsyncState::Rejected(error) => *self = Self::Failed(error),
            }
        }
    }
}

/// A component whose implementation is loaded on first render.
///
/// The first render calls `loader` and suspends until the returned value
/// settles. A resolved component is cached and rendered with the lazy
/// element's props; a rejection is cached and surfaces as an ordinary
/// render failure on every later render.
pub fn lazy<F>(loader: F) -> Component
where
    F: Fn() -> Deferred<Component> + 'static,
{
    let state = Rc::new(RefCell::new(LazyState::Idle));

    Component::new("Lazy", move |scope, props| {
        loop {
            let snapshot = {
                let mut current = state.borrow_mut();
                current.refresh();
                current.clone()
            };

            match snapshot {
                LazyState::Resolved(component) => {
                    return Ok(Element::new(component, props.clone()).into());
                }
                LazyState::Failed(error) => return Err(Throw::Fail(error)),
                LazyState::Loading(deferred) => return Err(Throw::Suspend(deferred.pending())),
                LazyState::Idle => {
                    let deferred = loader();
                    if !deferred.is_settled() {
                        let weak = Rc::downgrade(&state);
                        let scheduler = scope.scheduler();
                        deferred.pending().then(move || {
                            if let Some(state) = weak.upgrade() {
                                if let Ok(mut state) = state.try_borrow_mut() {
                                    state.refresh();
                                }
                            }
                            scheduler.request_render();
                        });
                    }
                    *state.borrow_mut() = LazyState::Loading(deferred);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_deferred_runs_waiters_on_resolve() {
        let deferred: Deferred<i32> = Deferred::new();
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        deferred.pending().then(move || fired_clone.set(fired_clone.get() + 1));
        assert_eq!(fired.get(), 0);
        assert!(!deferred.is_settled());

        deferred.resolve(7);
        assert_eq!(fired.get(), 1);
        assert!(matches!(deferred.state(), AsyncState::Resolved(7)));
    }

    #[test]
    fn test_deferred_then_after_settle_runs_immediately() {
        let deferred = Deferred::resolved("done");
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        deferred.pending().then(move || fired_clone.set(true));
        assert!(fired.get());
    }

    #[test]
    fn test_deferred_settles_once() {
        let deferred: Deferred<i32> = Deferred::new();
        deferred.reject(anyhow::anyhow!("offline"));
        deferred.resolve(1);
        match deferred.state() {
            AsyncState::Rejected(e) => assert_eq!(e.to_string(), "offline"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_suspense_element_carries_fallback() {
        let el = suspense("Loading...", ["child"]);
        assert!(matches!(el.ty(), ElementType::Suspense));
        assert_eq!(el.children().len(), 1);
        assert!(el.props().fallback().is_some());
    }
}
