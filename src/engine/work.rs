//! Unit processing and throw routing.
//!
//! Processing a unit renders it (calling the component, or taking a host
//! element's children) and reconciles its children. A component can also
//! answer with a [`Throw`]; the processor turns that into a [`UnitResult`]
//! by finding the boundary that takes it:
//!
//! - `Suspend` goes to the nearest Suspense unit not already showing its
//!   fallback. The boundary is marked, asks for a render once the pending
//!   value settles, and becomes the next unit to process.
//! - `Fail` goes to the nearest unit with a catch handler that has not
//!   caught anything yet. The handler runs once, and the boundary becomes
//!   the next unit to process.
//! - With no boundary, the pass aborts with an [`Error`].

use std::slice;

use tracing::{debug, error, trace, warn};

use super::reconcile::Segment;
use super::{Engine, FiberId};
use crate::element::{ElementType, Node, Props};
use crate::error::{ComponentError, Error, ErrorInfo, Result, Throw};
use crate::hooks::Scope;
use crate::primitives::{Component, Pending};
use crate::renderer::Host;
use crate::types::Path;

/// What processing one unit decided.
pub(crate) enum UnitResult {
    Continue,
    /// Restart at the given Suspense boundary.
    Suspend { boundary: FiberId, pending: Pending },
    /// Restart at the given error boundary, which has taken the failure.
    Fail { boundary: FiberId, error: ComponentError },
    /// Nothing above could take the throw.
    Fatal(Error),
}

impl<H: Host> Engine<H> {
    /// Process `unit` and return the next unit to process.
    pub(crate) fn perform(&mut self, unit: FiberId) -> Result<Option<FiberId>> {
        let ty = self.fibers[unit].ty.clone();
        let outcome = match &ty {
            ElementType::Component(component) => self.update_component(unit, component),
            ElementType::Suspense => self.update_suspense(unit),
            ElementType::Host(tag) => self.update_host(unit, tag),
            ElementType::Fragment => self.update_fragment(unit),
        };

        match outcome {
            UnitResult::Continue => Ok(self.next_after(unit)),
            UnitResult::Suspend { boundary, pending } => {
                debug!(boundary = %self.fibers[boundary].path, ?pending, "suspended; rendering fallback");
                Ok(Some(boundary))
            }
            UnitResult::Fail { boundary, error } => {
                debug!(boundary = %self.fibers[boundary].path, %error, "failure caught by boundary");
                Ok(Some(boundary))
            }
            UnitResult::Fatal(err) => {
                error!(%err, "unhandled render failure");
                Err(err)
            }
        }
    }

    /// Depth-first successor: child, else the nearest ancestor's sibling.
    fn next_after(&self, unit: FiberId) -> Option<FiberId> {
        if let Some(child) = self.fibers[unit].child {
            return Some(child);
        }
        let mut current = Some(unit);
        while let Some(id) = current {
            if Some(id) == self.wip_root {
                return None;
            }
            if let Some(sibling) = self.fibers[id].sibling {
                return Some(sibling);
            }
            current = self.fibers[id].parent;
        }
        None
    }

    /// Fallback content if this unit is an error boundary that caught.
    fn caught_fallback(&self, unit: FiberId) -> Option<Node> {
        let fiber = &self.fibers[unit];
        if !fiber.boundary.has_error {
            return None;
        }
        let node = match fiber.props.fallback() {
            Some(fallback) => fallback.resolve(fiber.boundary.error.as_ref()),
            None => Node::Empty,
        };
        Some(node)
    }

    // =========================================================================
    // Unit kinds
    // =========================================================================

    fn update_component(&mut self, unit: FiberId, component: &Component) -> UnitResult {
        if let Some(fallback) = self.caught_fallback(unit) {
            self.reconcile_children(unit, slice::from_ref(&fallback), Segment::Fallback);
            return UnitResult::Continue;
        }

        let path = self.fibers[unit].path.clone();
        let props = self.fibers[unit].props.clone();

        if let Some(output) = self.memoized_output(component, &path, &props) {
            trace!(%path, component = component.name(), "props unchanged; reusing output");
            self.fibers[unit].effects.clear();
            self.reconcile_children(unit, slice::from_ref(&output), Segment::Children);
            return UnitResult::Continue;
        }

        let mut effects = Vec::new();
        let rendered = {
            let (state, orphaned) = self.hooks.begin(&path, component);
            let mut scope = Scope::new(&path, state, orphaned, &mut effects, &self.scheduler);
            component.render(&mut scope, &props)
        };

        match rendered {
            Ok(output) => {
                if let Some(state) = self.hooks.get_mut(&path) {
                    state.prev_props = Some(props);
                    state.prev_output = Some(output.clone());
                }
                self.fibers[unit].effects = effects;
                self.reconcile_children(unit, slice::from_ref(&output), Segment::Children);
                UnitResult::Continue
            }
            Err(throw) => self.route_throw(unit, throw),
        }
    }

    /// The previous output of a memoized component whose props compare equal.
    fn memoized_output(&self, component: &Component, path: &Path, props: &Props) -> Option<Node> {
        let compare = component.compare()?;
        let state = self.hooks.get(path)?;
        if !state.component.ptr_eq(component) || !state.can_reuse_output() {
            return None;
        }
        let prev_props = state.prev_props.as_ref()?;
        let prev_output = state.prev_output.as_ref()?;
        compare(prev_props, props).then(|| prev_output.clone())
    }

    fn update_suspense(&mut self, unit: FiberId) -> UnitResult {
        let fiber = &self.fibers[unit];
        if fiber.suspense.did_throw {
            let fallback = match fiber.props.fallback() {
                Some(fallback) => fallback.resolve(None),
                None => Node::Empty,
            };
            self.reconcile_children(unit, slice::from_ref(&fallback), Segment::Fallback);
        } else {
            let props = fiber.props.clone();
            self.reconcile_children(unit, props.children(), Segment::Children);
        }
        UnitResult::Continue
    }

    fn update_host(&mut self, unit: FiberId, tag: &str) -> UnitResult {
        if self.fibers[unit].instance.is_none() {
            let host_tag = self.take_tag();
            let props = self.fibers[unit].props.clone();
            match self.host.create_instance(host_tag, tag, &props) {
                Some(instance) => self.fibers[unit].instance = Some(instance),
                None => debug!(ty = tag, "host declined to create an instance"),
            }
        }
        self.update_fragment(unit)
    }

    fn update_fragment(&mut self, unit: FiberId) -> UnitResult {
        match self.caught_fallback(unit) {
            Some(fallback) => self.reconcile_children(unit, slice::from_ref(&fallback), Segment::Fallback),
            None => {
                let props = self.fibers[unit].props.clone();
                self.reconcile_children(unit, props.children(), Segment::Children);
            }
        }
        UnitResult::Continue
    }

    // =========================================================================
    // Throw routing
    // =========================================================================

    fn route_throw(&mut self, unit: FiberId, throw: Throw) -> UnitResult {
        match throw {
            Throw::Suspend(pending) => match self.find_suspense_boundary(unit) {
                Some(boundary) => {
                    let suspense = &mut self.fibers[boundary].suspense;
                    suspense.did_throw = true;
                    suspense.waiting_on = Some(pending.clone());

                    let scheduler = self.scheduler.clone();
                    pending.then(move || scheduler.request_render());
                    UnitResult::Suspend { boundary, pending }
                }
                None => {
                    warn!(path = %self.fibers[unit].path, "suspended outside of any Suspense boundary");
                    let error = ComponentError::msg("component suspended outside of any Suspense boundary");
                    match self.catch_failure(unit, error.clone()) {
                        Some(boundary) => UnitResult::Fail { boundary, error },
                        None => UnitResult::Fatal(Error::UnhandledSuspend {
                            path: self.fibers[unit].path.clone(),
                        }),
                    }
                }
            },
            Throw::Fail(error) => match self.catch_failure(unit, error.clone()) {
                Some(boundary) => UnitResult::Fail { boundary, error },
                None => UnitResult::Fatal(Error::Render {
                    path: self.fibers[unit].path.clone(),
                    error,
                }),
            },
        }
    }

    fn find_suspense_boundary(&self, unit: FiberId) -> Option<FiberId> {
        let mut current = self.fibers[unit].parent;
        while let Some(id) = current {
            let fiber = &self.fibers[id];
            if matches!(fiber.ty, ElementType::Suspense) && !fiber.suspense.did_throw {
                return Some(id);
            }
            current = fiber.parent;
        }
        None
    }

    /// Hand `error` to the nearest error boundary above `unit` that has not
    /// caught yet, returning that boundary.
    fn catch_failure(&mut self, unit: FiberId, error: ComponentError) -> Option<FiberId> {
        let mut stack = vec![self.describe(unit)];
        let mut current = self.fibers[unit].parent;

        while let Some(id) = current {
            stack.push(self.describe(id));
            let fiber = &mut self.fibers[id];
            if let Some(catch) = fiber.props.catch().cloned() {
                if !fiber.boundary.has_error {
                    fiber.boundary.has_error = true;
                    fiber.boundary.error = Some(error.clone());

                    let info = ErrorInfo {
                        component_stack: stack.join("\n"),
                    };
                    catch(&error, &info);
                    return Some(id);
                }
            }
            current = fiber.parent;
        }
        None
    }

    fn describe(&self, unit: FiberId) -> String {
        let fiber = &self.fibers[unit];
        format!("in {} ({})", fiber.ty.name(), fiber.path)
    }
}
