//! Reconciliation engine - work-unit tree, scheduler and commit.
//!
//! The engine owns everything one mounted root needs:
//! - Fiber arena: the current tree and the work-in-progress tree
//! - Hook store: per-path hook state
//! - Schedule state: the coalesced render request flag shared with setters
//!
//! # Render cycle
//!
//! ```text
//! request_render ─► begin_pass ─► perform(unit)* ─► commit ─► flush effects
//!                     Idle          Rendering      CommitPending    Idle
//! ```
//!
//! A pass always starts at the root and re-renders the whole tree against
//! the current one. Units are processed depth-first; a unit may redirect the
//! loop to a Suspense or error boundary above it, which is then processed
//! again with its fallback.

mod commit;
mod fiber;
mod reconcile;
mod scheduler;
mod work;

use std::rc::Rc;

use tracing::{debug, error, trace};

pub use scheduler::{Deadline, FrameDeadline, Phase, Scheduler, Unbounded, WorkStatus};

pub(crate) use fiber::{Fiber, FiberArena, FiberId};
pub(crate) use scheduler::ScheduleState;

use crate::element::{Element, ElementType, Props};
use crate::error::{Error, Result};
use crate::hooks::HookStore;
use crate::pipeline::RootOptions;
use crate::renderer::Host;
use crate::types::{EffectTag, Path, Tag};

/// Engine state for one mounted root.
pub(crate) struct Engine<H: Host> {
    pub(crate) host: H,
    fibers: FiberArena<H::Instance>,
    hooks: HookStore,
    schedule: Rc<ScheduleState>,
    scheduler: Scheduler,
    current_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    root_element: Option<Element>,
    options: RootOptions,
    next_tag: u32,
    phase: Phase,
}

impl<H: Host> Engine<H> {
    pub(crate) fn new(host: H, options: RootOptions) -> Self {
        let schedule = ScheduleState::new(options.on_schedule.clone());
        schedule.set_mounted(true);
        let scheduler = Scheduler::new(&schedule);
        Self {
            host,
            fibers: FiberArena::new(),
            hooks: HookStore::new(),
            schedule,
            scheduler,
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            root_element: None,
            options,
            next_tag: 1,
            phase: Phase::Idle,
        }
    }

    pub(crate) fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn options(&self) -> &RootOptions {
        &self.options
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.root_element.is_some()
    }

    /// Replace the root element and request a pass.
    pub(crate) fn set_root(&mut self, element: Element) {
        self.root_element = Some(element);
        self.schedule.set_mounted(true);
        self.scheduler.request_render();
    }

    fn take_tag(&mut self) -> Tag {
        let tag = Tag(self.next_tag);
        self.next_tag += 1;
        tag
    }

    // =========================================================================
    // Work loop
    // =========================================================================

    fn begin_pass(&mut self) -> bool {
        let Some(element) = self.root_element.clone() else {
            trace!("no root element; nothing to render");
            self.schedule.take_queued();
            return false;
        };

        self.schedule.take_queued();
        self.schedule.set_rendering(true);
        let pass = self.schedule.begin_pass();

        let props = Rc::new(Props::new().with_children([element]));
        let mut root = Fiber::new(ElementType::Fragment, props, Path::root());
        root.alternate = self.current_root;
        let root = self.fibers.alloc(root);

        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.deletions.clear();
        self.phase = Phase::Rendering;
        debug!(pass, "render pass started");
        true
    }

    /// Process units until the tree is exhausted or the deadline runs low,
    /// then commit if the pass completed.
    pub(crate) fn work(&mut self, deadline: &dyn Deadline) -> Result<WorkStatus> {
        if self.phase == Phase::Idle {
            if !self.schedule.is_queued() || !self.begin_pass() {
                return Ok(WorkStatus::Idle);
            }
        }

        while let Some(unit) = self.next_unit {
            match self.perform(unit) {
                Ok(next) => self.next_unit = next,
                Err(error) => {
                    self.abort();
                    return Err(error);
                }
            }
            if self.next_unit.is_some() && deadline.time_remaining() < self.options.yield_threshold {
                trace!("deadline reached; yielding");
                return Ok(WorkStatus::Yielded);
            }
        }

        self.phase = Phase::CommitPending;
        self.commit();
        Ok(WorkStatus::Committed)
    }

    /// Drain all pending work synchronously, including passes requested by
    /// effects of earlier passes.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let mut passes = 0;
        loop {
            if self.phase == Phase::Idle && !self.schedule.is_queued() {
                return Ok(());
            }
            if passes >= self.options.max_passes {
                error!(passes, "render did not settle; giving up");
                self.abort();
                self.schedule.take_queued();
                return Err(Error::RenderLoop { passes });
            }
            match self.work(&Unbounded)? {
                WorkStatus::Committed => passes += 1,
                WorkStatus::Idle => return Ok(()),
                WorkStatus::Yielded => {}
            }
        }
    }

    /// Drop the work-in-progress tree, leaving the current tree untouched.
    fn abort(&mut self) {
        for id in std::mem::take(&mut self.deletions) {
            if let Some(fiber) = self.fibers.get_mut(id) {
                fiber.effect_tag = EffectTag::NONE;
            }
        }
        self.wip_root = None;
        self.next_unit = None;
        let released = self.fibers.sweep(self.current_root);
        self.phase = Phase::Idle;
        self.schedule.set_rendering(false);
        debug!(released, "render pass aborted");
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Run every pending cleanup, clear the host and reset to a fresh state.
    pub(crate) fn unmount(&mut self) {
        let cleanups = self.hooks.drain_all_cleanups();
        debug!(cleanups = cleanups.len(), "unmounting root");
        for cleanup in cleanups {
            cleanup();
        }

        self.host.clear();
        self.fibers.clear();
        self.hooks = HookStore::new();
        self.schedule.reset();
        self.current_root = None;
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
        self.root_element = None;
        self.next_tag = 1;
        self.phase = Phase::Idle;
    }

    #[cfg(test)]
    pub(crate) fn live_fibers(&self) -> usize {
        self.fibers.live_count()
    }

    #[cfg(test)]
    pub(crate) fn hook_paths(&self) -> Vec<Path> {
        let mut paths = self.hooks.paths();
        paths.sort();
        paths
    }
}
