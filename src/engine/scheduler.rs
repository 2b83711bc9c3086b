//! Scheduler - render requests, coalescing and cooperative deadlines.
//!
//! A [`Scheduler`] handle is what state setters hold. It never touches the
//! work-unit tree directly: it only flips the shared "render requested" flag
//! and, when no pass is in flight, notifies the host through the root's
//! `on_schedule` hook so the environment can call back into the root later.
//!
//! ```text
//! setter.set(v) -> request_render()
//!     not mounted        -> ignored
//!     already queued     -> coalesced
//!     pass in flight     -> flag only, honored after commit
//!     otherwise          -> flag + on_schedule()
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::trace;

// =============================================================================
// Phase / WorkStatus
// =============================================================================

/// Where a root is in its render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No pending work.
    #[default]
    Idle,
    /// Work units are being drained.
    Rendering,
    /// All units processed, waiting for commit.
    CommitPending,
}

/// Outcome of one cooperative work slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing was pending.
    Idle,
    /// The deadline ran out with units left to process.
    Yielded,
    /// A pass finished and was committed.
    Committed,
}

// =============================================================================
// Deadlines
// =============================================================================

/// Time budget for a cooperative work slice (the idle-callback deadline).
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// A deadline at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FrameDeadline {
    end: Instant,
}

impl FrameDeadline {
    /// A deadline `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    pub fn until(end: Instant) -> Self {
        Self { end }
    }
}

impl Deadline for FrameDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Never runs out. Used by synchronous flushes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

// =============================================================================
// Shared schedule state
// =============================================================================

static PASS_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique id for a render pass.
pub(crate) fn next_pass_id() -> u64 {
    PASS_COUNTER.fetch_add(1, Ordering::Relaxed)
}

pub(crate) type ScheduleHook = Rc<dyn Fn()>;

/// Flags shared between a root and every [`Scheduler`] handle it gave out.
#[derive(Default)]
pub(crate) struct ScheduleState {
    queued: Cell<bool>,
    rendering: Cell<bool>,
    mounted: Cell<bool>,
    pass: Cell<u64>,
    on_schedule: RefCell<Option<ScheduleHook>>,
}

impl ScheduleState {
    pub(crate) fn new(on_schedule: Option<ScheduleHook>) -> Rc<Self> {
        Rc::new(Self {
            on_schedule: RefCell::new(on_schedule),
            ..Self::default()
        })
    }

    fn request(&self) {
        if !self.mounted.get() {
            trace!("render requested while unmounted; ignoring");
            return;
        }
        if self.queued.replace(true) {
            trace!("render request coalesced");
            return;
        }
        if self.rendering.get() {
            trace!("render requested during a pass; deferred until commit");
            return;
        }
        self.notify();
    }

    /// Invoke the host's idle-callback hook, if any.
    pub(crate) fn notify(&self) {
        let hook = self.on_schedule.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub(crate) fn is_queued(&self) -> bool {
        self.queued.get()
    }

    /// Clear the request flag, returning whether it was set.
    pub(crate) fn take_queued(&self) -> bool {
        self.queued.replace(false)
    }

    pub(crate) fn set_rendering(&self, rendering: bool) {
        self.rendering.set(rendering);
    }

    pub(crate) fn set_mounted(&self, mounted: bool) {
        self.mounted.set(mounted);
    }

    pub(crate) fn begin_pass(&self) -> u64 {
        let id = next_pass_id();
        self.pass.set(id);
        id
    }

    pub(crate) fn current_pass(&self) -> u64 {
        self.pass.get()
    }

    pub(crate) fn reset(&self) {
        self.queued.set(false);
        self.rendering.set(false);
        self.mounted.set(false);
        self.pass.set(0);
    }
}

// =============================================================================
// Scheduler handle
// =============================================================================

/// Handle for requesting a render of the root it came from.
///
/// Handles are weak: once the root is dropped, requests are ignored.
#[derive(Clone)]
pub struct Scheduler {
    state: Weak<ScheduleState>,
}

impl Scheduler {
    pub(crate) fn new(state: &Rc<ScheduleState>) -> Self {
        Self {
            state: Rc::downgrade(state),
        }
    }

    /// A handle attached to no root.
    pub fn detached() -> Self {
        Self { state: Weak::new() }
    }

    /// Ask for a new render pass. Repeated requests before the pass runs
    /// coalesce into one.
    pub fn request_render(&self) {
        match self.state.upgrade() {
            Some(state) => state.request(),
            None => trace!("render requested on a dropped root; ignoring"),
        }
    }

    /// True if a render has been requested and not yet started.
    pub fn is_queued(&self) -> bool {
        self.state.upgrade().is_some_and(|s| s.is_queued())
    }

    pub(crate) fn current_pass(&self) -> u64 {
        self.state.upgrade().map_or(0, |s| s.current_pass())
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("attached", &(self.state.strong_count() > 0))
            .field("queued", &self.is_queued())
            .finish()
    }
}
