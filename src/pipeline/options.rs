//! Root configuration.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Options for a mounted root.
///
/// ```ignore
/// let root = mount_with(host, RootOptions::default().yield_threshold(Duration::from_millis(2)));
/// ```
#[derive(Clone)]
pub struct RootOptions {
    /// A cooperative slice yields once the deadline has less than this left.
    pub yield_threshold: Duration,
    /// Upper bound on back-to-back passes in one synchronous flush.
    pub max_passes: usize,
    /// Called when a render is requested, so the environment can schedule
    /// a later call to [`Root::work`](super::Root::work).
    pub on_schedule: Option<Rc<dyn Fn()>>,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_passes: 64,
            on_schedule: None,
        }
    }
}

impl RootOptions {
    pub fn yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    pub fn on_schedule(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_schedule = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for RootOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootOptions")
            .field("yield_threshold", &self.yield_threshold)
            .field("max_passes", &self.max_passes)
            .field("on_schedule", &self.on_schedule.is_some())
            .finish()
    }
}
