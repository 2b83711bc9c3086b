//! Mount API - root lifecycle.
//!
//! This module provides the entry point for mounting a component tree onto
//! a host. A [`Root`] owns one engine instance; roots never share state.
//!
//! # Example
//!
//! ```ignore
//! use act_core::{mount, MemoryHost};
//!
//! let mut root = mount(MemoryHost::new());
//!
//! // Synchronous: visible on return
//! root.render(create_element(app, Props::new(), Vec::<Node>::new()))?;
//!
//! // Option 1: drain everything a callback caused
//! root.act(|| button_click())?;
//!
//! // Option 2: drive work cooperatively from an idle callback
//! while root.work(&FrameDeadline::new(Duration::from_millis(4)))? == WorkStatus::Yielded {}
//!
//! root.unmount();
//! ```

use tracing::debug;

use super::RootOptions;
use crate::element::{Element, Node, Props, create_element};
use crate::engine::{Deadline, Engine, Phase, Scheduler, WorkStatus};
use crate::error::Result;
use crate::primitives::Component;
use crate::renderer::Host;

// =============================================================================
// Root
// =============================================================================

/// A mounted root.
///
/// Dropping a root unmounts it, running every pending effect cleanup.
pub struct Root<H: Host> {
    engine: Engine<H>,
}

impl<H: Host> Root<H> {
    /// Render `element` as the root and drain all work before returning.
    pub fn render(&mut self, element: Element) -> Result<()> {
        self.engine.set_root(element);
        self.engine.flush()
    }

    /// Render `component` with `props` as the root.
    pub fn render_component(&mut self, component: &Component, props: Props) -> Result<()> {
        self.render(create_element(component, props, Vec::<Node>::new()))
    }

    /// Run `f`, then drain all work it caused before returning.
    pub fn act<R>(&mut self, f: impl FnOnce() -> R) -> Result<R> {
        let out = f();
        self.engine.flush()?;
        Ok(out)
    }

    /// Drain pending work synchronously.
    pub fn flush(&mut self) -> Result<()> {
        self.engine.flush()
    }

    /// Process work until `deadline` runs low. Call this from the host's
    /// idle callback after `on_schedule` fires.
    pub fn work(&mut self, deadline: &dyn Deadline) -> Result<WorkStatus> {
        self.engine.work(deadline)
    }

    /// Run every effect cleanup, clear the host and reset all engine state.
    ///
    /// The root can be rendered into again afterwards.
    pub fn unmount(&mut self) {
        self.engine.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_mounted()
    }

    pub fn host(&self) -> &H {
        &self.engine.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.engine.host
    }

    /// Handle for requesting renders from outside a component.
    pub fn scheduler(&self) -> Scheduler {
        self.engine.scheduler()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn options(&self) -> &RootOptions {
        self.engine.options()
    }
}

impl<H: Host> Drop for Root<H> {
    fn drop(&mut self) {
        if self.engine.is_mounted() {
            debug!("root dropped while mounted; unmounting");
            self.engine.unmount();
        }
    }
}

// =============================================================================
// Mount Functions
// =============================================================================

/// Mount a root on `host` with default options.
pub fn mount<H: Host>(host: H) -> Root<H> {
    mount_with(host, RootOptions::default())
}

/// Mount a root on `host`.
pub fn mount_with<H: Host>(host: H, options: RootOptions) -> Root<H> {
    debug!(?options, "mounting root");
    Root {
        engine: Engine::new(host, options),
    }
}
