//! Root pipeline
//!
//! This module connects the element tree to a host through one engine
//! instance per mounted root.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Root::render ─► Engine (reconcile + hooks) ─► commit ─► Host
//!      ▲                                                    │
//!      └──────── setters / on_schedule / Root::work ◄───────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. **render / act** - set the root element or run a callback, then flush
//! 2. **work** - cooperative slice bounded by a [`Deadline`]
//! 3. **unmount** - cleanups, host clear, full reset

pub mod mount;
mod options;

pub use crate::engine::{Deadline, FrameDeadline, Phase, Unbounded, WorkStatus};
pub use mount::{Root, mount, mount_with};
pub use options::RootOptions;
