//! # act-core
//!
//! Fiber-style reconciliation engine for declarative component UIs.
//!
//! ## Architecture
//!
//! act-core turns a tree of element descriptors into mutations on a host.
//! Each render pass builds a work-in-progress tree of units, diffs it
//! positionally against the committed tree, and applies the result in one
//! commit. Components keep state in hook slots keyed by their tree position.
//!
//! ```text
//! Element tree → work units (reconcile + hooks) → commit → Host
//!                     ▲                                     │
//!                     └──── setters / request_render ◄──────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Value, Path, Tag, EffectTag)
//! - [`element`] - Element descriptors, props and `create_element`
//! - [`primitives`] - Components, memo, Suspense, lazy and error boundaries
//! - [`hooks`] - State, reducer, effects, memo, refs and context
//! - [`engine`] - Work units, scheduler, reconciliation and commit
//! - [`renderer`] - The [`Host`] trait and the memory and terminal hosts
//! - [`pipeline`] - Mounting roots and driving work
//!
//! ## Example
//!
//! ```ignore
//! use act_core::*;
//!
//! let counter = Component::new("Counter", |cx, _| {
//!     let (count, set_count) = cx.use_state(0);
//!     Ok(create_element("button", Props::new().on("onClick", move |_| set_count.update(|n| n + 1)), [count]).into())
//! });
//!
//! let mut root = mount(MemoryHost::new());
//! root.render_component(&counter, Props::new())?;
//! ```

pub mod element;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use element::{
    create_element, fragment, CatchHandler, Element, ElementType, Fallback, Node, Props,
    NODE_VALUE, TEXT_ELEMENT,
};

pub use error::{ComponentError, Error, ErrorInfo, HostError, Result, Throw};

pub use engine::{Deadline, FrameDeadline, Phase, Scheduler, Unbounded, WorkStatus};

pub use hooks::{
    cleanup, create_context, Callback, Cleanup, Context, Dispatch, IntoEffectOutcome, Ref, Scope,
    Setter,
};

pub use primitives::{
    error_boundary, forward_ref, lazy, memo, memo_with, suspense, AsyncState, Component, Deferred,
    Pending, PropsCompare, Render, Thenable,
};

pub use renderer::{Host, Line, MemoryHost, Mutation, NodeId, Span, TerminalHost};

pub use pipeline::{mount, mount_with, Root, RootOptions};
