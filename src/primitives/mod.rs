//! Component primitives - the building blocks user code composes.
//!
//! This module provides:
//! - [`Component`] - function components, plus [`memo`] and [`forward_ref`]
//! - [`suspense`] and [`lazy`] - pending-value boundaries and deferred components
//! - [`error_boundary`] - failure containment
//! - [`Deferred`] - a settle-later value usable as a Suspense signal
//!
//! # Render contract
//!
//! A component is a function of a hook [`Scope`](crate::hooks::Scope) and
//! its props:
//!
//! ```ignore
//! let counter = Component::new("Counter", |cx, _props| {
//!     let (count, set_count) = cx.use_state(0);
//!     let on_click = move |_: &Value| set_count.update(|c| c + 1);
//!     Ok(create_element("button", Props::new().on("onClick", on_click), [count]).into())
//! });
//! ```
//!
//! Returning `Err(Throw::Suspend(..))` hands control to the nearest Suspense
//! boundary; `Err(Throw::Fail(..))` (or `?` on an `anyhow::Result`)
//! hands it to the nearest error boundary.

mod boundary;
mod component;
mod suspense;

pub use boundary::error_boundary;
pub use component::{Component, PropsCompare, Render, forward_ref, memo, memo_with};
pub use suspense::{AsyncState, Deferred, Pending, Thenable, lazy, suspense};
