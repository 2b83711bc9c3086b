//! Host backends.
//!
//! The engine never touches a concrete surface. Every mutation goes through
//! the [`Host`] trait, which a backend implements over its own instance
//! handles:
//!
//! - [`MemoryHost`] - an in-memory node tree with a mutation log (the DOM
//!   analogue used by tests)
//! - [`TerminalHost`] - a [`MemoryHost`] painted to a terminal as text lines
//!
//! # Failure policy
//!
//! `create_instance` returning `None` means "unsupported here"; the engine
//! skips mutations for that unit. Errors from the other operations are logged
//! by the commit phase and never abort it.

mod memory;
mod terminal;

pub use memory::{MemoryHost, Mutation, NodeId};
pub use terminal::{Line, Span, TerminalHost};

use crate::element::Props;
use crate::error::HostError;
use crate::types::Tag;

/// The capability set the engine drives.
///
/// A `None` parent means the root container.
pub trait Host {
    /// Opaque handle for one host instance.
    type Instance: Clone;

    /// Create an instance of `ty` with its initial props.
    fn create_instance(&mut self, tag: Tag, ty: &str, props: &Props) -> Option<Self::Instance>;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Option<&Self::Instance>, child: &Self::Instance) -> Result<(), HostError>;

    /// Attach `child` under `parent` right before `before`.
    ///
    /// Backends without ordered insertion may keep the default, which appends.
    fn insert_before(
        &mut self,
        parent: Option<&Self::Instance>,
        child: &Self::Instance,
        before: &Self::Instance,
    ) -> Result<(), HostError> {
        let _ = before;
        self.append_child(parent, child)
    }

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: Option<&Self::Instance>, child: &Self::Instance) -> Result<(), HostError>;

    /// Apply the changed keys between `old` and `new`.
    fn commit_update(&mut self, instance: &Self::Instance, old: &Props, new: &Props) -> Result<(), HostError>;

    /// Detach everything under the root container.
    fn clear(&mut self);
}
