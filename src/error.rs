//! Error taxonomy.
//!
//! - [`Error`] - fatal to a render pass, returned from `render`/`act`/`flush`
//! - [`HostError`] - host operation failures, logged and suppressed by the commit phase
//! - [`ComponentError`] - a failure thrown by user code, routed to error boundaries
//! - [`Throw`] - what a component returns instead of output: a failure or a pending value

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use thiserror::Error;

use crate::primitives::Pending;
use crate::types::Path;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// =============================================================================
// Fatal render errors
// =============================================================================

/// A failure that aborted a render pass.
///
/// The previously committed tree stays current when a pass aborts.
#[derive(Debug, Error)]
pub enum Error {
    /// A component failed and no error boundary above it could take the failure.
    #[error("component at `{path}` failed to render: {error}")]
    Render { path: Path, error: ComponentError },

    /// A component suspended with no Suspense boundary and no error boundary above it.
    #[error("component at `{path}` suspended outside of any Suspense boundary")]
    UnhandledSuspend { path: Path },

    /// State kept changing during a synchronous flush.
    #[error("render did not settle after {passes} passes")]
    RenderLoop { passes: usize },
}

// =============================================================================
// Host errors
// =============================================================================

/// Failure reported by a [`Host`](crate::renderer::Host) operation.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("instance is not a child of the given parent")]
    NotAChild,

    #[error("instance handle is no longer live")]
    MissingInstance,

    #[error("unsupported host operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Component failures
// =============================================================================

/// A failure thrown by a component, shared between a boundary's catch
/// handler and its fallback.
#[derive(Clone)]
pub struct ComponentError(Rc<anyhow::Error>);

impl ComponentError {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self(Rc::new(error.into()))
    }

    /// Build a failure from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Rc::new(anyhow::Error::msg(message)))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ComponentError {
    type Target = anyhow::Error;

    fn deref(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Debug for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl From<anyhow::Error> for ComponentError {
    fn from(error: anyhow::Error) -> Self {
        Self(Rc::new(error))
    }
}

/// Synthetic stack descriptor handed to a boundary's catch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Path of the boundary that caught the failure.
    pub component_stack: String,
}

// =============================================================================
// Throw - component control flow
// =============================================================================

/// Why a component produced no output.
///
/// `Suspend` is not a failure: it is routed to the nearest Suspense boundary.
#[derive(Clone, Debug)]
pub enum Throw {
    Suspend(Pending),
    Fail(ComponentError),
}

impl Throw {
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::Fail(ComponentError::msg(message))
    }
}

impl From<anyhow::Error> for Throw {
    fn from(error: anyhow::Error) -> Self {
        Self::Fail(ComponentError::from(error))
    }
}

impl From<ComponentError> for Throw {
    fn from(error: ComponentError) -> Self {
        Self::Fail(error)
    }
}

impl From<Pending> for Throw {
    fn from(pending: Pending) -> Self {
        Self::Suspend(pending)
    }
}
