//! Error boundaries.
//!
//! Any element whose props carry a catch handler is an error boundary. When a
//! component below it fails, the engine marks the boundary, calls the handler
//! once and renders the boundary's fallback instead of its children. The
//! boundary stays in the error state for the lifetime of the mount.

use crate::element::{Element, ElementType, Node, Props, create_element};
use crate::error::{ComponentError, ErrorInfo};

/// A grouping error boundary with no host instance of its own.
///
/// ```ignore
/// let el = error_boundary(
///     |e| format!("Error: {e}").into(),
///     |e, info| tracing::warn!(%e, stack = %info.component_stack, "caught"),
///     [Thrower.element(Props::new())],
/// );
/// ```
pub fn error_boundary<I>(
    fallback: impl Fn(&ComponentError) -> Node + 'static,
    on_catch: impl Fn(&ComponentError, &ErrorInfo) + 'static,
    children: I,
) -> Element
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    create_element(
        ElementType::Fragment,
        Props::new().on_catch(on_catch).with_fallback_fn(fallback),
        children,
    )
}
