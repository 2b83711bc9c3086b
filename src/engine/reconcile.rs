//! Positional child diff.
//!
//! New elements and the previous render's child fibers are walked in
//! parallel by index:
//!
//! ```text
//! same type, same path   -> UPDATE (instance reused, old fiber as alternate)
//! otherwise              -> PLACEMENT for the new element
//!                           DELETION for the old fiber
//! ```
//!
//! There are no keys. Props never force a PLACEMENT.

use tracing::trace;

use super::{Engine, Fiber, FiberId};
use crate::element::{Node, normalize_children};
use crate::renderer::Host;
use crate::types::{EffectTag, Path};

/// Which branch of a unit's output is being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    Children,
    Fallback,
}

impl Segment {
    fn path(self, parent: &Path, index: usize) -> Path {
        match self {
            Self::Children => parent.child(index),
            Self::Fallback => parent.fallback_child(index),
        }
    }
}

impl<H: Host> Engine<H> {
    /// Rebuild the child list of `parent` from `nodes`.
    pub(crate) fn reconcile_children(&mut self, parent: FiberId, nodes: &[Node], segment: Segment) {
        let elements = normalize_children(nodes);
        let parent_path = self.fibers[parent].path.clone();
        let mut old = self.fibers[parent]
            .alternate
            .and_then(|alternate| self.fibers.get(alternate))
            .and_then(|alternate| alternate.child);

        self.fibers[parent].child = None;
        let mut prev: Option<FiberId> = None;
        let mut index = 0;

        while index < elements.len() || old.is_some() {
            let element = elements.get(index);
            let path = segment.path(&parent_path, index);

            let same = match (old.and_then(|o| self.fibers.get(o)), element) {
                (Some(old_fiber), Some(element)) => {
                    old_fiber.ty.same_as(element.ty()) && old_fiber.path == path
                }
                _ => false,
            };

            let mut created = None;
            match (old, element) {
                (Some(old_id), Some(element)) if same => {
                    let old_fiber = &self.fibers[old_id];
                    let mut fiber = Fiber::new(element.ty().clone(), element.props_rc(), path);
                    fiber.instance = old_fiber.instance.clone();
                    fiber.boundary = old_fiber.boundary.clone();
                    fiber.suspense = old_fiber.suspense.carried();
                    fiber.alternate = Some(old_id);
                    fiber.effect_tag = EffectTag::UPDATE;
                    fiber.parent = Some(parent);

                    // A restarted pass may have marked this fiber earlier.
                    self.deletions.retain(|&d| d != old_id);
                    self.fibers[old_id].effect_tag = EffectTag::NONE;
                    created = Some(self.fibers.alloc(fiber));
                }
                _ => {
                    if let Some(element) = element {
                        let mut fiber = Fiber::new(element.ty().clone(), element.props_rc(), path);
                        fiber.effect_tag = EffectTag::PLACEMENT;
                        fiber.parent = Some(parent);
                        created = Some(self.fibers.alloc(fiber));
                    }
                    if let Some(old_id) = old {
                        if !self.deletions.contains(&old_id) {
                            trace!(path = %self.fibers[old_id].path, "marking for deletion");
                            self.fibers[old_id].effect_tag = EffectTag::DELETION;
                            self.deletions.push(old_id);
                        }
                    }
                }
            }

            if let Some(old_id) = old {
                old = self.fibers[old_id].sibling;
            }
            if let Some(id) = created {
                match prev {
                    Some(prev) => self.fibers[prev].sibling = Some(id),
                    None => self.fibers[parent].child = Some(id),
                }
                prev = Some(id);
            }
            index += 1;
        }
    }
}
