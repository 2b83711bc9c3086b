//! Commit phase.
//!
//! Applies a finished work-in-progress tree to the host in one pass:
//!
//! 1. Deletions: detach each deleted subtree's top-level instances.
//! 2. Pre-order walk: PLACEMENT attaches, UPDATE applies changed props.
//! 3. Swap the current tree.
//! 4. Drop hook state of components that left the tree, running cleanups.
//! 5. Release fibers no longer reachable.
//! 6. Flush layout effects, then passive effects.
//!
//! Host failures are logged and suppressed. Effect failures are logged and
//! do not stop the remaining effects.

use std::collections::HashSet;

use tracing::{debug, error, trace, warn};

use super::{Engine, FiberId, Phase};
use crate::element::ElementType;
use crate::error::HostError;
use crate::hooks::{Cleanup, EffectKind, QueuedEffect};
use crate::renderer::Host;
use crate::types::{EffectTag, Path};

impl<H: Host> Engine<H> {
    pub(crate) fn commit(&mut self) {
        let Some(root) = self.wip_root.take() else {
            return;
        };
        self.next_unit = None;

        let deletions = std::mem::take(&mut self.deletions);
        for &id in &deletions {
            self.commit_deletion(id);
        }
        for id in self.fibers.preorder(root) {
            self.commit_unit(id);
        }

        self.current_root = Some(root);
        let cleanups = self.unmount_departed(root);
        let effects = self.collect_effects(root);

        let released = self.fibers.sweep(Some(root));
        debug!(
            deletions = deletions.len(),
            released,
            effects = effects.len(),
            "committed"
        );

        for cleanup in cleanups {
            cleanup();
        }
        self.flush_effects(effects);

        self.phase = Phase::Idle;
        self.schedule.set_rendering(false);
        if self.schedule.is_queued() {
            trace!("render requested during pass; scheduling another");
            self.schedule.notify();
        }
    }

    // =========================================================================
    // Host mutations
    // =========================================================================

    fn commit_unit(&mut self, id: FiberId) {
        let fiber = &self.fibers[id];
        let Some(instance) = fiber.instance.clone() else {
            return;
        };

        if fiber.effect_tag.contains(EffectTag::PLACEMENT) {
            let parent = self.host_parent(id);
            let result = match self.host_sibling(id) {
                Some(before) => self.host.insert_before(parent.as_ref(), &instance, &before),
                None => self.host.append_child(parent.as_ref(), &instance),
            };
            log_host_error("attach", &fiber_path(self, id), result);
        } else if fiber.effect_tag.contains(EffectTag::UPDATE) {
            let Some(old_props) = fiber.alternate.and_then(|a| self.fibers.get(a)).map(|a| a.props.clone()) else {
                return;
            };
            let new_props = fiber.props.clone();
            if old_props.host_eq(&new_props) {
                return;
            }
            let result = self.host.commit_update(&instance, &old_props, &new_props);
            log_host_error("update", &fiber_path(self, id), result);
        }
    }

    fn commit_deletion(&mut self, id: FiberId) {
        let parent = self.host_parent(id);
        let mut instances = Vec::new();
        self.collect_top_instances(id, &mut instances);
        for instance in instances {
            let result = self.host.remove_child(parent.as_ref(), &instance);
            log_host_error("remove", &fiber_path(self, id), result);
        }
    }

    /// Instance of the nearest ancestor that has one. `None` is the container.
    fn host_parent(&self, id: FiberId) -> Option<H::Instance> {
        let mut current = self.fibers[id].parent;
        while let Some(parent) = current {
            let fiber = &self.fibers[parent];
            if let Some(instance) = &fiber.instance {
                return Some(instance.clone());
            }
            current = fiber.parent;
        }
        None
    }

    /// Instances directly under `id`, looking through units without one.
    fn collect_top_instances(&self, id: FiberId, out: &mut Vec<H::Instance>) {
        let fiber = &self.fibers[id];
        match &fiber.instance {
            Some(instance) => out.push(instance.clone()),
            None => {
                for child in self.fibers.children(id) {
                    self.collect_top_instances(child, out);
                }
            }
        }
    }

    /// The already-attached instance that should follow `id` in its host
    /// parent, if any.
    fn host_sibling(&self, id: FiberId) -> Option<H::Instance> {
        let mut node = id;
        loop {
            while self.fibers[node].sibling.is_none() {
                let parent = self.fibers[node].parent?;
                if self.fibers[parent].instance.is_some() {
                    return None;
                }
                node = parent;
            }
            node = self.fibers[node].sibling?;
            if let Some(instance) = self.first_attached(node) {
                return Some(instance);
            }
        }
    }

    fn first_attached(&self, id: FiberId) -> Option<H::Instance> {
        let fiber = &self.fibers[id];
        if fiber.effect_tag.contains(EffectTag::PLACEMENT) {
            return None;
        }
        if let Some(instance) = &fiber.instance {
            return Some(instance.clone());
        }
        self.fibers
            .children(id)
            .into_iter()
            .find_map(|child| self.first_attached(child))
    }

    // =========================================================================
    // Hook state and effects
    // =========================================================================

    /// Drop hook state of every path no longer rendered by a component in
    /// the committed tree, returning the cleanups it owed.
    ///
    /// Children hidden behind a Suspense fallback keep their state: they
    /// render again, at the same paths, once the boundary stops waiting.
    fn unmount_departed(&mut self, root: FiberId) -> Vec<Cleanup> {
        let mut live: HashSet<Path> = HashSet::new();
        let mut waiting: Vec<Path> = Vec::new();
        for id in self.fibers.preorder(root) {
            let fiber = &self.fibers[id];
            match fiber.ty {
                ElementType::Component(_) => {
                    live.insert(fiber.path.clone());
                }
                ElementType::Suspense if fiber.suspense.did_throw => waiting.push(fiber.path.clone()),
                _ => {}
            }
        }

        let mut cleanups = self.hooks.take_detached_cleanups();
        for path in self.hooks.paths() {
            if live.contains(&path) {
                continue;
            }
            if waiting.iter().any(|boundary| path.is_within_children(boundary)) {
                trace!(%path, "hidden behind a fallback; keeping hook state");
                continue;
            }
            if let Some(mut state) = self.hooks.remove(&path) {
                trace!(%path, component = state.component.name(), "unmounted");
                cleanups.extend(state.take_cleanups());
            }
        }
        cleanups
    }

    /// Take queued effects in tree order and clear alternates.
    fn collect_effects(&mut self, root: FiberId) -> Vec<QueuedEffect> {
        let mut effects = Vec::new();
        for id in self.fibers.preorder(root) {
            let fiber = &mut self.fibers[id];
            effects.append(&mut fiber.effects);
            fiber.alternate = None;
            fiber.effect_tag = EffectTag::NONE;
        }
        effects
    }

    /// Layout effects first, then passive effects, each in queue order.
    fn flush_effects(&mut self, effects: Vec<QueuedEffect>) {
        let (layout, passive): (Vec<_>, Vec<_>) = effects.into_iter().partition(|e| e.kind == EffectKind::Layout);
        for effect in layout.into_iter().chain(passive) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: QueuedEffect) {
        let QueuedEffect {
            path,
            index,
            kind,
            run,
            deps,
        } = effect;

        let previous = self
            .hooks
            .get_mut(&path)
            .and_then(|state| state.effect_mut(index))
            .and_then(|slot| slot.cleanup.take());
        if let Some(previous) = previous {
            previous();
        }

        let cleanup = match run() {
            Ok(cleanup) => cleanup,
            Err(err) => {
                error!(%path, index, ?kind, "effect failed: {err:#}");
                None
            }
        };

        match self.hooks.get_mut(&path).and_then(|state| state.effect_mut(index)) {
            Some(slot) => {
                slot.cleanup = cleanup;
                slot.deps = deps;
            }
            None => {
                debug!(%path, index, "effect slot gone before flush; running its cleanup now");
                if let Some(cleanup) = cleanup {
                    cleanup();
                }
            }
        }
    }
}

fn fiber_path<H: Host>(engine: &Engine<H>, id: FiberId) -> String {
    engine
        .fibers
        .get(id)
        .map(|f| f.path.to_string())
        .unwrap_or_default()
}

fn log_host_error(op: &str, path: &str, result: Result<(), HostError>) {
    match result {
        Ok(()) => {}
        Err(HostError::NotAChild) => debug!(op, path, "host: not a child; ignored"),
        Err(err) => warn!(op, path, %err, "host operation failed"),
    }
}
