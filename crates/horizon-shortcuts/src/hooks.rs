//! Can-set and did-set hook channels.
//!
//! Every [`MutationKind`] has two channels. Can-set hooks run before a
//! mutation is applied and may veto it by returning an error. Did-set hooks
//! run after it has been applied and may mutate the manager further.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_shortcuts_core::{ConnectionId, Signal};

use crate::error::Result;
use crate::manager::Manager;
use crate::mutation::{Mutation, MutationKind, SetOutcome};

/// A vetoing listener.
pub type CanHook = dyn Fn(&Manager, &Mutation) -> Result<()> + Send + Sync;

/// A notification listener.
pub type DidHook = dyn Fn(&mut Manager, &Mutation, &SetOutcome) + Send + Sync;

/// The channel a hook is registered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookEvent {
    CanSet(MutationKind),
    DidSet(MutationKind),
}

/// Token identifying a registered hook. Required to remove it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookHandle {
    event: HookEvent,
    id: ConnectionId,
}

impl HookHandle {
    pub fn event(&self) -> HookEvent {
        self.event
    }
}

#[derive(Debug, Default)]
pub(crate) struct Hooks {
    can: HashMap<MutationKind, Signal<CanHook>>,
    did: HashMap<MutationKind, Signal<DidHook>>,
}

impl Hooks {
    pub(crate) fn add_can(&mut self, kind: MutationKind, hook: Arc<CanHook>) -> HookHandle {
        let id = self.can.entry(kind).or_default().connect(hook);
        HookHandle {
            event: HookEvent::CanSet(kind),
            id,
        }
    }

    pub(crate) fn add_did(&mut self, kind: MutationKind, hook: Arc<DidHook>) -> HookHandle {
        let id = self.did.entry(kind).or_default().connect(hook);
        HookHandle {
            event: HookEvent::DidSet(kind),
            id,
        }
    }

    /// Remove a hook. Returns `false` if the handle is not registered.
    pub(crate) fn remove(&mut self, handle: HookHandle) -> bool {
        match handle.event {
            HookEvent::CanSet(kind) => self
                .can
                .get_mut(&kind)
                .is_some_and(|signal| signal.disconnect(handle.id)),
            HookEvent::DidSet(kind) => self
                .did
                .get_mut(&kind)
                .is_some_and(|signal| signal.disconnect(handle.id)),
        }
    }

    /// Snapshot of the can-set hooks for a kind.
    pub(crate) fn can(&self, kind: MutationKind) -> Vec<Arc<CanHook>> {
        self.can.get(&kind).map(Signal::slots).unwrap_or_default()
    }

    /// Snapshot of the did-set hooks for a kind.
    pub(crate) fn did(&self, kind: MutationKind) -> Vec<Arc<DidHook>> {
        self.did.get(&kind).map(Signal::slots).unwrap_or_default()
    }

    pub(crate) fn count(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::CanSet(kind) => self.can.get(&kind).map_or(0, Signal::connection_count),
            HookEvent::DidSet(kind) => self.did.get(&kind).map_or(0, Signal::connection_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut hooks = Hooks::default();
        let handle = hooks.add_can(MutationKind::AddKey, Arc::new(|_, _| Ok(())));
        hooks.add_did(MutationKind::AddKey, Arc::new(|_, _, _| {}));

        assert_eq!(handle.event(), HookEvent::CanSet(MutationKind::AddKey));
        assert_eq!(hooks.can(MutationKind::AddKey).len(), 1);
        assert_eq!(hooks.count(HookEvent::DidSet(MutationKind::AddKey)), 1);
        assert!(hooks.can(MutationKind::RemoveKey).is_empty());

        assert!(hooks.remove(handle));
        assert!(!hooks.remove(handle));
        assert!(hooks.can(MutationKind::AddKey).is_empty());
    }

    #[test]
    fn test_handles_are_per_channel() {
        let mut hooks = Hooks::default();
        let can = hooks.add_can(MutationKind::Context, Arc::new(|_, _| Ok(())));
        let moved = HookHandle {
            event: HookEvent::DidSet(MutationKind::Context),
            id: can.id,
        };
        assert!(!hooks.remove(moved));
        assert_eq!(hooks.count(can.event()), 1);
    }
}
