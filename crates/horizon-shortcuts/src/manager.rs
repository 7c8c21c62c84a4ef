//! The shortcut manager.
//!
//! [`Manager`] owns the keys, commands, shortcuts and context, plus the
//! state of the chain being built from input. All of it changes through
//! [`Manager::set`]; the registration helpers below are thin wrappers
//! around it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use horizon_shortcuts::{Chain, Chord, Command, Key, KeyEvent, Manager, Phase, Shortcut};
//!
//! let saved = Arc::new(AtomicUsize::new(0));
//! let saved_clone = saved.clone();
//!
//! let mut manager = Manager::new();
//! manager.add_key(Key::new("ControlLeft").modifier()).unwrap();
//! manager.add_key(Key::new("KeyS")).unwrap();
//! manager
//!     .add_command(Command::new("save").with_execute(move |_, exec| {
//!         if exec.phase == Phase::KeyDown {
//!             saved_clone.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }))
//!     .unwrap();
//! manager
//!     .add_shortcut(
//!         Shortcut::new(Chain::single(Chord::new(["ControlLeft", "KeyS"]))).with_command("save"),
//!     )
//!     .unwrap();
//!
//! manager.process(&KeyEvent::down(["ControlLeft"]));
//! manager.process(&KeyEvent::down(["KeyS"]));
//! manager.process(&KeyEvent::up(["KeyS"]));
//! manager.process(&KeyEvent::up(["ControlLeft"]));
//!
//! assert_eq!(saved.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;

use horizon_shortcuts_core::targets;
use static_assertions::assert_impl_all;

use crate::chain::{Chain, Chord};
use crate::command::{Command, Commands};
use crate::condition::{Condition, Context};
use crate::error::{Result, ShortcutError};
use crate::hooks::{HookEvent, HookHandle, Hooks};
use crate::key::Key;
use crate::keys::Keys;
use crate::mutation::{
    Check, CommandChange, KeyChange, Mutation, MutationKind, SetOptions, SetOutcome,
    ShortcutChange, StateChange,
};
use crate::options::ManagerOptions;
use crate::shortcut::{Shortcut, ShortcutId, Shortcuts};
use crate::validate;

/// The chain-building state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagerState {
    /// The chain built so far.
    pub chain: Chain,
    /// Whether the next press starts a new chord.
    pub next_is_chord: bool,
    /// Latched after a trigger until every triggering key is released.
    pub is_awaiting_keyup: bool,
    /// The shortcut whose key-up phase is still pending.
    pub untrigger: Option<ShortcutId>,
    /// Whether chains are being recorded instead of matched.
    pub is_recording: bool,
}

/// Owns the shortcut set and turns key events into command executions.
#[derive(Debug)]
pub struct Manager {
    pub(crate) keys: Keys,
    pub(crate) commands: Commands,
    pub(crate) shortcuts: Shortcuts,
    pub(crate) context: Context,
    pub(crate) options: ManagerOptions,
    pub(crate) hooks: Hooks,
    pub(crate) state: ManagerState,
}

assert_impl_all!(Manager: Send, Sync);

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Create a manager with default options.
    pub fn new() -> Self {
        Self::with_options(ManagerOptions::default())
    }

    /// Create a manager with the given options.
    pub fn with_options(options: ManagerOptions) -> Self {
        Self {
            keys: Keys::new(),
            commands: Commands::new(),
            shortcuts: Shortcuts::new(),
            context: Context::default(),
            options,
            hooks: Hooks::default(),
            state: ManagerState::default(),
        }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn shortcuts(&self) -> &Shortcuts {
        &self.shortcuts
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn state(&self) -> &ManagerState {
        &self.state
    }

    /// The chain built so far.
    pub fn chain(&self) -> &Chain {
        &self.state.chain
    }

    // =========================================================================
    // Mutation Gateway
    // =========================================================================

    /// Submit a mutation.
    ///
    /// The mutation is validated, then offered to every can-set hook of its
    /// kind in registration order. The first error aborts it with nothing
    /// changed. With [`Check::Only`] that is all that happens; otherwise the
    /// mutation is applied and every did-set hook runs.
    ///
    /// Hook lists are snapshotted before they run, so hooks may add or
    /// remove hooks.
    #[tracing::instrument(level = "trace", skip_all, fields(kind = ?mutation.kind()))]
    pub fn set(&mut self, mutation: Mutation, options: SetOptions) -> Result<SetOutcome> {
        let kind = mutation.kind();
        if let Err(err) = self.validate_mutation(&mutation, options) {
            tracing::debug!(target: targets::MUTATION, ?kind, %err, "mutation rejected");
            return Err(err);
        }
        for hook in self.hooks.can(kind) {
            if let Err(err) = hook(self, &mutation) {
                tracing::debug!(target: targets::MUTATION, ?kind, %err, "mutation vetoed");
                return Err(err);
            }
        }
        if options.check == Check::Only {
            return Ok(SetOutcome::Checked);
        }

        let outcome = self.apply_mutation(&mutation, options);
        tracing::trace!(target: targets::MUTATION, ?kind, ?outcome, "mutation applied");

        for hook in self.hooks.did(kind) {
            hook(self, &mutation, &outcome);
        }
        Ok(outcome)
    }

    fn commit(&mut self, mutation: Mutation, options: SetOptions) -> Result<()> {
        self.set(mutation, options).map(|_| ())
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Register a hook that may veto mutations of `kind`.
    pub fn add_can_hook<F>(&mut self, kind: MutationKind, hook: F) -> HookHandle
    where
        F: Fn(&Manager, &Mutation) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.add_can(kind, Arc::new(hook))
    }

    /// Register a hook notified after mutations of `kind` are applied.
    pub fn add_did_hook<F>(&mut self, kind: MutationKind, hook: F) -> HookHandle
    where
        F: Fn(&mut Manager, &Mutation, &SetOutcome) + Send + Sync + 'static,
    {
        self.hooks.add_did(kind, Arc::new(hook))
    }

    /// Remove a hook.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not registered (already removed, or from
    /// another manager).
    pub fn remove_hook(&mut self, handle: HookHandle) {
        if !self.hooks.remove(handle) {
            panic!("hook not found: {handle:?}");
        }
    }

    /// Number of hooks registered on a channel.
    pub fn hook_count(&self, event: HookEvent) -> usize {
        self.hooks.count(event)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn add_key(&mut self, key: Key) -> Result<()> {
        self.commit(Mutation::AddKey(key), SetOptions::default())
    }

    /// Add several keys, stopping at the first rejected one.
    pub fn add_keys(&mut self, keys: impl IntoIterator<Item = Key>) -> Result<()> {
        keys.into_iter().try_for_each(|key| self.add_key(key))
    }

    /// Remove a key. With `force`, the shortcuts using it are removed too.
    pub fn remove_key(&mut self, id: &str, force: bool) -> Result<()> {
        let options = SetOptions {
            force,
            ..Default::default()
        };
        self.commit(Mutation::RemoveKey(id.to_string()), options)
    }

    pub fn add_command(&mut self, command: Command) -> Result<()> {
        self.commit(Mutation::AddCommand(command), SetOptions::default())
    }

    /// Remove a command. With `force`, shortcuts bound to it lose their
    /// command instead of blocking the removal.
    pub fn remove_command(&mut self, name: &str, force: bool) -> Result<()> {
        let options = SetOptions {
            force,
            ..Default::default()
        };
        self.commit(Mutation::RemoveCommand(name.to_string()), options)
    }

    /// Register a shortcut and return its id.
    pub fn add_shortcut(&mut self, shortcut: Shortcut) -> Result<ShortcutId> {
        let outcome = self.set(Mutation::AddShortcut(shortcut), SetOptions::default())?;
        outcome
            .shortcut_id()
            .ok_or_else(|| ShortcutError::vetoed(format!("shortcut not registered ({outcome:?})")))
    }

    pub fn remove_shortcut(&mut self, id: ShortcutId) -> Result<()> {
        self.commit(Mutation::RemoveShortcut(id), SetOptions::default())
    }

    pub fn set_key(&mut self, id: &str, change: KeyChange) -> Result<()> {
        let mutation = Mutation::Key {
            id: id.to_string(),
            change,
        };
        self.commit(mutation, SetOptions::default())
    }

    pub fn set_command(&mut self, name: &str, change: CommandChange) -> Result<()> {
        let mutation = Mutation::Command {
            name: name.to_string(),
            change,
        };
        self.commit(mutation, SetOptions::default())
    }

    pub fn set_shortcut(&mut self, id: ShortcutId, change: ShortcutChange) -> Result<()> {
        self.commit(Mutation::Shortcut { id, change }, SetOptions::default())
    }

    pub fn set_context(&mut self, context: impl Into<Context>) -> Result<()> {
        self.commit(Mutation::Context(context.into()), SetOptions::default())
    }

    /// Start recording: chains are built but never matched.
    pub fn start_recording(&mut self) -> Result<()> {
        self.clear_chain()?;
        self.commit(Mutation::State(StateChange::IsRecording(true)), SetOptions::default())
    }

    /// Stop recording and return the recorded chain.
    pub fn stop_recording(&mut self) -> Result<Chain> {
        let recorded = self.state.chain.clone();
        self.commit(Mutation::State(StateChange::IsRecording(false)), SetOptions::default())?;
        self.clear_chain()?;
        Ok(recorded)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Validate a candidate chain without registering it.
    pub fn validate_chain(&self, chain: &Chain) -> Result<()> {
        validate::validate_chain(&self.canonical(chain), &self.keys, self.rules())
    }

    /// Registered shortcuts that would shadow or be shadowed by `chain`
    /// under the same condition.
    pub fn find_conflicts(&self, chain: &Chain, condition: &Condition) -> Vec<ShortcutId> {
        validate::find_conflicts(
            chain,
            condition,
            &self.shortcuts,
            &self.keys,
            &*self.options.evaluator,
            self.options.allow_variants,
        )
    }

    pub fn stringify_key(&self, id: &str) -> String {
        self.options.stringifier.key(id, &self.keys)
    }

    pub fn stringify_chord(&self, chord: &Chord) -> String {
        self.options.stringifier.chord(chord, &self.keys)
    }

    pub fn stringify_chain(&self, chain: &Chain) -> String {
        self.options.stringifier.chain(chain, &self.keys)
    }

    pub fn stringify_shortcut(&self, id: ShortcutId) -> Option<String> {
        self.shortcuts
            .get(id)
            .map(|shortcut| self.options.stringifier.shortcut(shortcut, &self.keys))
    }
}
