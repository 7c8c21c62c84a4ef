//! The mutation gateway.
//!
//! Every change to keys, commands, shortcuts, the context or the manager
//! state is expressed as a [`Mutation`] and submitted through
//! [`Manager::set`]. The gateway validates the mutation, asks the can-set
//! hooks, applies it and finally notifies the did-set hooks.

use std::fmt;

use horizon_shortcuts_core::shortcuts_trace;

use crate::chain::{Chain, equals_key};
use crate::command::{Command, ExecuteFn};
use crate::condition::{Condition, Context};
use crate::error::{Result, ShortcutError};
use crate::key::{Key, KeyLayout, ToggleMode, ToggleState, toggle_off_id, toggle_on_id};
use crate::keys::check_variants;
use crate::manager::Manager;
use crate::shortcut::{Shortcut, ShortcutId};
use crate::validate::{
    ValidationRules, canonicalize, check_duplicate, check_known, validate_chain, validate_shortcut,
};

// =============================================================================
// Changes
// =============================================================================

/// A change to a registered key.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyChange {
    Label(Option<String>),
    Variants(Vec<String>),
    IsModifier(bool),
    IsToggle(ToggleMode),
    Pressed(bool),
    ToggleState(ToggleState),
    Layout(KeyLayout),
}

/// A change to a registered command.
#[derive(Clone)]
pub enum CommandChange {
    Name(String),
    Execute(Option<ExecuteFn>),
    Condition(Condition),
    Description(Option<String>),
}

impl fmt::Debug for CommandChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Execute(execute) => f.debug_tuple("Execute").field(&execute.is_some()).finish(),
            Self::Condition(condition) => f.debug_tuple("Condition").field(condition).finish(),
            Self::Description(description) => {
                f.debug_tuple("Description").field(description).finish()
            }
        }
    }
}

/// A change to a registered shortcut.
#[derive(Clone, Debug)]
pub enum ShortcutChange {
    Chain(Chain),
    Command(Option<String>),
    Condition(Condition),
    Enabled(bool),
    ForceUnequal(bool),
}

/// A change to the chain-building state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    Chain(Chain),
    NextIsChord(bool),
    IsAwaitingKeyup(bool),
    Untrigger(Option<ShortcutId>),
    IsRecording(bool),
}

/// Any change the manager accepts.
#[derive(Clone, Debug)]
pub enum Mutation {
    Key { id: String, change: KeyChange },
    Command { name: String, change: CommandChange },
    Shortcut { id: ShortcutId, change: ShortcutChange },
    State(StateChange),
    Context(Context),
    AddKey(Key),
    RemoveKey(String),
    AddCommand(Command),
    RemoveCommand(String),
    AddShortcut(Shortcut),
    RemoveShortcut(ShortcutId),
}

/// The hook channel a mutation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MutationKind {
    KeyLabel,
    KeyVariants,
    KeyIsModifier,
    KeyIsToggle,
    KeyPressed,
    KeyToggleState,
    KeyLayout,
    CommandName,
    CommandExecute,
    CommandCondition,
    CommandDescription,
    ShortcutChain,
    ShortcutCommand,
    ShortcutCondition,
    ShortcutEnabled,
    ShortcutForceUnequal,
    StateChain,
    StateNextIsChord,
    StateIsAwaitingKeyup,
    StateUntrigger,
    StateIsRecording,
    Context,
    AddKey,
    RemoveKey,
    AddCommand,
    RemoveCommand,
    AddShortcut,
    RemoveShortcut,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Key { change, .. } => match change {
                KeyChange::Label(_) => MutationKind::KeyLabel,
                KeyChange::Variants(_) => MutationKind::KeyVariants,
                KeyChange::IsModifier(_) => MutationKind::KeyIsModifier,
                KeyChange::IsToggle(_) => MutationKind::KeyIsToggle,
                KeyChange::Pressed(_) => MutationKind::KeyPressed,
                KeyChange::ToggleState(_) => MutationKind::KeyToggleState,
                KeyChange::Layout(_) => MutationKind::KeyLayout,
            },
            Self::Command { change, .. } => match change {
                CommandChange::Name(_) => MutationKind::CommandName,
                CommandChange::Execute(_) => MutationKind::CommandExecute,
                CommandChange::Condition(_) => MutationKind::CommandCondition,
                CommandChange::Description(_) => MutationKind::CommandDescription,
            },
            Self::Shortcut { change, .. } => match change {
                ShortcutChange::Chain(_) => MutationKind::ShortcutChain,
                ShortcutChange::Command(_) => MutationKind::ShortcutCommand,
                ShortcutChange::Condition(_) => MutationKind::ShortcutCondition,
                ShortcutChange::Enabled(_) => MutationKind::ShortcutEnabled,
                ShortcutChange::ForceUnequal(_) => MutationKind::ShortcutForceUnequal,
            },
            Self::State(change) => match change {
                StateChange::Chain(_) => MutationKind::StateChain,
                StateChange::NextIsChord(_) => MutationKind::StateNextIsChord,
                StateChange::IsAwaitingKeyup(_) => MutationKind::StateIsAwaitingKeyup,
                StateChange::Untrigger(_) => MutationKind::StateUntrigger,
                StateChange::IsRecording(_) => MutationKind::StateIsRecording,
            },
            Self::Context(_) => MutationKind::Context,
            Self::AddKey(_) => MutationKind::AddKey,
            Self::RemoveKey(_) => MutationKind::RemoveKey,
            Self::AddCommand(_) => MutationKind::AddCommand,
            Self::RemoveCommand(_) => MutationKind::RemoveCommand,
            Self::AddShortcut(_) => MutationKind::AddShortcut,
            Self::RemoveShortcut(_) => MutationKind::RemoveShortcut,
        }
    }
}

// =============================================================================
// Options and Outcome
// =============================================================================

/// Whether a mutation is committed or only checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Check {
    /// Validate, apply and notify.
    #[default]
    Commit,
    /// Validate only.
    Only,
}

/// Options for [`Manager::set`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub check: Check,
    /// Remove keys and commands even while shortcuts use them.
    pub force: bool,
}

impl SetOptions {
    pub fn check_only() -> Self {
        Self {
            check: Check::Only,
            ..Default::default()
        }
    }

    pub fn forced() -> Self {
        Self {
            force: true,
            ..Default::default()
        }
    }
}

/// What [`Manager::set`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// The mutation passed validation and was not applied.
    Checked,
    /// The mutation was applied.
    Applied,
    /// A shortcut was registered under this id.
    ShortcutAdded(ShortcutId),
}

impl SetOutcome {
    /// The id of a newly registered shortcut. Applying
    /// [`Mutation::AddShortcut`] always yields one.
    pub fn shortcut_id(self) -> Option<ShortcutId> {
        match self {
            Self::ShortcutAdded(id) => Some(id),
            Self::Checked | Self::Applied => None,
        }
    }
}

// =============================================================================
// Validation and Apply
// =============================================================================

impl Manager {
    pub(crate) fn rules(&self) -> ValidationRules {
        ValidationRules {
            allow_only_modifier_chords: self.options.allow_only_modifier_chords,
            allow_variants: self.options.allow_variants,
        }
    }

    /// A copy of the chain in canonical order.
    pub(crate) fn canonical(&self, chain: &Chain) -> Chain {
        let mut chain = chain.clone();
        canonicalize(&mut chain, &self.keys, &*self.options.sorter);
        chain
    }

    /// Built-in validation, run before the can-set hooks.
    pub(crate) fn validate_mutation(&self, mutation: &Mutation, options: SetOptions) -> Result<()> {
        match mutation {
            Mutation::Key { id, change } => self.validate_key_change(id, change),
            Mutation::Command { name, change } => {
                if !self.commands.contains(name) {
                    return Err(ShortcutError::unknown_command(name.as_str()));
                }
                match change {
                    CommandChange::Name(new) if new != name && self.commands.contains(new) => {
                        Err(ShortcutError::DuplicateCommand { name: new.clone() })
                    }
                    _ => Ok(()),
                }
            }
            Mutation::Shortcut { id, change } => self.validate_shortcut_change(*id, change),
            Mutation::State(StateChange::Chain(chain)) => check_known(chain, &self.keys),
            Mutation::State(StateChange::Untrigger(Some(id))) if !self.shortcuts.contains(*id) => {
                Err(ShortcutError::UnknownShortcut { id: *id })
            }
            Mutation::State(_) | Mutation::Context(_) => Ok(()),
            Mutation::AddKey(key) => self.keys.check_new(key),
            Mutation::RemoveKey(id) => {
                if self.keys.get(id).is_none() {
                    return Err(ShortcutError::unknown_key(id.as_str()));
                }
                let shortcuts = self.shortcuts.using_key(id, &self.keys);
                if !options.force && !shortcuts.is_empty() {
                    return Err(ShortcutError::KeyInUse {
                        id: id.clone(),
                        shortcuts,
                    });
                }
                Ok(())
            }
            Mutation::AddCommand(command) => {
                if self.commands.contains(command.name()) {
                    return Err(ShortcutError::DuplicateCommand {
                        name: command.name().to_string(),
                    });
                }
                Ok(())
            }
            Mutation::RemoveCommand(name) => {
                if !self.commands.contains(name) {
                    return Err(ShortcutError::unknown_command(name.as_str()));
                }
                let shortcuts = self.shortcuts.using_command(name);
                if !options.force && !shortcuts.is_empty() {
                    return Err(ShortcutError::CommandInUse {
                        name: name.clone(),
                        shortcuts,
                    });
                }
                Ok(())
            }
            Mutation::AddShortcut(shortcut) => {
                let mut candidate = shortcut.clone();
                candidate.chain = self.canonical(&shortcut.chain);
                self.validate_candidate(&candidate, None)
            }
            Mutation::RemoveShortcut(id) => {
                if !self.shortcuts.contains(*id) {
                    return Err(ShortcutError::UnknownShortcut { id: *id });
                }
                Ok(())
            }
        }
    }

    fn validate_candidate(&self, candidate: &Shortcut, skip: Option<ShortcutId>) -> Result<()> {
        validate_shortcut(candidate, &self.keys, &self.commands, self.rules())?;
        check_duplicate(
            candidate,
            skip,
            &self.shortcuts,
            &self.keys,
            &*self.options.evaluator,
            self.options.allow_variants,
        )
    }

    fn validate_key_change(&self, id: &str, change: &KeyChange) -> Result<()> {
        let Some(key) = self.keys.get(id) else {
            return Err(ShortcutError::unknown_key(id));
        };
        match change {
            KeyChange::Variants(variants) => {
                check_variants(id, variants)?;
                self.revalidate_with(id, change)
            }
            KeyChange::IsToggle(mode) => {
                if *mode != ToggleMode::None && !key.is_toggle() {
                    for sub_id in [toggle_on_id(id), toggle_off_id(id)] {
                        if self.keys.contains(&sub_id) {
                            return Err(ShortcutError::DuplicateKey { id: sub_id });
                        }
                    }
                }
                self.revalidate_with(id, change)
            }
            KeyChange::IsModifier(_) => self.revalidate_with(id, change),
            _ => Ok(()),
        }
    }

    /// Re-check every registered chain against the keys as they would be
    /// after the change.
    fn revalidate_with(&self, id: &str, change: &KeyChange) -> Result<()> {
        let mut keys = self.keys.clone();
        if let Some(key) = keys.get_mut(id) {
            apply_key_change(key, change);
        }
        keys.reindex();
        for (_, shortcut) in self.shortcuts.iter() {
            validate_chain(shortcut.chain(), &keys, self.rules())?;
        }
        Ok(())
    }

    fn validate_shortcut_change(&self, id: ShortcutId, change: &ShortcutChange) -> Result<()> {
        let Some(current) = self.shortcuts.get(id) else {
            return Err(ShortcutError::UnknownShortcut { id });
        };
        let mut candidate = current.clone();
        match change {
            ShortcutChange::Chain(chain) => candidate.chain = self.canonical(chain),
            ShortcutChange::Command(command) => candidate.command = command.clone(),
            ShortcutChange::Condition(condition) => candidate.condition = condition.clone(),
            ShortcutChange::ForceUnequal(force) => candidate.force_unequal = *force,
            ShortcutChange::Enabled(_) => return Ok(()),
        }
        self.validate_candidate(&candidate, Some(id))
    }

    /// Apply a validated mutation.
    pub(crate) fn apply_mutation(&mut self, mutation: &Mutation, options: SetOptions) -> SetOutcome {
        match mutation {
            Mutation::Key { id, change } => self.apply_key(id, change),
            Mutation::Command { name, change } => self.apply_command(name, change),
            Mutation::Shortcut { id, change } => self.apply_shortcut(*id, change),
            Mutation::State(change) => match change {
                StateChange::Chain(chain) => self.state.chain = self.canonical(chain),
                StateChange::NextIsChord(value) => self.state.next_is_chord = *value,
                StateChange::IsAwaitingKeyup(value) => self.state.is_awaiting_keyup = *value,
                StateChange::Untrigger(value) => self.state.untrigger = *value,
                StateChange::IsRecording(value) => self.state.is_recording = *value,
            },
            Mutation::Context(context) => self.context = context.clone(),
            Mutation::AddKey(key) => {
                self.keys.insert(key.clone());
                self.recanonicalize();
            }
            Mutation::RemoveKey(id) => self.apply_remove_key(id, options.force),
            Mutation::AddCommand(command) => self.commands.insert(command.clone()),
            Mutation::RemoveCommand(name) => {
                for sid in self.shortcuts.using_command(name) {
                    if let Some(shortcut) = self.shortcuts.get_mut(sid) {
                        shortcut.command = None;
                    }
                }
                self.commands.remove(name);
            }
            Mutation::AddShortcut(shortcut) => {
                let mut shortcut = shortcut.clone();
                shortcut.chain = self.canonical(&shortcut.chain);
                return SetOutcome::ShortcutAdded(self.shortcuts.insert(shortcut));
            }
            Mutation::RemoveShortcut(id) => {
                self.shortcuts.remove(*id);
                if self.state.untrigger == Some(*id) {
                    self.state.untrigger = None;
                }
            }
        }
        SetOutcome::Applied
    }

    fn apply_key(&mut self, id: &str, change: &KeyChange) {
        let Some(key) = self.keys.get_mut(id) else {
            return;
        };
        apply_key_change(key, change);
        if matches!(
            change,
            KeyChange::Variants(_) | KeyChange::IsToggle(_) | KeyChange::IsModifier(_)
        ) {
            self.keys.reindex();
            self.recanonicalize();
        }
    }

    fn apply_shortcut(&mut self, id: ShortcutId, change: &ShortcutChange) {
        let Some(shortcut) = self.shortcuts.get_mut(id) else {
            return;
        };
        match change {
            ShortcutChange::Chain(chain) => {
                let mut chain = chain.clone();
                canonicalize(&mut chain, &self.keys, &*self.options.sorter);
                shortcut.chain = chain;
            }
            ShortcutChange::Command(command) => shortcut.command = command.clone(),
            ShortcutChange::Condition(condition) => shortcut.condition = condition.clone(),
            ShortcutChange::Enabled(enabled) => shortcut.enabled = *enabled,
            ShortcutChange::ForceUnequal(force) => shortcut.force_unequal = *force,
        }
    }

    fn apply_command(&mut self, name: &str, change: &CommandChange) {
        match change {
            CommandChange::Name(new) => {
                if new == name {
                    return;
                }
                for sid in self.shortcuts.using_command(name) {
                    if let Some(shortcut) = self.shortcuts.get_mut(sid) {
                        shortcut.command = Some(new.clone());
                    }
                }
                self.commands.rename(name, new);
            }
            CommandChange::Execute(execute) => {
                if let Some(command) = self.commands.get_mut(name) {
                    command.execute = execute.clone();
                }
            }
            CommandChange::Condition(condition) => {
                if let Some(command) = self.commands.get_mut(name) {
                    command.condition = condition.clone();
                }
            }
            CommandChange::Description(description) => {
                if let Some(command) = self.commands.get_mut(name) {
                    command.description = description.clone();
                }
            }
        }
    }

    fn apply_remove_key(&mut self, id: &str, force: bool) {
        if force {
            for sid in self.shortcuts.using_key(id, &self.keys) {
                shortcuts_trace!(key = id, shortcut = ?sid, "removing shortcut with key");
                self.shortcuts.remove(sid);
                if self.state.untrigger == Some(sid) {
                    self.state.untrigger = None;
                }
            }
        }
        if self.state.chain.ids().any(|k| equals_key(k, id, &self.keys, false)) {
            self.state.chain = Chain::empty();
            self.state.next_is_chord = false;
        }
        self.keys.remove(id);
    }

    /// Re-sort stored chains after a key changed class.
    fn recanonicalize(&mut self) {
        let sorter = self.options.sorter.clone();
        for (_, shortcut) in self.shortcuts.iter_mut() {
            canonicalize(&mut shortcut.chain, &self.keys, &*sorter);
        }
        canonicalize(&mut self.state.chain, &self.keys, &*sorter);
    }
}

fn apply_key_change(key: &mut Key, change: &KeyChange) {
    match change {
        KeyChange::Label(label) => key.label = label.clone(),
        KeyChange::Variants(variants) => key.variants = variants.clone(),
        KeyChange::IsModifier(value) => key.is_modifier = *value,
        KeyChange::IsToggle(mode) => {
            key.is_toggle = *mode;
            if *mode == ToggleMode::None {
                key.toggle_state = ToggleState::Untoggled;
            }
        }
        KeyChange::Pressed(value) => key.pressed = *value,
        KeyChange::ToggleState(state) => key.toggle_state = *state,
        KeyChange::Layout(layout) => key.layout = *layout,
    }
}
