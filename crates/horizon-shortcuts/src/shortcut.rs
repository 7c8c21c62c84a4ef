//! Shortcuts and the shortcut collection.

use slotmap::{SlotMap, new_key_type};

use crate::chain::{Chain, equals_key, equals_keys};
use crate::condition::{Condition, ConditionEvaluator};
use crate::keys::Keys;

new_key_type! {
    /// Identifier of a registered shortcut.
    pub struct ShortcutId;
}

/// A chain bound to an optional command.
///
/// # Example
///
/// ```
/// use horizon_shortcuts::{Chain, Chord, Shortcut};
///
/// let shortcut = Shortcut::new(Chain::single(Chord::new(["Control", "KeyS"])))
///     .with_command("save")
///     .with_condition("editor.focused");
/// assert!(shortcut.is_enabled());
/// ```
#[derive(Clone, Debug)]
pub struct Shortcut {
    pub(crate) chain: Chain,
    pub(crate) command: Option<String>,
    pub(crate) condition: Condition,
    pub(crate) enabled: bool,
    pub(crate) force_unequal: bool,
}

impl Shortcut {
    /// Create an enabled shortcut without a command.
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            command: None,
            condition: Condition::default(),
            enabled: true,
            force_unequal: false,
        }
    }

    pub fn with_command(mut self, name: impl Into<String>) -> Self {
        self.command = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Never compare equal to another shortcut.
    ///
    /// Meant for shortcuts that represent an edit in progress.
    pub fn force_unequal(mut self) -> Self {
        self.force_unequal = true;
        self
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_force_unequal(&self) -> bool {
        self.force_unequal
    }

    /// Whether two shortcuts are duplicates of each other: equal chains,
    /// same command and equivalent conditions.
    pub fn equals(
        &self,
        other: &Shortcut,
        keys: &Keys,
        evaluator: &dyn ConditionEvaluator,
        allow_variants: bool,
    ) -> bool {
        !self.force_unequal
            && !other.force_unequal
            && self.command == other.command
            && evaluator.equals(&self.condition, &other.condition)
            && equals_keys(&self.chain, &other.chain, keys, allow_variants, None)
    }

    /// Whether the chain mentions the key, directly or through a toggle
    /// sub-id.
    pub fn uses_key(&self, id: &str, keys: &Keys) -> bool {
        self.chain.ids().any(|key| equals_key(key, id, keys, false))
    }
}

/// All registered shortcuts.
#[derive(Clone, Debug, Default)]
pub struct Shortcuts {
    entries: SlotMap<ShortcutId, Shortcut>,
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ShortcutId) -> Option<&Shortcut> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: ShortcutId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShortcutId, &Shortcut)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the shortcuts whose chain mentions the key.
    pub fn using_key(&self, id: &str, keys: &Keys) -> Vec<ShortcutId> {
        self.entries
            .iter()
            .filter(|(_, shortcut)| shortcut.uses_key(id, keys))
            .map(|(sid, _)| sid)
            .collect()
    }

    /// Ids of the shortcuts bound to the command.
    pub fn using_command(&self, name: &str) -> Vec<ShortcutId> {
        self.entries
            .iter()
            .filter(|(_, shortcut)| shortcut.command() == Some(name))
            .map(|(sid, _)| sid)
            .collect()
    }

    pub(crate) fn insert(&mut self, shortcut: Shortcut) -> ShortcutId {
        self.entries.insert(shortcut)
    }

    pub(crate) fn remove(&mut self, id: ShortcutId) -> Option<Shortcut> {
        self.entries.remove(id)
    }

    pub(crate) fn get_mut(&mut self, id: ShortcutId) -> Option<&mut Shortcut> {
        self.entries.get_mut(id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ShortcutId, &mut Shortcut)> {
        self.entries.iter_mut()
    }
}
