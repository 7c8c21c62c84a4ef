//! Commands bound to shortcuts.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::condition::{Condition, ConditionEvaluator};
use crate::event::RawInputEvent;
use crate::manager::Manager;
use crate::shortcut::{Shortcut, ShortcutId};

/// Which half of a trigger is executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The chain just matched.
    KeyDown,
    /// The first release after a match.
    KeyUp,
}

/// Everything an execute callback is told about its invocation.
#[derive(Clone, Copy, Debug)]
pub struct Execution<'a> {
    pub phase: Phase,
    pub shortcut_id: ShortcutId,
    pub shortcut: &'a Shortcut,
    pub event: Option<&'a RawInputEvent>,
}

/// Callback run when a command triggers.
///
/// It receives the manager mutably and may re-enter it (clear the chain,
/// register shortcuts, ...).
pub type ExecuteFn = Arc<dyn Fn(&mut Manager, &Execution<'_>) + Send + Sync>;

/// A named command.
#[derive(Clone, Default)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) execute: Option<ExecuteFn>,
    pub(crate) condition: Condition,
    pub(crate) description: Option<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the execute callback.
    pub fn with_execute<F>(mut self, execute: F) -> Self
    where
        F: Fn(&mut Manager, &Execution<'_>) + Send + Sync + 'static,
    {
        self.execute = Some(Arc::new(execute));
        self
    }

    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self) -> Option<&ExecuteFn> {
        self.execute.as_ref()
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Structural equality: name, callback identity, description and
    /// condition.
    pub fn equals(&self, other: &Command, evaluator: &dyn ConditionEvaluator) -> bool {
        let same_execute = match (&self.execute, &other.execute) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.name == other.name
            && same_execute
            && self.description == other.description
            && evaluator.equals(&self.condition, &other.condition)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("has_execute", &self.execute.is_some())
            .field("condition", &self.condition)
            .field("description", &self.description)
            .finish()
    }
}

/// All registered commands, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Commands {
    entries: BTreeMap<String, Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, command: Command) {
        self.entries.insert(command.name.clone(), command);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Command> {
        self.entries.remove(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.entries.get_mut(name)
    }

    /// Move a command to a new name. The caller checks the name is free.
    pub(crate) fn rename(&mut self, from: &str, to: &str) {
        if let Some(mut command) = self.entries.remove(from) {
            command.name = to.to_string();
            self.entries.insert(to.to_string(), command);
        }
    }
}
