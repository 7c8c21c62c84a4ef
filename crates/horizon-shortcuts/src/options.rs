//! Manager configuration.

use std::fmt;
use std::sync::Arc;

use horizon_shortcuts_core::shortcuts_warn;

use crate::condition::{ConditionEvaluator, FlagEvaluator};
use crate::error::ShortcutError;
use crate::event::RawInputEvent;
use crate::manager::Manager;
use crate::sorter::{DefaultSorter, Sorter};
use crate::stringifier::{DefaultStringifier, Stringifier};

/// Receives errors raised while processing input, where no caller is
/// waiting for a `Result`.
pub type FailureCallback =
    Arc<dyn Fn(&mut Manager, &ShortcutError, Option<&RawInputEvent>) + Send + Sync>;

/// What the resolver does when the chain cannot reach any shortcut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoMatchPolicy {
    /// Reset the chain to empty.
    #[default]
    ClearChain,
    /// Leave the chain as it is.
    Keep,
}

/// The default failure callback: log and clear the chain.
pub fn default_callback(manager: &mut Manager, error: &ShortcutError, event: Option<&RawInputEvent>) {
    shortcuts_warn!(
        kind = ?error.kind(),
        code = event.and_then(|e| e.code.as_deref()),
        "{error}"
    );
    if let Err(err) = manager.clear_chain() {
        shortcuts_warn!(kind = ?err.kind(), "failed to clear chain: {err}");
    }
}

/// Configuration for a [`Manager`].
#[derive(Clone)]
pub struct ManagerOptions {
    /// Canonical chord order.
    pub sorter: Arc<dyn Sorter>,
    /// Rendering of keys and chains.
    pub stringifier: Arc<dyn Stringifier>,
    /// Condition evaluation and equality.
    pub evaluator: Arc<dyn ConditionEvaluator>,
    /// Failure callback for errors raised while processing input.
    pub cb: FailureCallback,
    /// Accept chords made only of modifiers.
    pub allow_only_modifier_chords: bool,
    /// Let shortcuts without a command take part in matching.
    pub allow_empty_command: bool,
    /// Honor declared variants when comparing keys.
    pub allow_variants: bool,
    /// Seed each new chord with the modifiers still held.
    pub carry_modifiers: bool,
    /// Adopt native toggle states reported by raw events.
    pub sync_native_state: bool,
    /// Behavior when the chain cannot reach any shortcut.
    pub no_match: NoMatchPolicy,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            sorter: Arc::new(DefaultSorter),
            stringifier: Arc::new(DefaultStringifier),
            evaluator: Arc::new(FlagEvaluator),
            cb: Arc::new(default_callback),
            allow_only_modifier_chords: false,
            allow_empty_command: false,
            allow_variants: true,
            carry_modifiers: true,
            sync_native_state: true,
            no_match: NoMatchPolicy::ClearChain,
        }
    }
}

impl fmt::Debug for ManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("allow_only_modifier_chords", &self.allow_only_modifier_chords)
            .field("allow_empty_command", &self.allow_empty_command)
            .field("allow_variants", &self.allow_variants)
            .field("carry_modifiers", &self.carry_modifiers)
            .field("sync_native_state", &self.sync_native_state)
            .field("no_match", &self.no_match)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a [`Manager`] with custom configuration.
///
/// # Example
///
/// ```
/// use horizon_shortcuts::{ManagerBuilder, NoMatchPolicy};
///
/// let manager = ManagerBuilder::new()
///     .allow_only_modifier_chords(true)
///     .no_match(NoMatchPolicy::Keep)
///     .build();
/// assert!(manager.options().allow_only_modifier_chords);
/// ```
#[derive(Debug, Default)]
pub struct ManagerBuilder {
    options: ManagerOptions,
}

impl ManagerBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorter(mut self, sorter: impl Sorter + 'static) -> Self {
        self.options.sorter = Arc::new(sorter);
        self
    }

    pub fn stringifier(mut self, stringifier: impl Stringifier + 'static) -> Self {
        self.options.stringifier = Arc::new(stringifier);
        self
    }

    pub fn evaluator(mut self, evaluator: impl ConditionEvaluator + 'static) -> Self {
        self.options.evaluator = Arc::new(evaluator);
        self
    }

    /// Set the failure callback.
    pub fn callback<F>(mut self, cb: F) -> Self
    where
        F: Fn(&mut Manager, &ShortcutError, Option<&RawInputEvent>) + Send + Sync + 'static,
    {
        self.options.cb = Arc::new(cb);
        self
    }

    pub fn allow_only_modifier_chords(mut self, allow: bool) -> Self {
        self.options.allow_only_modifier_chords = allow;
        self
    }

    pub fn allow_empty_command(mut self, allow: bool) -> Self {
        self.options.allow_empty_command = allow;
        self
    }

    pub fn allow_variants(mut self, allow: bool) -> Self {
        self.options.allow_variants = allow;
        self
    }

    pub fn carry_modifiers(mut self, carry: bool) -> Self {
        self.options.carry_modifiers = carry;
        self
    }

    pub fn sync_native_state(mut self, sync: bool) -> Self {
        self.options.sync_native_state = sync;
        self
    }

    pub fn no_match(mut self, policy: NoMatchPolicy) -> Self {
        self.options.no_match = policy;
        self
    }

    /// Build the manager.
    pub fn build(self) -> Manager {
        Manager::with_options(self.options)
    }
}
