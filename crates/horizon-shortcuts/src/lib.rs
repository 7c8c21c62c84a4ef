//! Horizon Shortcuts - a chord and chain keyboard shortcut engine.
//!
//! Shortcuts are sequences of chords, where a chord is a set of keys held
//! together. A [`Manager`] holds the registered [`Key`]s, [`Command`]s and
//! [`Shortcut`]s, turns key events into the current [`Chain`] and runs the
//! command of the shortcut that chain matches.
//!
//! Main pieces:
//!
//! - **Keys**: modifiers, toggles (with `On`/`Off` sub-ids), mouse buttons,
//!   wheel directions and variants such as `ControlLeft`/`ControlRight`
//! - **Validation**: every chain is canonicalized and checked before it is
//!   registered; duplicate and ambiguous shortcuts are rejected
//! - **Mutations**: all changes go through [`Manager::set`], which runs
//!   validation and `can`/`did` hooks
//! - **Engine**: [`Manager::process`] builds the chain, triggers on key-down
//!   and untriggers on the first key-up afterwards
//!
//! See [`manager`] for a complete example.

pub mod chain;
pub mod command;
pub mod condition;
mod engine;
pub mod error;
pub mod event;
pub mod hooks;
pub mod key;
pub mod keys;
pub mod manager;
pub mod mutation;
pub mod options;
mod resolver;
pub mod shortcut;
pub mod sorter;
pub mod stringifier;
pub mod validate;

pub use chain::{
    Chain, Chord, SequenceMatch, equals_chord, equals_key, equals_keys, is_chord_subset,
    is_full_prefix, is_in_chain,
};
pub use command::{Command, Commands, ExecuteFn, Execution, Phase};
pub use condition::{Condition, ConditionEvaluator, Context, FlagEvaluator};
pub use error::{ErrorKind, Result, ShortcutError};
pub use event::{KeyEvent, RawInputEvent};
pub use hooks::{CanHook, DidHook, HookEvent, HookHandle};
pub use key::{
    Key, KeyClass, KeyLayout, ToggleMode, ToggleState, WHEEL_DOWN, WHEEL_UP, toggle_off_id,
    toggle_on_id,
};
pub use keys::Keys;
pub use manager::{Manager, ManagerState};
pub use mutation::{
    Check, CommandChange, KeyChange, Mutation, MutationKind, SetOptions, SetOutcome,
    ShortcutChange, StateChange,
};
pub use options::{FailureCallback, ManagerBuilder, ManagerOptions, NoMatchPolicy, default_callback};
pub use shortcut::{Shortcut, ShortcutId, Shortcuts};
pub use sorter::{DefaultSorter, Sorter};
pub use stringifier::{DefaultStringifier, Stringifier};
pub use validate::ValidationRules;
