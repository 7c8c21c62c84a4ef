//! Error types for the shortcut engine.

use crate::chain::{Chain, Chord};
use crate::shortcut::ShortcutId;

/// Result type alias for shortcut operations.
pub type Result<T> = std::result::Result<T, ShortcutError>;

/// Machine-checkable kind of a [`ShortcutError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateKey,
    DuplicateCommand,
    DuplicateShortcut,
    UnknownKey,
    UnknownKeysInShortcut,
    UnknownCommand,
    UnknownShortcut,
    KeyInUse,
    CommandInUse,
    InvalidVariant,
    EmptyChain,
    EmptyChord,
    ChordWithDuplicateKey,
    ChordWithOnlyModifiers,
    ChordWithMultipleNormalKeys,
    ChordWithMultipleWheelKeys,
    ChordWithNormalAndWheelKeys,
    ImpossibleToggleSequence,
    MultipleMatchingShortcuts,
    Vetoed,
}

/// Errors that can occur while registering, validating or matching shortcuts.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShortcutError {
    /// A key (or one of its toggle sub-ids) collides with an existing id.
    #[error("Key '{id}' already exists")]
    DuplicateKey { id: String },

    /// A command with this name is already registered.
    #[error("Command '{name}' already exists")]
    DuplicateCommand { name: String },

    /// An equal shortcut is already registered.
    #[error("Shortcut {chain} already exists")]
    DuplicateShortcut { chain: Chain, existing: ShortcutId },

    /// The key id is not registered.
    #[error("Unknown key '{id}'")]
    UnknownKey { id: String },

    /// A shortcut chain references ids that are not registered.
    #[error("Shortcut {chain} references unknown keys: {}", keys.join(", "))]
    UnknownKeysInShortcut { chain: Chain, keys: Vec<String> },

    /// The command name does not resolve.
    #[error("Unknown command '{name}'")]
    UnknownCommand { name: String },

    /// The shortcut id is not registered.
    #[error("Unknown shortcut {id:?}")]
    UnknownShortcut { id: ShortcutId },

    /// The key is still referenced by shortcuts.
    #[error("Key '{id}' is used by {} shortcut(s)", shortcuts.len())]
    KeyInUse { id: String, shortcuts: Vec<ShortcutId> },

    /// The command is still referenced by shortcuts.
    #[error("Command '{name}' is used by {} shortcut(s)", shortcuts.len())]
    CommandInUse { name: String, shortcuts: Vec<ShortcutId> },

    /// A key lists itself as its own variant.
    #[error("Key '{id}' cannot list '{variant}' as a variant")]
    InvalidVariant { id: String, variant: String },

    /// A chain without chords.
    #[error("Chain is empty")]
    EmptyChain,

    /// A chord without keys.
    #[error("Chord {index} is empty")]
    EmptyChord { index: usize },

    /// The same key appears twice in a chord (variants included).
    #[error("Chord {chord} contains the same key twice: {}", keys.join(", "))]
    ChordWithDuplicateKey { chord: Chord, keys: Vec<String> },

    /// The chord is made only of modifiers.
    #[error("Chord {chord} contains only modifiers")]
    ChordWithOnlyModifiers { chord: Chord },

    /// The chord has more than one normal key.
    #[error("Chord {chord} contains more than one normal key: {}", keys.join(", "))]
    ChordWithMultipleNormalKeys { chord: Chord, keys: Vec<String> },

    /// The chord has more than one wheel key.
    #[error("Chord {chord} contains more than one wheel key: {}", keys.join(", "))]
    ChordWithMultipleWheelKeys { chord: Chord, keys: Vec<String> },

    /// The chord mixes a normal key with a wheel key.
    #[error("Chord {chord} mixes normal and wheel keys: {}", keys.join(", "))]
    ChordWithNormalAndWheelKeys { chord: Chord, keys: Vec<String> },

    /// The chain requires a toggle key to be in states it cannot reach.
    #[error("Chain {chain} requires an impossible state sequence for toggle '{key}'")]
    ImpossibleToggleSequence { chain: Chain, key: String },

    /// More than one shortcut matches the current chain.
    #[error("Chain {chain} matches {} shortcuts", shortcuts.len())]
    MultipleMatchingShortcuts { chain: Chain, shortcuts: Vec<ShortcutId> },

    /// A can-set hook rejected the mutation.
    #[error("Mutation vetoed: {reason}")]
    Vetoed { reason: String },
}

impl ShortcutError {
    /// Get the machine-checkable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::DuplicateCommand { .. } => ErrorKind::DuplicateCommand,
            Self::DuplicateShortcut { .. } => ErrorKind::DuplicateShortcut,
            Self::UnknownKey { .. } => ErrorKind::UnknownKey,
            Self::UnknownKeysInShortcut { .. } => ErrorKind::UnknownKeysInShortcut,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::UnknownShortcut { .. } => ErrorKind::UnknownShortcut,
            Self::KeyInUse { .. } => ErrorKind::KeyInUse,
            Self::CommandInUse { .. } => ErrorKind::CommandInUse,
            Self::InvalidVariant { .. } => ErrorKind::InvalidVariant,
            Self::EmptyChain => ErrorKind::EmptyChain,
            Self::EmptyChord { .. } => ErrorKind::EmptyChord,
            Self::ChordWithDuplicateKey { .. } => ErrorKind::ChordWithDuplicateKey,
            Self::ChordWithOnlyModifiers { .. } => ErrorKind::ChordWithOnlyModifiers,
            Self::ChordWithMultipleNormalKeys { .. } => ErrorKind::ChordWithMultipleNormalKeys,
            Self::ChordWithMultipleWheelKeys { .. } => ErrorKind::ChordWithMultipleWheelKeys,
            Self::ChordWithNormalAndWheelKeys { .. } => ErrorKind::ChordWithNormalAndWheelKeys,
            Self::ImpossibleToggleSequence { .. } => ErrorKind::ImpossibleToggleSequence,
            Self::MultipleMatchingShortcuts { .. } => ErrorKind::MultipleMatchingShortcuts,
            Self::Vetoed { .. } => ErrorKind::Vetoed,
        }
    }

    /// Create an unknown key error.
    pub fn unknown_key(id: impl Into<String>) -> Self {
        Self::UnknownKey { id: id.into() }
    }

    /// Create an unknown command error.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Create a veto error, for use in can-set hooks.
    pub fn vetoed(reason: impl Into<String>) -> Self {
        Self::Vetoed {
            reason: reason.into(),
        }
    }
}
