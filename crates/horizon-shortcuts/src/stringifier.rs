//! Human-readable rendering of keys, chords, chains and shortcuts.

use crate::chain::{Chain, Chord};
use crate::keys::Keys;
use crate::shortcut::Shortcut;

/// Renders ids with their labels.
///
/// Only [`key`](Self::key) is required; the other methods compose it.
pub trait Stringifier: Send + Sync {
    /// Render a single id.
    fn key(&self, id: &str, keys: &Keys) -> String;

    fn chord(&self, chord: &Chord, keys: &Keys) -> String {
        chord
            .iter()
            .map(|id| self.key(id, keys))
            .collect::<Vec<_>>()
            .join("+")
    }

    fn chain(&self, chain: &Chain, keys: &Keys) -> String {
        chain
            .chords()
            .iter()
            .map(|chord| self.chord(chord, keys))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn shortcut(&self, shortcut: &Shortcut, keys: &Keys) -> String {
        let chain = self.chain(shortcut.chain(), keys);
        match shortcut.command() {
            Some(command) => format!("{chain} ({command})"),
            None => chain,
        }
    }
}

/// Uses key labels, falling back to ids. Toggle sub-ids render as the root
/// label followed by their state.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStringifier;

impl Stringifier for DefaultStringifier {
    fn key(&self, id: &str, keys: &Keys) -> String {
        if let Some(root) = keys.toggle_root(id) {
            let label = keys.get(root).map_or(root, |key| key.display_label());
            let state = if keys.is_toggle_on_id(id) { "On" } else { "Off" };
            return format!("{label} ({state})");
        }
        keys.get(id)
            .map_or_else(|| id.to_string(), |key| key.display_label().to_string())
    }
}
