//! Chord and chain validation, duplicate and conflict detection.
//!
//! These are pure functions over the collections they need. The manager
//! calls them before committing a mutation; editors can call them directly
//! to check a candidate shortcut.

use std::collections::BTreeMap;

use crate::chain::{Chain, Chord, equals_key, equals_keys};
use crate::command::Commands;
use crate::condition::{Condition, ConditionEvaluator};
use crate::error::{Result, ShortcutError};
use crate::key::KeyClass;
use crate::keys::Keys;
use crate::shortcut::{Shortcut, ShortcutId, Shortcuts};
use crate::sorter::Sorter;

/// Rules that depend on manager options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationRules {
    pub allow_only_modifier_chords: bool,
    pub allow_variants: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allow_only_modifier_chords: false,
            allow_variants: true,
        }
    }
}

/// Sort every chord of a chain into canonical order.
pub fn canonicalize(chain: &mut Chain, keys: &Keys, sorter: &dyn Sorter) {
    for chord in chain.chords_mut() {
        sorter.sort(chord.keys_mut(), keys);
    }
}

/// Check that every id of a chain is known.
pub fn check_known(chain: &Chain, keys: &Keys) -> Result<()> {
    match chain.ids().find(|id| !keys.contains(id)) {
        Some(id) => Err(ShortcutError::unknown_key(id)),
        None => Ok(()),
    }
}

/// Validate a single chord.
pub fn validate_chord(chord: &Chord, keys: &Keys, rules: ValidationRules) -> Result<()> {
    validate_chord_at(chord, 0, keys, rules)
}

fn validate_chord_at(chord: &Chord, index: usize, keys: &Keys, rules: ValidationRules) -> Result<()> {
    if chord.is_empty() {
        return Err(ShortcutError::EmptyChord { index });
    }
    if let Some(id) = chord.iter().find(|id| !keys.contains(id)) {
        return Err(ShortcutError::unknown_key(id));
    }

    // Both states of one toggle can never be held together.
    for id in chord.iter() {
        let Some(root) = keys.toggle_root(id) else {
            continue;
        };
        if let Some((on, off)) = keys.toggle_ids(root)
            && chord.contains(on)
            && chord.contains(off)
        {
            return Err(ShortcutError::ImpossibleToggleSequence {
                chain: Chain::single(chord.clone()),
                key: root.to_string(),
            });
        }
    }

    let ids = chord.keys();
    for (i, a) in ids.iter().enumerate() {
        if let Some(b) = ids[i + 1..]
            .iter()
            .find(|b| {
                equals_key(a, b, keys, rules.allow_variants)
                    || (rules.allow_variants && keys.in_variant_group(a, b))
            })
        {
            return Err(ShortcutError::ChordWithDuplicateKey {
                chord: chord.clone(),
                keys: vec![a.clone(), b.to_string()],
            });
        }
    }

    let of_class = |class: KeyClass| -> Vec<String> {
        chord
            .iter()
            .filter(|id| keys.class_of(id) == Some(class))
            .map(str::to_string)
            .collect()
    };
    let normal = of_class(KeyClass::Normal);
    let wheel = of_class(KeyClass::Wheel);
    if normal.len() > 1 {
        return Err(ShortcutError::ChordWithMultipleNormalKeys {
            chord: chord.clone(),
            keys: normal,
        });
    }
    if wheel.len() > 1 {
        return Err(ShortcutError::ChordWithMultipleWheelKeys {
            chord: chord.clone(),
            keys: wheel,
        });
    }
    if !normal.is_empty() && !wheel.is_empty() {
        return Err(ShortcutError::ChordWithNormalAndWheelKeys {
            chord: chord.clone(),
            keys: normal.into_iter().chain(wheel).collect(),
        });
    }

    let only_modifiers = chord
        .iter()
        .all(|id| keys.class_of(id) == Some(KeyClass::Modifier));
    if only_modifiers && !rules.allow_only_modifier_chords {
        return Err(ShortcutError::ChordWithOnlyModifiers {
            chord: chord.clone(),
        });
    }
    Ok(())
}

/// Validate a shortcut chain.
pub fn validate_chain(chain: &Chain, keys: &Keys, rules: ValidationRules) -> Result<()> {
    if chain.is_empty() {
        return Err(ShortcutError::EmptyChain);
    }

    let mut unknown: Vec<String> = Vec::new();
    for id in chain.ids().filter(|id| !keys.contains(id)) {
        if !unknown.iter().any(|u| u == id) {
            unknown.push(id.to_string());
        }
    }
    if !unknown.is_empty() {
        return Err(ShortcutError::UnknownKeysInShortcut {
            chain: chain.clone(),
            keys: unknown,
        });
    }

    for (index, chord) in chain.chords().iter().enumerate() {
        validate_chord_at(chord, index, keys, rules)?;
    }
    check_toggle_sequence(chain, keys)
}

/// Every press of a toggle flips it, so two consecutive chords mentioning a
/// toggle cannot require the same state. A chord naming only the root
/// leaves the state unknown.
fn check_toggle_sequence(chain: &Chain, keys: &Keys) -> Result<()> {
    let mut last: BTreeMap<&str, Option<bool>> = BTreeMap::new();
    for chord in chain.chords() {
        for id in chord.iter() {
            let (root, state) = match keys.toggle_root(id) {
                Some(root) => (root, Some(keys.is_toggle_on_id(id))),
                None if keys.toggle_ids(id).is_some() => (id, None),
                None => continue,
            };
            if let (Some(Some(previous)), Some(current)) = (last.get(root), state)
                && *previous == current
            {
                return Err(ShortcutError::ImpossibleToggleSequence {
                    chain: chain.clone(),
                    key: root.to_string(),
                });
            }
            last.insert(root, state);
        }
    }
    Ok(())
}

/// Validate a shortcut's chain and command reference.
pub fn validate_shortcut(
    shortcut: &Shortcut,
    keys: &Keys,
    commands: &Commands,
    rules: ValidationRules,
) -> Result<()> {
    validate_chain(shortcut.chain(), keys, rules)?;
    match shortcut.command() {
        Some(name) if !commands.contains(name) => Err(ShortcutError::unknown_command(name)),
        _ => Ok(()),
    }
}

/// Reject a shortcut equal to a registered one other than `skip`.
pub fn check_duplicate(
    shortcut: &Shortcut,
    skip: Option<ShortcutId>,
    shortcuts: &Shortcuts,
    keys: &Keys,
    evaluator: &dyn ConditionEvaluator,
    allow_variants: bool,
) -> Result<()> {
    let existing = shortcuts
        .iter()
        .filter(|(id, _)| Some(*id) != skip)
        .find(|(_, other)| shortcut.equals(other, keys, evaluator, allow_variants));
    match existing {
        Some((existing, _)) => Err(ShortcutError::DuplicateShortcut {
            chain: shortcut.chain().clone(),
            existing,
        }),
        None => Ok(()),
    }
}

/// Registered shortcuts that would shadow or be shadowed by `chain`.
///
/// Two chains conflict if they are equal or if one is a chord-wise prefix
/// of the other, and their conditions are equivalent.
pub fn find_conflicts(
    chain: &Chain,
    condition: &Condition,
    shortcuts: &Shortcuts,
    keys: &Keys,
    evaluator: &dyn ConditionEvaluator,
    allow_variants: bool,
) -> Vec<ShortcutId> {
    shortcuts
        .iter()
        .filter(|(_, other)| evaluator.equals(condition, other.condition()))
        .filter(|(_, other)| {
            let shorter = chain.len().min(other.chain().len());
            shorter > 0 && equals_keys(chain, other.chain(), keys, allow_variants, Some(shorter))
        })
        .map(|(id, _)| id)
        .collect()
}
