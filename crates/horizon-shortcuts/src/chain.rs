//! Chords, chains and the key comparison helpers.
//!
//! A [`Chord`] is a set of key ids pressed together; a [`Chain`] is the
//! ordered list of chords making up a (possibly multi-step) shortcut.
//!
//! Chords are stored as vectors kept in canonical order by a
//! [`Sorter`](crate::Sorter), so two chords holding the same ids compare
//! equal with `==`. The free functions in this module go further and
//! compare ids through the key collection, honoring variants and toggle
//! sub-ids.

use std::fmt;

use crate::keys::Keys;

// =============================================================================
// Chord
// =============================================================================

/// A set of key ids pressed together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Chord(Vec<String>);

impl Chord {
    /// Create a chord from a list of ids. The ids are kept as given; the
    /// manager canonicalizes them when they are stored.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|key| key == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Add an id unless it is already present. Returns whether it was added.
    pub(crate) fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove every id matching the predicate. Returns whether any was removed.
    pub(crate) fn remove_where(&mut self, mut predicate: impl FnMut(&str) -> bool) -> bool {
        let before = self.0.len();
        self.0.retain(|key| !predicate(key));
        self.0.len() != before
    }

    pub(crate) fn keys_mut(&mut self) -> &mut [String] {
        &mut self.0
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("+"))
    }
}

impl<S: Into<String>> FromIterator<S> for Chord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// =============================================================================
// Chain
// =============================================================================

/// An ordered sequence of chords.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Chain(Vec<Chord>);

impl Chain {
    /// Create a chain from its chords.
    pub fn new(chords: impl IntoIterator<Item = Chord>) -> Self {
        Self(chords.into_iter().collect())
    }

    /// Create an empty chain.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Create a single-chord chain.
    pub fn single(chord: Chord) -> Self {
        Self(vec![chord])
    }

    pub fn chords(&self) -> &[Chord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Chord> {
        self.0.last()
    }

    /// Whether any chord holds the id.
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|chord| chord.contains(id))
    }

    /// Iterate over every id of every chord.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(Chord::iter)
    }

    /// Whether every chord is empty (true for an empty chain).
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(Chord::is_empty)
    }

    pub(crate) fn push(&mut self, chord: Chord) {
        self.0.push(chord);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Chord> {
        self.0.last_mut()
    }

    pub(crate) fn chords_mut(&mut self) -> &mut [Chord] {
        &mut self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chords: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", chords.join(", "))
    }
}

impl FromIterator<Chord> for Chain {
    fn from_iter<I: IntoIterator<Item = Chord>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Chord>> for Chain {
    fn from(chords: Vec<Chord>) -> Self {
        Self(chords)
    }
}

// =============================================================================
// Sequence Match Result
// =============================================================================

/// Result of matching the current chain against a shortcut's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceMatch {
    /// The chains are equal.
    ExactMatch,
    /// The current chain can still grow into the shortcut's chain.
    PartialMatch,
    /// The chains do not match.
    NoMatch,
}

impl SequenceMatch {
    /// Compare a current (in-progress) chain against a shortcut chain.
    pub fn of(current: &Chain, shortcut: &Chain, keys: &Keys, allow_variants: bool) -> Self {
        if equals_keys(current, shortcut, keys, allow_variants, None) {
            Self::ExactMatch
        } else if is_in_chain(current, shortcut, keys, allow_variants) {
            Self::PartialMatch
        } else {
            Self::NoMatch
        }
    }
}

// =============================================================================
// Comparison Helpers
// =============================================================================

/// Whether two ids name the same logical key.
///
/// Ids are equal when they are identical, when one is a toggle root and the
/// other one of its sub-ids, or (with `allow_variants`) when they are
/// declared variants of each other. The two sub-ids of one toggle are never
/// equal.
pub fn equals_key(a: &str, b: &str, keys: &Keys, allow_variants: bool) -> bool {
    a == b
        || keys.toggle_root(b) == Some(a)
        || keys.toggle_root(a) == Some(b)
        || (allow_variants && keys.are_variants(a, b))
}

/// Whether every id of `sub` matches a distinct id of `chord`.
pub fn is_chord_subset(sub: &Chord, chord: &Chord, keys: &Keys, allow_variants: bool) -> bool {
    if sub.len() > chord.len() {
        return false;
    }
    let mut used = vec![false; chord.len()];
    sub.iter().all(|a| {
        let found = chord
            .iter()
            .enumerate()
            .find(|(i, b)| !used[*i] && equals_key(a, b, keys, allow_variants));
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Whether two chords hold the same logical keys.
pub fn equals_chord(a: &Chord, b: &Chord, keys: &Keys, allow_variants: bool) -> bool {
    a.len() == b.len() && is_chord_subset(a, b, keys, allow_variants)
}

/// Whether two chains are equal chord by chord.
///
/// With `length` set only the first `length` chords are compared, and both
/// chains must have at least that many.
pub fn equals_keys(
    a: &Chain,
    b: &Chain,
    keys: &Keys,
    allow_variants: bool,
    length: Option<usize>,
) -> bool {
    let count = match length {
        Some(n) if a.len() < n || b.len() < n => return false,
        Some(n) => n,
        None if a.len() != b.len() => return false,
        None => a.len(),
    };
    a.chords()
        .iter()
        .zip(b.chords())
        .take(count)
        .all(|(x, y)| equals_chord(x, y, keys, allow_variants))
}

/// Whether `prefix` equals the first `prefix.len()` chords of `chain`.
pub fn is_full_prefix(prefix: &Chain, chain: &Chain, keys: &Keys, allow_variants: bool) -> bool {
    !prefix.is_empty() && equals_keys(prefix, chain, keys, allow_variants, Some(prefix.len()))
}

/// Whether an in-progress chain can still grow into `chain`.
///
/// Every chord but the last must be equal; the last chord only has to be a
/// subset of the corresponding chord.
pub fn is_in_chain(current: &Chain, chain: &Chain, keys: &Keys, allow_variants: bool) -> bool {
    let Some((last, earlier)) = current.chords().split_last() else {
        return false;
    };
    if current.len() > chain.len() {
        return false;
    }
    let target = &chain.chords()[earlier.len()];
    earlier
        .iter()
        .zip(chain.chords())
        .all(|(x, y)| equals_chord(x, y, keys, allow_variants))
        && is_chord_subset(last, target, keys, allow_variants)
}
