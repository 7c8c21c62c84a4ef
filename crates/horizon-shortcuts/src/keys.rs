//! The key collection and its derived indices.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, ShortcutError};
use crate::key::{Key, KeyClass, toggle_off_id, toggle_on_id};

/// All registered keys, keyed by id.
///
/// Besides the entries themselves the collection maintains three derived
/// indices, rebuilt whenever a key is added, removed or changes shape:
///
/// - toggle root to its `(on, off)` sub-ids
/// - toggle sub-id back to its root
/// - a symmetric variant relation (declaring `A` a variant of `B` makes `B`
///   a variant of `A`, but the relation is not transitive)
///
/// Ids are unique across entries and toggle sub-ids.
#[derive(Clone, Debug, Default)]
pub struct Keys {
    entries: BTreeMap<String, Key>,
    toggles: BTreeMap<String, (String, String)>,
    sub_ids: BTreeMap<String, String>,
    variants: BTreeMap<String, BTreeSet<String>>,
}

impl Keys {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a list of keys, rejecting collisions.
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Result<Self> {
        let mut collection = Self::new();
        for key in keys {
            collection.check_new(&key)?;
            collection.insert(key);
        }
        Ok(collection)
    }

    /// Get a key by its root id.
    pub fn get(&self, id: &str) -> Option<&Key> {
        self.entries.get(id)
    }

    /// Get the key owning an id, resolving toggle sub-ids to their root.
    pub fn resolve(&self, id: &str) -> Option<&Key> {
        match self.sub_ids.get(id) {
            Some(root) => self.entries.get(root),
            None => self.entries.get(id),
        }
    }

    /// Whether an id is a registered root or a toggle sub-id.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id) || self.sub_ids.contains_key(id)
    }

    /// The root of a toggle sub-id.
    pub fn toggle_root(&self, id: &str) -> Option<&str> {
        self.sub_ids.get(id).map(String::as_str)
    }

    /// The `(on, off)` sub-ids of a toggle root.
    pub fn toggle_ids(&self, root: &str) -> Option<(&str, &str)> {
        self.toggles
            .get(root)
            .map(|(on, off)| (on.as_str(), off.as_str()))
    }

    /// Whether `id` is the "on" sub-id of some toggle.
    pub fn is_toggle_on_id(&self, id: &str) -> bool {
        self.toggle_root(id)
            .and_then(|root| self.toggles.get(root))
            .is_some_and(|(on, _)| on == id)
    }

    /// Classify an id. Unknown ids have no class.
    pub fn class_of(&self, id: &str) -> Option<KeyClass> {
        self.resolve(id).map(Key::class)
    }

    /// Whether two ids are declared variants of each other.
    pub fn are_variants(&self, a: &str, b: &str) -> bool {
        self.variants.get(a).is_some_and(|group| group.contains(b))
    }

    /// The ids declared interchangeable with `id`.
    pub fn variants_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.variants
            .get(id)
            .into_iter()
            .flat_map(|group| group.iter().map(String::as_str))
    }

    /// Whether two ids stand for one logical key: declared variants of each
    /// other, or siblings declared under a common id.
    pub fn in_variant_group(&self, a: &str, b: &str) -> bool {
        self.are_variants(a, b) || self.variants_of(a).any(|shared| self.are_variants(shared, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overall layout size as `(width, height)`.
    pub fn layout(&self) -> (f32, f32) {
        self.entries.values().fold((0.0, 0.0), |(w, h), key| {
            let layout = key.layout;
            (w.max(layout.x + layout.width), h.max(layout.y + layout.height))
        })
    }

    /// Check that a key could be added without breaking uniqueness.
    pub(crate) fn check_new(&self, key: &Key) -> Result<()> {
        check_variants(key.id(), key.variants())?;

        let mut ids = vec![key.id.clone()];
        if key.is_toggle() {
            ids.push(toggle_on_id(&key.id));
            ids.push(toggle_off_id(&key.id));
        }
        match ids.into_iter().find(|id| self.contains(id)) {
            Some(id) => Err(ShortcutError::DuplicateKey { id }),
            None => Ok(()),
        }
    }

    /// Insert a key already accepted by [`check_new`](Self::check_new).
    pub(crate) fn insert(&mut self, key: Key) {
        self.entries.insert(key.id.clone(), key);
        self.reindex();
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Key> {
        let removed = self.entries.remove(id);
        if removed.is_some() {
            self.reindex();
        }
        removed
    }

    /// Mutable access to a root entry. Callers changing variant or toggle
    /// fields must call [`reindex`](Self::reindex) afterwards.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Key> {
        self.entries.get_mut(id)
    }

    /// Rebuild the derived indices from the entries.
    pub(crate) fn reindex(&mut self) {
        self.toggles.clear();
        self.sub_ids.clear();
        self.variants.clear();

        for key in self.entries.values() {
            if key.is_toggle() {
                let on = toggle_on_id(&key.id);
                let off = toggle_off_id(&key.id);
                self.sub_ids.insert(on.clone(), key.id.clone());
                self.sub_ids.insert(off.clone(), key.id.clone());
                self.toggles.insert(key.id.clone(), (on, off));
            }
            for variant in &key.variants {
                self.variants
                    .entry(key.id.clone())
                    .or_default()
                    .insert(variant.clone());
                self.variants
                    .entry(variant.clone())
                    .or_default()
                    .insert(key.id.clone());
            }
        }
    }
}

/// Reject a variant list naming the key itself.
pub(crate) fn check_variants(id: &str, variants: &[String]) -> Result<()> {
    match variants.iter().find(|variant| *variant == id) {
        Some(variant) => Err(ShortcutError::InvalidVariant {
            id: id.to_string(),
            variant: variant.clone(),
        }),
        None => Ok(()),
    }
}
