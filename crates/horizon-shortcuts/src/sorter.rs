//! Canonical chord ordering.

use crate::key::KeyClass;
use crate::keys::Keys;

/// Orders the ids of a chord.
///
/// The order is used for storage and display; equality never depends on it.
pub trait Sorter: Send + Sync {
    fn sort(&self, ids: &mut [String], keys: &Keys);
}

/// Modifiers first, then toggles, mouse buttons, wheel and normal keys.
/// Ties are broken by id. Unknown ids sort with the normal keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSorter;

impl Sorter for DefaultSorter {
    fn sort(&self, ids: &mut [String], keys: &Keys) {
        ids.sort_by(|a, b| {
            let class_a = keys.class_of(a).unwrap_or(KeyClass::Normal);
            let class_b = keys.class_of(b).unwrap_or(KeyClass::Normal);
            class_a.cmp(&class_b).then_with(|| a.cmp(b))
        });
    }
}
