//! A structural-equality interning container.

use crate::types::Set;
use std::{fmt, hash::Hash, ops};

/// A deduplicating set holding exactly one canonical instance per
/// structural-equality class, in insertion order.
///
/// Lookups hash the probe value and verify candidates with full structural
/// equality, so element types whose equality spans nested collections (whole
/// item sets, productions) pay an element-wise comparison when buckets
/// collide. Indices returned by [`insert_full`](Self::insert_full) are dense
/// and stable for the lifetime of the container, which is what allows an
/// LR(1) state to be identified by the index of its interned item set.
pub struct InternSet<T> {
    entries: Set<T>,
}

impl<T> Default for InternSet<T> {
    fn default() -> Self {
        Self {
            entries: Set::default(),
        }
    }
}

impl<T> fmt::Debug for InternSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.iter()).finish()
    }
}

impl<T> InternSet<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` unless a structurally-equal value is already present.
    /// Returns whether the value was actually added.
    pub fn insert(&mut self, value: T) -> bool {
        self.entries.insert(value)
    }

    /// Insert `value` and return the index of its canonical instance, along
    /// with whether the value was newly added.
    pub fn insert_full(&mut self, value: T) -> (usize, bool) {
        self.entries.insert_full(value)
    }

    /// The canonical stored instance structurally equal to `probe`.
    pub fn get(&self, probe: &T) -> Option<&T> {
        self.entries.get(probe)
    }

    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.entries.get_index(index)
    }

    pub fn index_of(&self, probe: &T) -> Option<usize> {
        self.entries.get_index_of(probe)
    }

    pub fn contains(&self, probe: &T) -> bool {
        self.entries.contains(probe)
    }

    /// Remove the instance equal to `probe`, preserving the order (and hence
    /// the indices) of the remaining entries.
    pub fn remove(&mut self, probe: &T) -> bool {
        self.entries.shift_remove(probe)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }
}

impl<T> ops::Index<usize> for InternSet<T>
where
    T: Eq + Hash,
{
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.entries
            .get_index(index)
            .expect("intern index out of bounds")
    }
}

impl<T> FromIterator<T> for InternSet<T>
where
    T: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
