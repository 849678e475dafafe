//! Sparse, ordered mapping from time to value.
//!
//! Timeline is a layer of a score: it holds values only at points,
//! where something changes, and answers two questions about any point:
//! what is *established* there (the nearest entry at or before the
//! point, or the default), and what is *changed* there (an entry exactly
//! at the point, if any).
//!
//! # Example
//!
//! ```
//! use rat_score::primitives::{Rational, Timeline};
//! let mut dynamics = Timeline::new("mf");
//! dynamics.put(Rational::from(3), "p");
//! assert_eq!(dynamics.get_established(&Rational::ONE), &"mf");
//! assert_eq!(dynamics.get_established(&Rational::from(5)), &"p");
//! assert_eq!(dynamics.get_changed(&Rational::from(5)), None);
//! assert_eq!(dynamics.get_changed(&Rational::from(3)), Some(&"p"));
//! ```

use std::{
    collections::{btree_map, BTreeMap},
    ops::Bound::{Excluded, Included, Unbounded},
};

use super::Rational;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<T> {
    entries: BTreeMap<Rational, T>,
    default: T,
}
impl<T> Timeline<T> {
    pub fn new(default: T) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }
    pub fn set_default_value(&mut self, default: T) {
        self.default = default;
    }

    /// Insert or overwrite value at the point.
    ///
    /// # Returns
    /// Value, previously set at the point.
    pub fn put(&mut self, at: Rational, value: T) -> Option<T> {
        self.entries.insert(at, value)
    }
    pub fn remove(&mut self, at: &Rational) -> Option<T> {
        self.entries.remove(at)
    }

    /// Value, set exactly at the point.
    pub fn get_changed(&self, at: &Rational) -> Option<&T> {
        self.entries.get(at)
    }
    pub fn get_changed_mut(&mut self, at: &Rational) -> Option<&mut T> {
        self.entries.get_mut(at)
    }

    /// Value in effect at the point. Never fails: falls back to the
    /// default value.
    pub fn get_established(&self, at: &Rational) -> &T {
        match self.established_entry(at) {
            Some((_, value)) => value,
            None => &self.default,
        }
    }

    /// Nearest entry at or before the point.
    pub fn established_entry(&self, at: &Rational) -> Option<(&Rational, &T)> {
        self.entries.range((Unbounded, Included(at))).next_back()
    }
    pub fn established_entry_mut(
        &mut self,
        at: &Rational,
    ) -> Option<(&Rational, &mut T)> {
        self.entries
            .range_mut((Unbounded, Included(at)))
            .next_back()
    }

    /// Greatest key `<= at`.
    pub fn floor_key(&self, at: &Rational) -> Option<Rational> {
        self.established_entry(at).map(|(key, _)| *key)
    }
    /// Least key `>= at`.
    pub fn ceiling_key(&self, at: &Rational) -> Option<Rational> {
        self.entries
            .range((Included(at), Unbounded))
            .next()
            .map(|(key, _)| *key)
    }
    /// Least key `> at`.
    pub fn higher_key(&self, at: &Rational) -> Option<Rational> {
        self.entries
            .range((Excluded(at), Unbounded))
            .next()
            .map(|(key, _)| *key)
    }
    /// Greatest key `< at`.
    pub fn lower_key(&self, at: &Rational) -> Option<Rational> {
        self.entries
            .range((Unbounded, Excluded(at)))
            .next_back()
            .map(|(key, _)| *key)
    }

    /// True if any entry is at or after the point.
    pub fn has_entries_from(&self, at: &Rational) -> bool {
        self.ceiling_key(at).is_some()
    }

    /// All points, where value changes, in ascending order.
    ///
    /// Iterator is lazy, and can be restarted by calling again.
    pub fn rhythm(&self) -> impl DoubleEndedIterator<Item = &Rational> + '_ {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Rational, T> {
        self.entries.iter()
    }
    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, Rational, T> {
        self.entries.values_mut()
    }
    /// Entries in `[from, to)`.
    pub fn range(
        &self,
        from: Rational,
        to: Rational,
    ) -> btree_map::Range<'_, Rational, T> {
        self.entries.range(from..to)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl<T: Default> Default for Timeline<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
