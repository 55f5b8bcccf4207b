//! Persistent (immutable) hash set.
//!
//! [`PersistentHashSet`] is a wrapper around `PersistentHashMap<T, ()>`:
//! elements are the map's keys, so the set inherits the HAMT's
//! structural sharing and O(log32 N) point operations. Elements are
//! deduplicated by value equality.
//!
//! # Examples
//!
//! ```rust
//! use conifer::persistent::PersistentHashSet;
//!
//! let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
//!
//! // Structural sharing: the original set is preserved
//! let extended = set.insert(4);
//! assert_eq!(set.len(), 3);      // Original unchanged
//! assert_eq!(extended.len(), 4); // New version
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use super::hashmap::{PersistentHashMap, PersistentHashMapIterator};

/// A persistent (immutable) hash set with structural sharing.
///
/// Every mutator returns a new set; the receiver is never modified, so
/// any number of holders can keep reading their versions. Membership is
/// decided by `Hash` + `Eq` on the element type.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `contains` | O(log32 N) |
/// | `insert`   | O(log32 N) |
/// | `remove`   | O(log32 N) |
/// | `union`    | O(m log32 n) |
/// | `len`      | O(1)       |
///
/// # Examples
///
/// ```rust
/// use conifer::persistent::PersistentHashSet;
///
/// let set = PersistentHashSet::new().insert(1).insert(2);
/// assert!(set.contains(&1));
/// assert!(!set.contains(&3));
/// ```
#[derive(Clone)]
pub struct PersistentHashSet<T> {
    inner: PersistentHashMap<T, ()>,
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = PersistentHashSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentHashMap::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Returns `true` if the set contains the element.
    ///
    /// The element may be any borrowed form of the set's element type,
    /// provided `Hash` and `Eq` on the borrowed form match.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns a new set containing all prior elements plus `element`.
    ///
    /// Inserting an element already present returns an equal set;
    /// elements are deduplicated by value equality either way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1);
    /// let extended = set.insert(2);
    ///
    /// assert!(!set.contains(&2));     // Original unchanged
    /// assert!(extended.contains(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Returns a new set without `element`.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns the union of the two sets.
    ///
    /// Membership in the result is commutative: `a.union(&b)` and
    /// `b.union(&a)` contain exactly the same elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// assert_eq!(left.union(&right).len(), 3);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for element in other.iter() {
            result = result.insert(element.clone());
        }
        result
    }

    /// Returns `true` if any of `values` is a member of the set.
    ///
    /// Short-circuits on the first hit; allocates nothing and never
    /// mutates. An empty sequence never overlaps.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    ///
    /// assert!(set.overlaps([3, 4].iter()));
    /// assert!(!set.overlaps([4, 5].iter()));
    /// assert!(!set.overlaps(std::iter::empty::<&i32>()));
    /// ```
    pub fn overlaps<'a, I>(&self, values: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        values.into_iter().any(|value| self.contains(value))
    }

    /// Returns the intersection of the two sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.iter()
            .filter(|element| other.contains(*element))
            .cloned()
            .collect()
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.iter()
            .filter(|element| !other.contains(*element))
            .cloned()
            .collect()
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if the two sets share no elements.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.overlaps(other.iter())
    }

    /// Returns an iterator over the elements.
    ///
    /// Iteration order follows the trie layout: stable for a given set
    /// value but otherwise unspecified.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// A borrowing iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    entries: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentHashSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentHashSet<T> {
    /// Collects a sequence into a set, deduplicating by value equality.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for element in iter {
            set = set.insert(element);
        }
        set
    }
}

impl<T: Clone + Hash + Eq> IntoIterator for PersistentHashSet<T> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<T> = self.iter().cloned().collect();
        PersistentHashSetIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, T: Clone + Hash + Eq> IntoIterator for &'a PersistentHashSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentHashSet<T> {}

impl<T: Clone + Hash + Eq + fmt::Debug> fmt::Debug for PersistentHashSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_creates_empty() {
        let set: PersistentHashSet<i32> = PersistentHashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[rstest]
    fn test_insert_does_not_touch_receiver() {
        let set = PersistentHashSet::singleton(1);
        let extended = set.insert(2);

        assert!(!set.contains(&2));
        assert!(extended.contains(&1));
        assert!(extended.contains(&2));
    }

    #[rstest]
    fn test_insert_deduplicates() {
        let set = PersistentHashSet::new().insert(1).insert(1);
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    fn test_from_iter_deduplicates() {
        let set: PersistentHashSet<i32> = [1, 1, 2, 2, 3].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[rstest]
    fn test_union_membership_is_commutative() {
        let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
        let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();

        assert_eq!(left.union(&right), right.union(&left));
        assert_eq!(left.union(&right).len(), 3);
    }

    #[rstest]
    fn test_overlaps_short_circuits_on_membership() {
        let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(set.overlaps([5, 2].iter()));
        assert!(!set.overlaps([4, 5, 6].iter()));
    }

    #[rstest]
    fn test_overlaps_empty_sequence_is_false() {
        let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
        assert!(!set.overlaps(std::iter::empty::<&i32>()));

        let empty: PersistentHashSet<i32> = PersistentHashSet::new();
        assert!(!empty.overlaps(std::iter::empty::<&i32>()));
    }

    #[rstest]
    fn test_remove() {
        let set: PersistentHashSet<i32> = [1, 2].into_iter().collect();
        let shrunk = set.remove(&1);

        assert!(set.contains(&1));
        assert!(!shrunk.contains(&1));
        assert!(shrunk.contains(&2));
    }

    #[rstest]
    fn test_intersection_and_difference() {
        let left: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
        let right: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();

        let expected_intersection: PersistentHashSet<i32> = [2, 3].into_iter().collect();
        let expected_difference: PersistentHashSet<i32> = [1].into_iter().collect();

        assert_eq!(left.intersection(&right), expected_intersection);
        assert_eq!(left.difference(&right), expected_difference);
    }

    #[rstest]
    fn test_subset_and_disjoint() {
        let small: PersistentHashSet<i32> = [1, 2].into_iter().collect();
        let large: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
        let apart: PersistentHashSet<i32> = [9, 10].into_iter().collect();

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert!(small.is_disjoint(&apart));
        assert!(!small.is_disjoint(&large));
    }

    #[rstest]
    fn test_borrowed_lookup() {
        let set: PersistentHashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(set.contains("a"));
        assert!(!set.contains("b"));
    }
}
