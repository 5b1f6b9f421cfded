//! An ordered set implemented with an AVL tree.
//!
//! Binary operations (comparison, subset tests, union, intersection, difference) are only
//! defined between sets ordered by compatible comparators. The `try_*` variants report a
//! mismatch as [`Error::ComparatorMismatch`](crate::Error::ComparatorMismatch); all other
//! variants panic.

use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::ops::{BitAnd, BitOr, Sub};

use crate::compare::Comparator;
use crate::error::Result;
use crate::map::{AvlTreeMap, IntoIter as MapIntoIter, Iter as MapIter};

/// An ordered set implemented with an AVL tree.
///
/// ```
/// use cmp_avl::AvlTreeSet;
/// let mut set = AvlTreeSet::new();
/// set.insert(0);
/// set.insert(1);
/// set.insert(2);
/// assert_eq!(set.get(&1), Some(&1));
/// set.remove(&1);
/// assert!(set.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeSet<T> {
    map: AvlTreeMap<T, ()>,
}

/// An iterator over the values of a set.
pub struct Iter<'a, T> {
    map_iter: MapIter<'a, T, ()>,
}

/// An owning iterator over the values of a set.
pub struct IntoIter<T> {
    map_into_iter: MapIntoIter<T, ()>,
}

/// A lazy iterator for the values in the union of two sets.
///
/// This `struct` is created by the [`union`] method on [`AvlTreeSet`].
///
/// [`union`]: AvlTreeSet::union
pub struct Union<'a, T> {
    cmp: Comparator<T>,
    lhs_peek: Option<&'a T>,
    rhs_peek: Option<&'a T>,
    lhs_iter: Iter<'a, T>,
    rhs_iter: Iter<'a, T>,
}

/// A lazy iterator for the values in the intersection of two sets.
///
/// This `struct` is created by the [`intersection`] method on [`AvlTreeSet`].
///
/// [`intersection`]: AvlTreeSet::intersection
pub struct Intersection<'a, T> {
    cmp: Comparator<T>,
    lhs_peek: Option<&'a T>,
    rhs_peek: Option<&'a T>,
    lhs_iter: Iter<'a, T>,
    rhs_iter: Iter<'a, T>,
}

/// A lazy iterator for the values of one set that are not in another.
///
/// This `struct` is created by the [`difference`] method on [`AvlTreeSet`].
///
/// [`difference`]: AvlTreeSet::difference
pub struct Difference<'a, T> {
    cmp: Comparator<T>,
    lhs_peek: Option<&'a T>,
    rhs_peek: Option<&'a T>,
    lhs_iter: Iter<'a, T>,
    rhs_iter: Iter<'a, T>,
}

impl<T: Ord> AvlTreeSet<T> {
    /// Creates an empty set in natural order.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<T> AvlTreeSet<T> {
    /// Creates an empty set ordered by `cmp`.
    pub fn with_comparator(cmp: Comparator<T>) -> Self {
        Self {
            map: AvlTreeMap::with_comparator(cmp),
        }
    }

    /// Returns the comparator ordering the values.
    pub fn comparator(&self) -> &Comparator<T> {
        self.map.comparator()
    }

    /// Returns true if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Clears the set, deallocating all memory.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns a reference to the value in the set that is equal to the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|kv| kv.0)
    }

    /// Returns true if the set contains a value.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Inserts a value into the set.
    /// Returns whether the value was newly inserted.
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ())
    }

    /// Removes a value from the set.
    /// Returns whether the value was previously in the set.
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Removes a value from the set.
    /// Returns the value if it was previously in the set.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.remove_entry(value).map(|(k, _)| k)
    }

    /// Returns the smallest value in the set.
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(k, _)| k)
    }

    /// Returns the largest value in the set.
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(k, _)| k)
    }

    /// Calls `f` on every value in ascending order.
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        self.map.for_each(|k, _| f(k));
    }

    /// Gets an iterator over the values of the set in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            map_iter: self.map.iter(),
        }
    }

    /// Returns true if every value of `self` is contained in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.assert_compatible(other, "is_subset");
        self.len() <= other.len() && self.iter().all(|value| other.contains(value))
    }

    /// Like [`is_subset`](Self::is_subset), but fails instead of panicking.
    pub fn try_is_subset(&self, other: &Self) -> Result<bool> {
        self.comparator().check_compatible(other.comparator())?;
        Ok(self.is_subset(other))
    }

    /// Returns true if every value of `other` is contained in `self`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns true if `self` has no elements in common with `other`.
    /// This is equivalent to checking for an empty intersection.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).next().is_none()
    }

    /// Compares the values of two sets.
    ///
    /// Fails if the sets are ordered by different comparators.
    pub fn try_eq(&self, other: &Self) -> Result<bool> {
        self.map.try_eq(&other.map)
    }

    /// Gets an iterator over the values of the union set,
    /// i.e., all values in `self` or `other`, without duplicates,
    /// in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T> {
        self.assert_compatible(other, "union");
        Union::new(self, other)
    }

    /// Like [`union`](Self::union), but fails instead of panicking.
    pub fn try_union<'a>(&'a self, other: &'a Self) -> Result<Union<'a, T>> {
        self.comparator().check_compatible(other.comparator())?;
        Ok(Union::new(self, other))
    }

    /// Gets an iterator over the values of the intersection set,
    /// i.e., all values that are both in `self` and `other`,
    /// in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T> {
        self.assert_compatible(other, "intersection");
        Intersection::new(self, other)
    }

    /// Like [`intersection`](Self::intersection), but fails instead of panicking.
    pub fn try_intersection<'a>(&'a self, other: &'a Self) -> Result<Intersection<'a, T>> {
        self.comparator().check_compatible(other.comparator())?;
        Ok(Intersection::new(self, other))
    }

    /// Gets an iterator over the values in `self` but not in `other`,
    /// in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T> {
        self.assert_compatible(other, "difference");
        Difference::new(self, other)
    }

    /// Like [`difference`](Self::difference), but fails instead of panicking.
    pub fn try_difference<'a>(&'a self, other: &'a Self) -> Result<Difference<'a, T>> {
        self.comparator().check_compatible(other.comparator())?;
        Ok(Difference::new(self, other))
    }

    /// Adds all values of `other` to `self`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn union_with(&mut self, other: &Self)
    where
        T: Clone,
    {
        self.assert_compatible(other, "union_with");
        for value in other {
            if !self.contains(value) {
                self.insert(value.clone());
            }
        }
    }

    /// Removes all values from `self` that are not in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn intersect_with(&mut self, other: &Self) {
        self.assert_compatible(other, "intersect_with");
        self.retain_by(|value| other.contains(value));
    }

    /// Removes all values from `self` that are in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    pub fn subtract(&mut self, other: &Self) {
        self.assert_compatible(other, "subtract");
        self.retain_by(|value| !other.contains(value));
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.map.check_consistency()
    }

    #[track_caller]
    fn assert_compatible(&self, other: &Self, operation: &str) {
        self.comparator().assert_compatible(other.comparator(), operation);
    }

    // Rebuilds the set from the values to keep, in order.
    fn retain_by<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        let cmp = *self.comparator();
        let map = std::mem::replace(&mut self.map, AvlTreeMap::with_comparator(cmp));
        for (value, ()) in map {
            if keep(&value) {
                self.insert(value);
            }
        }
    }
}

impl<T: Ord> Default for AvlTreeSet<T> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PartialEq for AvlTreeSet<T> {
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTreeSet<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a AvlTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for AvlTreeSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            map_into_iter: self.map.into_iter(),
        }
    }
}

impl<T> Extend<T> for AvlTreeSet<T> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<'a, T> Extend<&'a T> for AvlTreeSet<T>
where
    T: Copy + 'a,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Clone> BitOr<&AvlTreeSet<T>> for &AvlTreeSet<T> {
    type Output = AvlTreeSet<T>;

    /// Returns the union of `self` and `rhs`, ordered by the comparator of `self`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    fn bitor(self, rhs: &AvlTreeSet<T>) -> AvlTreeSet<T> {
        let mut set = AvlTreeSet::with_comparator(*self.comparator());
        set.extend(self.union(rhs).cloned());
        set
    }
}

impl<T: Clone> BitAnd<&AvlTreeSet<T>> for &AvlTreeSet<T> {
    type Output = AvlTreeSet<T>;

    /// Returns the intersection of `self` and `rhs`, ordered by the comparator of `self`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    fn bitand(self, rhs: &AvlTreeSet<T>) -> AvlTreeSet<T> {
        let mut set = AvlTreeSet::with_comparator(*self.comparator());
        set.extend(self.intersection(rhs).cloned());
        set
    }
}

impl<T: Clone> Sub<&AvlTreeSet<T>> for &AvlTreeSet<T> {
    type Output = AvlTreeSet<T>;

    /// Returns the values of `self` that are not in `rhs`,
    /// ordered by the comparator of `self`.
    ///
    /// # Panics
    ///
    /// Panics if the sets are ordered by different comparators.
    fn sub(self, rhs: &AvlTreeSet<T>) -> AvlTreeSet<T> {
        let mut set = AvlTreeSet::with_comparator(*self.comparator());
        set.extend(self.difference(rhs).cloned());
        set
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            map_iter: self.map_iter.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        self.map_iter.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.map_iter.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.map_iter.next_back().map(|(k, _)| k)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<Self::Item> {
        self.map_into_iter.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.map_into_iter.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<'a, T> Union<'a, T> {
    fn new(lhs: &'a AvlTreeSet<T>, rhs: &'a AvlTreeSet<T>) -> Self {
        let mut lhs_iter = lhs.iter();
        let mut rhs_iter = rhs.iter();
        Self {
            cmp: *lhs.comparator(),
            lhs_peek: lhs_iter.next(),
            rhs_peek: rhs_iter.next(),
            lhs_iter,
            rhs_iter,
        }
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<'a, T> Clone for Union<'a, T> {
    fn clone(&self) -> Self {
        Self {
            cmp: self.cmp,
            lhs_peek: self.lhs_peek,
            rhs_peek: self.rhs_peek,
            lhs_iter: self.lhs_iter.clone(),
            rhs_iter: self.rhs_iter.clone(),
        }
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for Union<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Union")?;
        f.debug_set().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Union<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        match (self.lhs_peek, self.rhs_peek) {
            (None, None) => None,
            (Some(lhs), None) => {
                self.lhs_peek = self.lhs_iter.next();
                Some(lhs)
            }
            (None, Some(rhs)) => {
                self.rhs_peek = self.rhs_iter.next();
                Some(rhs)
            }
            (Some(lhs), Some(rhs)) => match self.cmp.compare(lhs, rhs) {
                Ordering::Less => {
                    self.lhs_peek = self.lhs_iter.next();
                    Some(lhs)
                }
                Ordering::Equal => {
                    self.lhs_peek = self.lhs_iter.next();
                    self.rhs_peek = self.rhs_iter.next();
                    Some(lhs)
                }
                Ordering::Greater => {
                    self.rhs_peek = self.rhs_iter.next();
                    Some(rhs)
                }
            },
        }
    }
}

impl<T> FusedIterator for Union<'_, T> {}

impl<'a, T> Intersection<'a, T> {
    fn new(lhs: &'a AvlTreeSet<T>, rhs: &'a AvlTreeSet<T>) -> Self {
        let mut lhs_iter = lhs.iter();
        let mut rhs_iter = rhs.iter();
        Self {
            cmp: *lhs.comparator(),
            lhs_peek: lhs_iter.next(),
            rhs_peek: rhs_iter.next(),
            lhs_iter,
            rhs_iter,
        }
    }
}

// Auto derived Clone seems to have an invalid type bound of T: Clone
impl<'a, T> Clone for Intersection<'a, T> {
    fn clone(&self) -> Self {
        Self {
            cmp: self.cmp,
            lhs_peek: self.lhs_peek,
            rhs_peek: self.rhs_peek,
            lhs_iter: self.lhs_iter.clone(),
            rhs_iter: self.rhs_iter.clone(),
        }
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for Intersection<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Intersection")?;
        f.debug_set().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Intersection<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (self.lhs_peek, self.rhs_peek) {
                (None, _) | (_, None) => return None,
                (Some(lhs), Some(rhs)) => match self.cmp.compare(lhs, rhs) {
                    Ordering::Equal => {
                        self.lhs_peek = self.lhs_iter.next();
                        self.rhs_peek = self.rhs_iter.next();
                        return Some(lhs);
                    }
                    Ordering::Less => {
                        self.lhs_peek = self.lhs_iter.next();
                    }
                    Ordering::Greater => {
                        self.rhs_peek = self.rhs_iter.next();
                    }
                },
            }
        }
    }
}

impl<T> FusedIterator for Intersection<'_, T> {}

impl<'a, T> Difference<'a, T> {
    fn new(lhs: &'a AvlTreeSet<T>, rhs: &'a AvlTreeSet<T>) -> Self {
        let mut lhs_iter = lhs.iter();
        let mut rhs_iter = rhs.iter();
        Self {
            cmp: *lhs.comparator(),
            lhs_peek: lhs_iter.next(),
            rhs_peek: rhs_iter.next(),
            lhs_iter,
            rhs_iter,
        }
    }
}

impl<'a, T> Clone for Difference<'a, T> {
    fn clone(&self) -> Self {
        Self {
            cmp: self.cmp,
            lhs_peek: self.lhs_peek,
            rhs_peek: self.rhs_peek,
            lhs_iter: self.lhs_iter.clone(),
            rhs_iter: self.rhs_iter.clone(),
        }
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for Difference<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Difference")?;
        f.debug_set().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Difference<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (self.lhs_peek, self.rhs_peek) {
                (None, _) => return None,
                (Some(lhs), None) => {
                    self.lhs_peek = self.lhs_iter.next();
                    return Some(lhs);
                }
                (Some(lhs), Some(rhs)) => match self.cmp.compare(lhs, rhs) {
                    Ordering::Less => {
                        self.lhs_peek = self.lhs_iter.next();
                        return Some(lhs);
                    }
                    Ordering::Equal => {
                        self.lhs_peek = self.lhs_iter.next();
                        self.rhs_peek = self.rhs_iter.next();
                    }
                    Ordering::Greater => {
                        self.rhs_peek = self.rhs_iter.next();
                    }
                },
            }
        }
    }
}

impl<T> FusedIterator for Difference<'_, T> {}
