//! An ordered map implemented with an AVL tree.

use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::ops::Index;

use crate::compare::Comparator;
use crate::error::Result;
use crate::tree::BalancedTree;

pub use crate::tree::{IntoIter, Iter, IterMut};

/// An ordered map implemented with an AVL tree.
///
/// Keys are ordered by the [`Comparator`] given at construction,
/// or by their `Ord` implementation when created with [`new`](Self::new).
///
/// ```
/// use cmp_avl::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    tree: BalancedTree<K, V>,
}

/// An iterator over the keys of a map.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An iterator over the values of a map.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map in natural key order.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by `cmp`.
    pub fn with_comparator(cmp: Comparator<K>) -> Self {
        Self {
            tree: BalancedTree::new(cmp),
        }
    }

    /// Returns the comparator ordering the keys.
    pub fn comparator(&self) -> &Comparator<K> {
        self.tree.comparator()
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.find(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.find_mut(key)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.find_entry(key)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns true if the key was not present before. Otherwise the value is updated,
    /// the stored key is kept, and false is returned.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert(key, value)
    }

    /// Inserts a key-value pair into the map.
    /// Returns the old value if the key was present before.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.tree.replace(key, value)
    }

    /// Returns a mutable reference to the value for the key, inserting the result of `f`
    /// if the key is not present.
    ///
    /// ```
    /// use cmp_avl::AvlTreeMap;
    /// let mut counts = AvlTreeMap::new();
    /// for ch in "abracadabra".chars() {
    ///     *counts.get_or_insert_with(ch, || 0) += 1;
    /// }
    /// assert_eq!(counts[&'a'], 5);
    /// assert_eq!(counts.len(), 5);
    /// ```
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, f: F) -> &mut V
    where
        K: Clone,
    {
        self.tree.get_or_insert_with(key, f)
    }

    /// Returns a mutable reference to the value for the key,
    /// inserting `V::default()` if the key is not present.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default,
    {
        self.tree.get_or_insert_with(key, V::default)
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.tree.remove_entry(key)
    }

    /// Returns the key-value pair with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Returns the key-value pair with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Calls `f` on every key-value pair in ascending key order.
    pub fn for_each<F: FnMut(&K, &V)>(&self, f: F) {
        self.tree.for_each(f);
    }

    /// Gets an iterator over the entries of the map in sorted order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Gets a mutable iterator over the entries of the map in sorted order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    /// Gets an iterator over the keys of the map in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// Gets an iterator over the values of the map in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }

    /// Compares the entries of two maps.
    ///
    /// Fails if the maps are ordered by different comparators.
    pub fn try_eq(&self, other: &Self) -> Result<bool>
    where
        V: PartialEq,
    {
        self.comparator().check_compatible(other.comparator())?;
        Ok(self.entries_eq(other))
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency()
    }

    fn entries_eq(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        let cmp = self.comparator();
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((lk, lv), (rk, rv))| cmp.compare(lk, rk).is_eq() && lv == rv)
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    /// # Panics
    ///
    /// Panics if the maps are ordered by different comparators.
    fn eq(&self, other: &Self) -> bool {
        self.comparator().assert_compatible(other.comparator(), "eq");
        self.entries_eq(other)
    }
}

impl<K, V> Index<&K> for AvlTreeMap<K, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("attempt to get value for key which is not contained in map"),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<'a, K: Copy, V: Copy> Extend<(&'a K, &'a V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut AvlTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

// Auto derived clone seems to have an invalid type bound of K, V: Clone
impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
        }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
        }
    }
}
