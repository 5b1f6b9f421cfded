//! The AVL tree core shared by [`AvlTreeMap`](crate::AvlTreeMap) and
//! [`AvlTreeSet`](crate::AvlTreeSet).
//!
//! Every node stores a balance factor (height of the right subtree minus height of the
//! left subtree) instead of its height. Insert and remove descend recursively and report
//! back up whether the height of the visited subtree changed; the caller applies that
//! change to its own balance factor and restores the AVL condition by rotation if the
//! factor leaves `-1..=1`.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use crate::compare::Comparator;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Balance {
    LeftHeavy,
    Balanced,
    RightHeavy,
}

impl Balance {
    fn factor(self) -> i8 {
        match self {
            Balance::LeftHeavy => -1,
            Balance::Balanced => 0,
            Balance::RightHeavy => 1,
        }
    }

    fn from_factor(factor: i8) -> Self {
        match factor {
            -1 => Balance::LeftHeavy,
            0 => Balance::Balanced,
            1 => Balance::RightHeavy,
            _ => unreachable!(),
        }
    }
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    balance: Balance,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            balance: Balance::Balanced,
        }
    }

    // Children must have been unlinked before.
    fn into_entry(self: Box<Self>) -> (K, V) {
        debug_assert!(self.left.is_none() && self.right.is_none());
        let Node { key, value, .. } = *self;
        (key, value)
    }
}

/// A self-balancing binary search tree ordered by a [`Comparator`].
///
/// ```
/// use cmp_avl::{BalancedTree, Comparator};
///
/// let mut tree = BalancedTree::new(Comparator::natural());
/// assert!(tree.insert(2, "two"));
/// assert!(tree.insert(1, "one"));
/// assert!(!tree.insert(2, "deux"));
/// assert_eq!(tree.find(&2), Some(&"deux"));
/// assert!(tree.remove(&1));
/// assert!(!tree.remove(&1));
/// assert_eq!(tree.len(), 1);
/// ```
#[derive(Clone)]
pub struct BalancedTree<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
    cmp: Comparator<K>,
}

impl<K, V> BalancedTree<K, V> {
    /// Creates an empty tree ordered by `cmp`.
    /// No memory is allocated until the first entry is inserted.
    pub fn new(cmp: Comparator<K>) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            cmp,
        }
    }

    /// Returns the comparator the tree was created with.
    pub fn comparator(&self) -> &Comparator<K> {
        &self.cmp
    }

    /// Returns true if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of levels of the tree, zero if empty.
    ///
    /// Follows the taller child on every level as told by the balance factors.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            height += 1;
            current = match node.balance {
                Balance::RightHeavy => node.right.as_deref(),
                _ => node.left.as_deref(),
            };
        }
        height
    }

    /// Removes all entries, deallocating all memory.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a reference to the value stored for the key.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|node| &node.value)
    }

    /// Returns references to the stored key and its value.
    pub fn find_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|node| (&node.key, &node.value))
    }

    /// Returns a mutable reference to the value stored for the key.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match self.cmp.compare(key, &node.key) {
                Ordering::Equal => return Some(&mut node.value),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }

    /// Returns true if the tree contains the key.
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// Returns true if a new entry has been created. If an equal key is already present,
    /// only its value is overwritten and false is returned.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.replace(key, value).is_none()
    }

    /// Inserts a key-value pair.
    /// Returns the previous value if an equal key was already present.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        let (_, replaced) = insert_at(&mut self.root, key, value, &self.cmp);
        if replaced.is_none() {
            self.num_nodes += 1;
        }
        replaced
    }

    /// Returns a mutable reference to the value stored for the key, first inserting
    /// the value computed by `f` if the key is not present.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, f: F) -> &mut V
    where
        K: Clone,
    {
        if !self.contains(&key) {
            self.insert(key.clone(), f());
        }
        match self.find_mut(&key) {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    /// Removes a key from the tree.
    /// Returns whether the key was previously in the tree.
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    /// Removes a key from the tree.
    /// Returns the stored key and value if the key was previously in the tree.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let (_, entry) = remove_at(&mut self.root, key, &self.cmp)?;
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        Some(entry)
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Calls `f` on every entry in ascending key order.
    pub fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) {
        visit_in_order(&self.root, &mut f);
    }

    /// Gets an iterator over the entries of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.num_nodes)
    }

    /// Gets an iterator over the entries of the tree in ascending key order,
    /// with mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.root, self.num_nodes)
    }

    /// Asserts that the internal tree structure is consistent.
    ///
    /// Checks key order, that every balance factor matches the real subtree heights and
    /// lies within `-1..=1`, and the number of entries.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        check_subtree(&self.root, &self.cmp, None, None, &mut num_nodes);
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(self.root.is_none(), self.num_nodes == 0);
    }

    fn find_node(&self, key: &K) -> Option<&Node<K, V>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match self.cmp.compare(key, &node.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }
}

impl<K: Ord, V> Default for BalancedTree<K, V> {
    /// Creates an empty tree in natural key order.
    fn default() -> Self {
        Self::new(Comparator::natural())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BalancedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a BalancedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut BalancedTree<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for BalancedTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.num_nodes)
    }
}

fn node_ref<K, V>(link: &Link<K, V>) -> &Node<K, V> {
    match link {
        Some(node) => &**node,
        None => unreachable!(),
    }
}

fn node_mut<K, V>(link: &mut Link<K, V>) -> &mut Node<K, V> {
    match link {
        Some(node) => &mut **node,
        None => unreachable!(),
    }
}

/// Inserts below `link`.
/// Returns whether the height of the subtree increased, and the value replaced if the
/// key was already present.
fn insert_at<K, V>(
    link: &mut Link<K, V>,
    key: K,
    value: V,
    cmp: &Comparator<K>,
) -> (bool, Option<V>) {
    if link.is_none() {
        *link = Some(Box::new(Node::new(key, value)));
        return (true, None);
    }

    let node = node_mut(link);
    let (grown, delta, replaced) = match cmp.compare(&key, &node.key) {
        Ordering::Equal => return (false, Some(mem::replace(&mut node.value, value))),
        Ordering::Less => {
            let (grown, replaced) = insert_at(&mut node.left, key, value, cmp);
            (grown, -1, replaced)
        }
        Ordering::Greater => {
            let (grown, replaced) = insert_at(&mut node.right, key, value, cmp);
            (grown, 1, replaced)
        }
    };
    if !grown {
        return (false, replaced);
    }

    // Height at link increased iff it ended up leaning to one side (after any rotation)
    update_balance(link, delta);
    (node_ref(link).balance != Balance::Balanced, replaced)
}

/// Removes `key` from below `link`.
/// Returns `None` if the key is not present, otherwise whether the height of the subtree
/// decreased and the removed entry.
fn remove_at<K, V>(
    link: &mut Link<K, V>,
    key: &K,
    cmp: &Comparator<K>,
) -> Option<(bool, (K, V))> {
    let node = link.as_deref_mut()?;
    let (shrunk, delta, entry) = match cmp.compare(key, &node.key) {
        Ordering::Equal => return Some(remove_target(link)),
        Ordering::Less => {
            let (shrunk, entry) = remove_at(&mut node.left, key, cmp)?;
            (shrunk, 1, entry)
        }
        Ordering::Greater => {
            let (shrunk, entry) = remove_at(&mut node.right, key, cmp)?;
            (shrunk, -1, entry)
        }
    };
    if !shrunk {
        return Some((false, entry));
    }
    Some((shrink(link, delta), entry))
}

/// Unlinks the node at `link`.
fn remove_target<K, V>(link: &mut Link<K, V>) -> (bool, (K, V)) {
    let mut target = match link.take() {
        Some(node) => node,
        None => unreachable!(),
    };

    if target.left.is_none() {
        *link = target.right.take();
        return (true, target.into_entry());
    }
    if target.right.is_none() {
        *link = target.left.take();
        return (true, target.into_entry());
    }

    // Two children: the in-order predecessor takes the place of the target's entry
    let (shrunk, mut predecessor) = remove_max(&mut target.left);
    mem::swap(&mut target.key, &mut predecessor.key);
    mem::swap(&mut target.value, &mut predecessor.value);
    *link = Some(target);
    if !shrunk {
        return (false, predecessor.into_entry());
    }
    (shrink(link, 1), predecessor.into_entry())
}

/// Unlinks the rightmost node below `link`, which has no right child.
fn remove_max<K, V>(link: &mut Link<K, V>) -> (bool, Box<Node<K, V>>) {
    let node = node_mut(link);
    if node.right.is_some() {
        let (shrunk, max) = remove_max(&mut node.right);
        if !shrunk {
            return (false, max);
        }
        return (shrink(link, -1), max);
    }

    let mut max = match link.take() {
        Some(node) => node,
        None => unreachable!(),
    };
    *link = max.left.take();
    (true, max)
}

/// Applies the height decrease of one child subtree to the node at `link`.
/// Returns whether the height at `link` decreased as well.
fn shrink<K, V>(link: &mut Link<K, V>, delta: i8) -> bool {
    update_balance(link, delta);
    node_ref(link).balance == Balance::Balanced
}

/// Adds `delta` to the balance factor of the node at `link`, rotating if it leaves `-1..=1`.
fn update_balance<K, V>(link: &mut Link<K, V>, delta: i8) {
    let node = node_mut(link);
    match node.balance.factor() + delta {
        -2 => fix_left_imbalance(link),
        2 => fix_right_imbalance(link),
        factor => node.balance = Balance::from_factor(factor),
    }
}

/// Restores balance at `link` whose left subtree is two levels higher than its right one.
fn fix_left_imbalance<K, V>(link: &mut Link<K, V>) {
    let node = node_mut(link);
    let child = node_mut(&mut node.left);
    log::trace!("fixing left imbalance, left child is {:?}", child.balance);
    match child.balance {
        Balance::RightHeavy => {
            let grandchild = node_ref(&child.right).balance;
            rotate_left(&mut node.left);
            rotate_right(link);
            set_double_rotation_balance(link, grandchild);
        }
        Balance::Balanced => {
            // Only reachable on removal, the height of the subtree does not change
            rotate_right(link);
            let root = node_mut(link);
            root.balance = Balance::RightHeavy;
            node_mut(&mut root.right).balance = Balance::LeftHeavy;
        }
        Balance::LeftHeavy => {
            rotate_right(link);
            let root = node_mut(link);
            root.balance = Balance::Balanced;
            node_mut(&mut root.right).balance = Balance::Balanced;
        }
    }
}

/// Restores balance at `link` whose right subtree is two levels higher than its left one.
fn fix_right_imbalance<K, V>(link: &mut Link<K, V>) {
    let node = node_mut(link);
    let child = node_mut(&mut node.right);
    log::trace!("fixing right imbalance, right child is {:?}", child.balance);
    match child.balance {
        Balance::LeftHeavy => {
            let grandchild = node_ref(&child.left).balance;
            rotate_right(&mut node.right);
            rotate_left(link);
            set_double_rotation_balance(link, grandchild);
        }
        Balance::Balanced => {
            rotate_left(link);
            let root = node_mut(link);
            root.balance = Balance::LeftHeavy;
            node_mut(&mut root.left).balance = Balance::RightHeavy;
        }
        Balance::RightHeavy => {
            rotate_left(link);
            let root = node_mut(link);
            root.balance = Balance::Balanced;
            node_mut(&mut root.left).balance = Balance::Balanced;
        }
    }
}

// The former grandchild is the new subtree root; its old balance decides its children's.
fn set_double_rotation_balance<K, V>(link: &mut Link<K, V>, grandchild: Balance) {
    let (left, right) = match grandchild {
        Balance::LeftHeavy => (Balance::Balanced, Balance::RightHeavy),
        Balance::Balanced => (Balance::Balanced, Balance::Balanced),
        Balance::RightHeavy => (Balance::LeftHeavy, Balance::Balanced),
    };
    let root = node_mut(link);
    root.balance = Balance::Balanced;
    node_mut(&mut root.left).balance = left;
    node_mut(&mut root.right).balance = right;
}

/// Promotes the right child of the node at `link`. Balance factors are left untouched.
fn rotate_left<K, V>(link: &mut Link<K, V>) {
    let mut node = match link.take() {
        Some(node) => node,
        None => unreachable!(),
    };
    let mut child = match node.right.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.right = child.left.take();
    child.left = Some(node);
    *link = Some(child);
}

/// Promotes the left child of the node at `link`. Balance factors are left untouched.
fn rotate_right<K, V>(link: &mut Link<K, V>) {
    let mut node = match link.take() {
        Some(node) => node,
        None => unreachable!(),
    };
    let mut child = match node.left.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.left = child.right.take();
    child.right = Some(node);
    *link = Some(child);
}

fn visit_in_order<K, V, F: FnMut(&K, &V)>(link: &Link<K, V>, f: &mut F) {
    if let Some(node) = link {
        visit_in_order(&node.left, f);
        f(&node.key, &node.value);
        visit_in_order(&node.right, f);
    }
}

// Returns the height of the subtree.
#[cfg(any(test, feature = "consistency_check"))]
fn check_subtree<K, V>(
    link: &Link<K, V>,
    cmp: &Comparator<K>,
    lower: Option<&K>,
    upper: Option<&K>,
    num_nodes: &mut usize,
) -> usize {
    match link {
        None => 0,
        Some(node) => {
            if let Some(lower) = lower {
                assert_eq!(cmp.compare(lower, &node.key), Ordering::Less);
            }
            if let Some(upper) = upper {
                assert_eq!(cmp.compare(&node.key, upper), Ordering::Less);
            }
            let left_height = check_subtree(&node.left, cmp, lower, Some(&node.key), num_nodes);
            let right_height = check_subtree(&node.right, cmp, Some(&node.key), upper, num_nodes);

            // Check AVL condition and stored balance factor
            let factor = right_height as isize - left_height as isize;
            assert!((-1..=1).contains(&factor));
            assert_eq!(node.balance.factor() as isize, factor);

            *num_nodes += 1;
            1 + left_height.max(right_height)
        }
    }
}

/// An iterator over the entries of a tree.
pub struct Iter<'a, K, V> {
    front: Vec<&'a Node<K, V>>,
    back: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: &'a Link<K, V>, len: usize) -> Self {
        let mut iter = Self {
            front: Vec::new(),
            back: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root.as_deref());
        iter.push_right_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.front.push(node);
            current = node.left.as_deref();
        }
    }

    fn push_right_spine(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.back.push(node);
            current = node.right.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.push_right_spine(node.left.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// Auto derived clone seems to have an invalid type bound of K, V: Clone
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the entries of a tree.
pub struct IterMut<'a, K, V> {
    stack: Vec<(&'a K, &'a mut V, Option<&'a mut Node<K, V>>)>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    fn new(root: &'a mut Link<K, V>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root.as_deref_mut());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<&'a mut Node<K, V>>) {
        while let Some(node) = current {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = node;
            self.stack.push((&*key, value, right.as_deref_mut()));
            current = left.as_deref_mut();
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value, right) = self.stack.pop()?;
        self.push_left_spine(right);
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a tree.
pub struct IntoIter<K, V> {
    stack: Vec<Box<Node<K, V>>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    fn new(root: Link<K, V>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut current: Link<K, V>) {
        while let Some(mut node) = current {
            current = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.push_left_spine(node.right.take());
        self.remaining -= 1;
        Some(node.into_entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use super::{Balance, BalancedTree, Link};
    use crate::compare::Comparator;
    use std::cmp::Ordering;
    use std::collections::VecDeque;

    // (key, balance) of the subtree root and its children
    fn shape(link: &Link<i32, ()>) -> Option<(i32, Balance)> {
        link.as_ref().map(|node| (node.key, node.balance))
    }

    fn keys(tree: &BalancedTree<i32, ()>) -> Vec<i32> {
        tree.iter().map(|(k, _)| *k).collect()
    }

    fn tree_from(keys: &[i32]) -> BalancedTree<i32, ()> {
        let mut tree = BalancedTree::default();
        for key in keys {
            assert!(tree.insert(*key, ()));
            tree.check_consistency();
        }
        tree
    }

    fn assert_three_balanced(tree: &BalancedTree<i32, ()>) {
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((2, Balance::Balanced)));
        assert_eq!(shape(&root.left), Some((1, Balance::Balanced)));
        assert_eq!(shape(&root.right), Some((3, Balance::Balanced)));
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_single_rotation_on_insert() {
        //     3 ->   2
        //    /      / \
        //   2      1   3
        //  /
        // 1
        assert_three_balanced(&tree_from(&[3, 2, 1]));

        // 1 ->    2
        //  \     / \
        //   2   1   3
        //    \
        //     3
        assert_three_balanced(&tree_from(&[1, 2, 3]));
    }

    #[test]
    fn test_get_or_insert_with_rotation() {
        let mut tree = BalancedTree::<i32, u32>::default();
        *tree.get_or_insert_with(1, || 10) += 1;
        *tree.get_or_insert_with(3, || 30) += 1;
        // 2 lands between 1 and 3 and becomes the root of a double rotation
        *tree.get_or_insert_with(2, || 20) += 1;
        tree.check_consistency();
        assert_eq!(tree.root.as_ref().map(|node| node.key), Some(2));
        assert_eq!(tree.height(), 2);

        *tree.get_or_insert_with(2, || unreachable!()) += 1;
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find(&1), Some(&11));
        assert_eq!(tree.find(&2), Some(&22));
        assert_eq!(tree.find(&3), Some(&31));
    }

    #[test]
    fn test_double_rotation_on_insert() {
        // 1   ->  2
        //  \     / \
        //   3   1   3
        //  /
        // 2
        assert_three_balanced(&tree_from(&[1, 3, 2]));

        //   3  ->   2
        //  /       / \
        // 1       1   3
        //  \
        //   2
        assert_three_balanced(&tree_from(&[3, 1, 2]));
    }

    #[test]
    fn test_double_rotation_balance_table() {
        // Left-right case with a left heavy grandchild:
        //        5                4
        //       / \             /   \
        //      2   6    ->     2     5
        //     / \             / \     \
        //    1   4           1   3     6
        //       /
        //      3
        let mut tree = tree_from(&[5, 2, 6, 1, 4]);
        tree.insert(3, ());
        tree.check_consistency();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((4, Balance::Balanced)));
        assert_eq!(shape(&root.left), Some((2, Balance::Balanced)));
        assert_eq!(shape(&root.right), Some((5, Balance::RightHeavy)));

        // Right-left case with a right heavy grandchild:
        //      2                  3
        //     / \               /   \
        //    1   5     ->      2     5
        //       / \           /     / \
        //      3   6         1     4   6
        //       \
        //        4
        let mut tree = tree_from(&[2, 1, 5, 3, 6]);
        tree.insert(4, ());
        tree.check_consistency();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((3, Balance::Balanced)));
        assert_eq!(shape(&root.left), Some((2, Balance::LeftHeavy)));
        assert_eq!(shape(&root.right), Some((5, Balance::Balanced)));
    }

    #[test]
    fn test_rotation_with_balanced_child_on_remove() {
        //     2              3
        //    / \            / \
        //   1   3    ->    2   4
        //      / \          \
        //    2.5  4         2.5
        // (scaled by 10)
        let mut tree = tree_from(&[20, 10, 30, 25, 40]);
        assert!(tree.remove(&10));
        tree.check_consistency();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((30, Balance::LeftHeavy)));
        assert_eq!(shape(&root.left), Some((20, Balance::RightHeavy)));
        assert_eq!(shape(&root.right), Some((40, Balance::Balanced)));
        assert_eq!(tree.height(), 3);

        // Mirror image
        let mut tree = tree_from(&[40, 30, 50, 20, 35]);
        assert!(tree.remove(&50));
        tree.check_consistency();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((30, Balance::RightHeavy)));
        assert_eq!(shape(&root.left), Some((20, Balance::Balanced)));
        assert_eq!(shape(&root.right), Some((40, Balance::LeftHeavy)));
    }

    #[test]
    fn test_remove_rebalances() {
        let mut tree = tree_from(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.height(), 3);
        assert!(tree.remove(&1));
        tree.check_consistency();
        assert_eq!(keys(&tree), [2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.len(), 6);

        // Removing 2 and 3 empties the left subtree of 4
        assert!(tree.remove(&2));
        tree.check_consistency();
        assert!(tree.remove(&3));
        tree.check_consistency();
        assert_eq!(keys(&tree), [4, 5, 6, 7]);
        assert_eq!(tree.height(), 3);
        assert_ne!(shape(&tree.root).map(|(key, _)| key), Some(4));
    }

    #[test]
    fn test_remove_with_two_children_takes_predecessor() {
        //     4               3
        //    / \             / \
        //   2   6    ->     2   6
        //  / \ / \         /   / \
        // 1  3 5  7       1   5   7
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(tree.remove_entry(&4), Some((4, ())));
        tree.check_consistency();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(&tree.root), Some((3, Balance::Balanced)));
        assert_eq!(shape(&root.left), Some((2, Balance::LeftHeavy)));
        assert_eq!(keys(&tree), [1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_remove_may_rotate_on_every_level() {
        // Number of nodes of a Fibonacci tree of the given height.
        fn fibonacci_size(order: u32) -> i32 {
            match order {
                0 => 0,
                1 => 1,
                _ => fibonacci_size(order - 1) + fibonacci_size(order - 2) + 1,
            }
        }

        // Keys of a Fibonacci tree in level order, so inserting them never rotates.
        fn fibonacci_keys(order: u32) -> Vec<i32> {
            let mut keys = Vec::new();
            let mut queue = VecDeque::from([(order, 0)]);
            while let Some((order, offset)) = queue.pop_front() {
                if order == 0 {
                    continue;
                }
                let key = offset + fibonacci_size(order - 1) + 1;
                keys.push(key);
                if order >= 2 {
                    queue.push_back((order - 1, offset));
                    queue.push_back((order - 2, key));
                }
            }
            keys
        }

        // Every inner node is left heavy, so removing the rightmost leaf
        // rotates on each level on the way up.
        let keys = fibonacci_keys(7);
        let mut tree = tree_from(&keys);
        assert_eq!(tree.len(), 33);
        assert_eq!(tree.height(), 7);
        assert_eq!(shape(&tree.root).map(|(_, balance)| balance), Some(Balance::LeftHeavy));

        let max = *tree.last().unwrap().0;
        assert_eq!(max, 33);
        assert!(tree.remove(&max));
        tree.check_consistency();
        assert_eq!(tree.height(), 6);
        assert_eq!(tree.len(), 32);
    }

    #[test]
    fn test_update_keeps_shape() {
        let mut tree = BalancedTree::default();
        assert!(tree.insert(1, "a"));
        assert!(tree.insert(2, "b"));
        assert!(!tree.insert(1, "c"));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find(&1), Some(&"c"));
        assert_eq!(tree.replace(2, "d"), Some("b"));
        assert_eq!(tree.replace(3, "e"), None);
        assert_eq!(tree.len(), 3);
        tree.check_consistency();
    }

    #[test]
    fn test_custom_comparator() {
        fn descending(a: &i32, b: &i32) -> Ordering {
            b.cmp(a)
        }

        let mut tree = BalancedTree::new(Comparator::new("descending", descending));
        for key in 0..100 {
            tree.insert(key, key * 2);
            tree.check_consistency();
        }
        assert_eq!(tree.first(), Some((&99, &198)));
        assert_eq!(tree.last(), Some((&0, &0)));
        assert_eq!(tree.find(&42), Some(&84));

        let mut visited = Vec::new();
        tree.for_each(|k, _| visited.push(*k));
        assert_eq!(visited, (0..100).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_both_ends() {
        let tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next().map(|(k, _)| *k), Some(1));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(7));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(6));
        assert_eq!(iter.len(), 4);
        let rest: Vec<_> = iter.map(|(k, _)| *k).collect();
        assert_eq!(rest, [2, 3, 4, 5]);

        let backwards: Vec<_> = tree.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(backwards, [7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_into_iter_and_clone() {
        let tree = tree_from(&[5, 3, 8, 1, 4]);
        let copy = tree.clone();
        copy.check_consistency();
        let entries: Vec<_> = tree.into_iter().map(|(k, _)| k).collect();
        assert_eq!(entries, [1, 3, 4, 5, 8]);
        assert_eq!(keys(&copy), [1, 3, 4, 5, 8]);
    }
}
