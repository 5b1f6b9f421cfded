//! Key ordering supplied at construction time.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// A three-way ordering over keys, tagged with a name.
///
/// Two collections may only be combined (compared, merged, intersected...) if their
/// comparators are compatible: they carry the same name and the same ordering function.
/// Comparators obtained from [`Comparator::natural`] are always compatible with each other.
/// A comparator built with [`Comparator::new`] should be created from a non-generic
/// function, since instances of a generic function are not guaranteed to share an address.
///
/// ```
/// use std::cmp::Ordering;
/// use cmp_avl::{AvlTreeSet, Comparator};
///
/// fn by_len(a: &&str, b: &&str) -> Ordering {
///     a.len().cmp(&b.len()).then(a.cmp(b))
/// }
///
/// let mut set = AvlTreeSet::with_comparator(Comparator::new("by_len", by_len));
/// set.insert("ccc");
/// set.insert("a");
/// set.insert("bb");
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["a", "bb", "ccc"]);
/// ```
pub struct Comparator<K> {
    name: &'static str,
    func: fn(&K, &K) -> Ordering,
    natural: bool,
}

impl<K> Comparator<K> {
    /// Creates a comparator from an ordering function and the name identifying it.
    pub fn new(name: &'static str, func: fn(&K, &K) -> Ordering) -> Self {
        Self {
            name,
            func,
            natural: false,
        }
    }

    /// Returns the name identifying the comparator.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Compares two keys.
    #[inline]
    pub fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        (self.func)(lhs, rhs)
    }

    /// Returns true if both comparators are known to impose the same order.
    pub fn is_compatible(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        if self.natural && other.natural {
            return true;
        }
        let same_func = self.func as usize == other.func as usize;
        if !same_func {
            log::warn!(
                "comparators named `{}` use different ordering functions",
                self.name
            );
        }
        same_func
    }

    /// Fails with [`Error::ComparatorMismatch`] unless both comparators are compatible.
    pub fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(Error::ComparatorMismatch {
                left: self.name,
                right: other.name,
            })
        }
    }

    /// Like [`check_compatible`](Self::check_compatible), but panics on mismatch.
    #[track_caller]
    pub(crate) fn assert_compatible(&self, other: &Self, operation: &str) {
        if let Err(err) = self.check_compatible(other) {
            log::error!("{}: {}", operation, err);
            panic!("{}: {}", operation, err);
        }
    }
}

impl<K: Ord> Comparator<K> {
    /// The order given by the key type's `Ord` implementation.
    pub fn natural() -> Self {
        Self {
            natural: true,
            ..Self::new("natural", <K as Ord>::cmp)
        }
    }
}

impl<K: Ord> Default for Comparator<K> {
    fn default() -> Self {
        Self::natural()
    }
}

// Derived impls would require K: Clone / K: Debug
impl<K> Clone for Comparator<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Comparator<K> {}

impl<K> fmt::Debug for Comparator<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Comparator").field(&self.name).finish()
    }
}
