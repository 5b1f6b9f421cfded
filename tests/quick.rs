//! Property tests comparing the AVL tree against `std::collections::BTreeMap`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use quickcheck::{quickcheck, Arbitrary, Gen};

use cmp_avl::{AvlTreeMap, AvlTreeSet, Comparator};

/// The various kinds of "things" to do to a map in a quicktest.
#[derive(Copy, Clone, Debug)]
enum Op<K, V> {
    /// Insert the K, V into the map
    Insert(K, V),
    /// Remove the K from the map
    Remove(K),
    /// Compare iterators
    Iter,
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 0, 1, 2]).unwrap() {
            0 => Op::Insert(K::arbitrary(g), V::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            2 => Op::Iter,
            _ => unreachable!(),
        }
    }
}

fn descending(a: &i16, b: &i16) -> Ordering {
    b.cmp(a)
}

// Bound on the number of levels of an AVL tree: 1.44 * log2(n + 2)
const HEIGHT_FACTOR: f64 = 1.44;

fn is_valid(map: &AvlTreeMap<i16, i16>) -> bool {
    let bound = HEIGHT_FACTOR * ((map.len() + 2) as f64).log2();
    (map.height() as f64) <= bound && map.keys().zip(map.keys().skip(1)).all(|(a, b)| a < b)
}

quickcheck! {
    fn fuzz_multiple_operations(ops: Vec<Op<i16, i16>>) -> bool {
        let mut map = AvlTreeMap::new();
        let mut reference = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    if map.insert(k, v) != reference.insert(k, v).is_none() {
                        return false;
                    }
                }
                Op::Remove(k) => {
                    if map.remove(&k) != reference.remove(&k) {
                        return false;
                    }
                }
                Op::Iter => {
                    if !map.iter().eq(reference.iter()) {
                        return false;
                    }
                }
            }
            if map.len() != reference.len() || !is_valid(&map) {
                return false;
            }
        }

        reference.iter().all(|(k, v)| map.get(k) == Some(v))
    }

    fn insert_then_remove_all(xs: Vec<i16>) -> bool {
        let mut map = AvlTreeMap::new();
        for x in &xs {
            map.insert(*x, *x);
        }
        let distinct: BTreeSet<_> = xs.iter().copied().collect();
        if map.len() != distinct.len() {
            return false;
        }
        for x in xs.iter().rev() {
            map.remove(x);
        }
        map.is_empty() && map.len() == 0 && map.height() == 0
    }

    fn contains_not(xs: Vec<i16>, nots: Vec<i16>) -> bool {
        let set: AvlTreeSet<_> = xs.iter().copied().collect();
        let added: BTreeSet<_> = xs.into_iter().collect();
        nots.iter()
            .filter(|x| !added.contains(x))
            .all(|x| !set.contains(x))
    }

    fn custom_order_iterates_descending(xs: Vec<i16>) -> bool {
        let mut set = AvlTreeSet::with_comparator(Comparator::new("descending", descending));
        set.extend(xs.iter().copied());
        let expected: BTreeSet<_> = xs.into_iter().collect();
        set.iter().eq(expected.iter().rev())
    }

    fn set_algebra_matches_btree_set(lhs: Vec<i16>, rhs: Vec<i16>) -> bool {
        let avl_lhs: AvlTreeSet<_> = lhs.iter().copied().collect();
        let avl_rhs: AvlTreeSet<_> = rhs.iter().copied().collect();
        let std_lhs: BTreeSet<_> = lhs.into_iter().collect();
        let std_rhs: BTreeSet<_> = rhs.into_iter().collect();

        avl_lhs.union(&avl_rhs).eq(std_lhs.union(&std_rhs))
            && avl_lhs.intersection(&avl_rhs).eq(std_lhs.intersection(&std_rhs))
            && avl_lhs.difference(&avl_rhs).eq(std_lhs.difference(&std_rhs))
            && avl_lhs.is_subset(&avl_rhs) == std_lhs.is_subset(&std_rhs)
            && avl_lhs.is_disjoint(&avl_rhs) == std_lhs.is_disjoint(&std_rhs)
    }
}
