//! A map and a set implemented with an AVL tree whose keys are ordered by a
//! caller-supplied [`Comparator`].
//!
//! The tree keeps a balance factor in every node and restores the AVL condition with
//! single or double rotations, so lookups, insertions and removals take
//! logarithmic time in the worst case.
//!
//! ```
//! use cmp_avl::{AvlTreeMap, AvlTreeSet};
//!
//! let mut map = AvlTreeMap::new();
//! map.insert("b", 2);
//! map.insert("a", 1);
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "b"]);
//!
//! let lhs: AvlTreeSet<_> = (0..4).collect();
//! let rhs: AvlTreeSet<_> = (2..6).collect();
//! assert_eq!((&lhs & &rhs).into_iter().collect::<Vec<_>>(), [2, 3]);
//! ```

mod compare;
mod error;
pub mod map;
pub mod set;
pub mod tree;

pub use compare::Comparator;
pub use error::{Error, Result};
pub use map::AvlTreeMap;
pub use set::AvlTreeSet;
pub use tree::BalancedTree;
