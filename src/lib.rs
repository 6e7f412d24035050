//! # A parent-linked AVL tree with stable positions
//!
//! `linked-avl` provides [`AvlTree`], a height-balanced binary search tree
//! whose nodes know their parents, together with an ordered map
//! ([`AvlMap`]) and an ordered set ([`AvlSet`]) built on it.
//!
//! Besides the usual iterators, the tree hands out [`Pos`] values: small
//! copyable positions that name an entry (or the end-marker one past the last
//! entry) without borrowing the tree.  Positions can be stepped forwards and
//! backwards, survive unrelated insertions and removals, and follow their
//! nodes through [`AvlTree::swap`].
//!
//! ```
//! use linked_avl::AvlTree;
//!
//! let mut t = AvlTree::new();
//! for k in 5..=9 {
//!     t.insert(k, ());
//! }
//! assert_eq!(t.key(t.root()), Some(&6));
//!
//! let p = t.find(&6);
//! t.remove(&7);
//! assert_eq!(t.key(p), Some(&6));
//! assert_eq!(t.key(t.next(p)), Some(&8));
//! ```

mod avl;
pub use avl::{AvlMap, AvlSet, AvlTree};
pub use avl::{IntoIter, Iter, IterMut, NodeRef, Pos, SetIntoIter, SetIter};

mod error;
pub use error::{Error, Result};

#[cfg(feature = "serde")]
mod serde;
