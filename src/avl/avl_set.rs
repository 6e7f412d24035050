use super::pool::Node;
use super::{AvlTree, IntoIter as TreeIntoIter, Iter as TreeIter, Pos};
use crate::error::Result;
use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// A sorted set of values.
///
/// The implementation is a thin wrapper around an [`AvlTree`] with unit
/// values.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AvlSet<T> {
    tree: AvlTree<T, ()>,
}

impl<T> AvlSet<T> {
    /// Creates a new, empty set.
    pub const fn new() -> Self {
        AvlSet {
            tree: AvlTree::new(),
        }
    }

    /// Removes all the entries from self.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Tests if self is the empty set.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The largest number of elements a set could hold on this platform.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / std::mem::size_of::<Node<T, ()>>().max(1)
    }

    /// Exchanges the contents of self and other.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns the least value in the set.
    pub fn first(&self) -> Option<&T> {
        self.tree.first_key_value().map(|(k, _)| k)
    }

    /// Returns the greatest value in the set.
    pub fn last(&self) -> Option<&T> {
        self.tree.last_key_value().map(|(k, _)| k)
    }

    /// Position of the least value; the end-marker when empty.
    pub fn begin(&self) -> Pos<T, ()> {
        self.tree.begin()
    }

    /// The end-marker.
    pub fn end(&self) -> Pos<T, ()> {
        self.tree.end()
    }

    /// Steps forward in order.
    pub fn next(&self, pos: Pos<T, ()>) -> Pos<T, ()> {
        self.tree.next(pos)
    }

    /// Steps backward in order.
    pub fn prev(&self, pos: Pos<T, ()>) -> Pos<T, ()> {
        self.tree.prev(pos)
    }

    /// The value at `pos`.
    pub fn get(&self, pos: Pos<T, ()>) -> Option<&T> {
        self.tree.key(pos)
    }

    /// Removes the value at `pos`; returns the position that followed it.
    pub fn erase(&mut self, pos: Pos<T, ()>) -> Pos<T, ()> {
        self.tree.erase(pos)
    }

    /// Returns an iterator over the set's values, in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.tree.iter(),
        }
    }
}

impl<T: Ord> AvlSet<T> {
    /// Inserts the given value.  Returns the position of the matching
    /// element and whether the value was newly added.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlSet;
    ///
    /// let mut s = AvlSet::new();
    /// assert!(s.insert(3).1);
    /// let (p, added) = s.insert(3);
    /// assert!(!added);
    /// assert_eq!(s.get(p), Some(&3));
    /// ```
    pub fn insert(&mut self, value: T) -> (Pos<T, ()>, bool) {
        self.tree.insert(value, ())
    }

    /// Removes `value` from the set.  Returns true if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(value).is_some()
    }

    /// Returns the position of `value`, or the end-marker.
    pub fn find<Q>(&self, value: &Q) -> Pos<T, ()>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(value)
    }

    /// Tests if self contains the given value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(value)
    }

    /// Moves the values of `other` that self lacks into self.  Values that
    /// self already holds stay in `other`.
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree);
    }

    /// Validates the set's internal structure; see [`AvlTree::check`].
    pub fn check(&self) -> Result<usize> {
        self.tree.check()
    }
}

impl<T: Debug> Debug for AvlSet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for AvlSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the values of an [`AvlSet`], in sorted order.
pub struct Iter<'a, T> {
    inner: TreeIter<'a, T, ()>,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

/// Owning iterator over the values of an [`AvlSet`], in sorted order.
pub struct IntoIter<T> {
    inner: TreeIntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for AvlSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.tree.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> Extend<T> for AvlSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend(iter.into_iter().map(|x| (x, ())));
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlSet<T> {
    fn from(vs: [T; N]) -> Self {
        AvlSet::from_iter(vs)
    }
}

impl<T: Ord> FromIterator<T> for AvlSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = AvlSet::new();
        s.extend(iter);
        s
    }
}
