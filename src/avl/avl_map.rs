use super::pool::Node;
use super::{AvlTree, IntoIter, Iter, Pos};
use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};

/// A map from keys to values sorted by key.
///
/// We aim for the API to be close to the (stable) API of
/// [`std::collections::BTreeMap`], plus the position-based operations of
/// [`AvlTree`], which the map wraps.
///
/// # Examples
/// ```
/// use linked_avl::AvlMap;
///
/// let mut m = AvlMap::from([(1, "one"), (3, "three")]);
/// m.insert_or_assign(3, "drei");
/// *m.get_or_insert_default(2) = "two";
/// assert_eq!(m.values().copied().collect::<Vec<_>>(), ["one", "two", "drei"]);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AvlMap<K, V> {
    tree: AvlTree<K, V>,
}

impl<K, V> AvlMap<K, V> {
    /// Creates a new, empty map.
    /// # Examples
    /// ```
    /// use linked_avl::AvlMap;
    /// let m: AvlMap<usize, usize> = AvlMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub const fn new() -> Self {
        AvlMap {
            tree: AvlTree::new(),
        }
    }

    /// Drops all elements from the map.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The largest number of entries a map could hold on this platform.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / std::mem::size_of::<Node<K, V>>().max(1)
    }

    /// Exchanges the contents of self and other.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Position of the least entry; the end-marker when empty.
    pub fn begin(&self) -> Pos<K, V> {
        self.tree.begin()
    }

    /// The end-marker.
    pub fn end(&self) -> Pos<K, V> {
        self.tree.end()
    }

    /// Steps forward in key order.
    pub fn next(&self, pos: Pos<K, V>) -> Pos<K, V> {
        self.tree.next(pos)
    }

    /// Steps backward in key order; from the end-marker this yields the
    /// greatest entry.
    pub fn prev(&self, pos: Pos<K, V>) -> Pos<K, V> {
        self.tree.prev(pos)
    }

    /// The entry at `pos`.
    pub fn entry_at(&self, pos: Pos<K, V>) -> Option<(&K, &V)> {
        self.tree.entry_at(pos)
    }

    /// The entry at `pos`, with a mutable value.
    pub fn entry_at_mut(&mut self, pos: Pos<K, V>) -> Option<(&K, &mut V)> {
        self.tree.entry_at_mut(pos)
    }

    /// Removes the entry at `pos`; returns the position that followed it.
    pub fn erase(&mut self, pos: Pos<K, V>) -> Pos<K, V> {
        self.tree.erase(pos)
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(0,1), (1,2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i+1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.tree.keys()
    }

    /// Produces an iterator over the values of the map, ordered by key.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.tree.values()
    }

    /// Mutable references to the values, ordered by key.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.tree.values_mut()
    }

    /// Returns the key-value pair for the least key in the map
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(m.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first_key_value()
    }

    /// Returns the key-value pair for the greatest key in the map
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last_key_value()
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Returns a reference to the value for `key`, or
    /// [`Error::KeyNotFound`].
    ///
    /// # Examples
    /// ```
    /// use linked_avl::{AvlMap, Error};
    ///
    /// let m = AvlMap::from([(1, 'a')]);
    /// assert_eq!(m.at(&1), Ok(&'a'));
    /// assert_eq!(m.at(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, or
    /// [`Error::KeyNotFound`].
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key`, first inserting `V::default()` if the
    /// key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (pos, _) = self.tree.insert(key, V::default());
        match self.tree.entry_at_mut(pos) {
            Some((_, v)) => v,
            None => panic!("Inserted entry has no position"),
        }
    }

    /// Inserts an entry unless `key` is present.  Returns the position of the
    /// entry for `key` and whether it was newly inserted; an existing value
    /// is kept.
    pub fn insert(&mut self, key: K, val: V) -> (Pos<K, V>, bool) {
        self.tree.insert(key, val)
    }

    /// [`insert`](#method.insert) taking the entry as a pair.
    pub fn insert_pair(&mut self, (key, val): (K, V)) -> (Pos<K, V>, bool) {
        self.tree.insert(key, val)
    }

    /// Inserts an entry, overwriting the value of an existing one.  Returns
    /// the position of the entry and whether it was newly inserted.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlMap;
    ///
    /// let mut m = AvlMap::from([(1, 'a')]);
    /// let (p, inserted) = m.insert_or_assign(1, 'b');
    /// assert!(!inserted);
    /// assert_eq!(m.entry_at(p), Some((&1, &'b')));
    /// ```
    pub fn insert_or_assign(&mut self, key: K, val: V) -> (Pos<K, V>, bool) {
        match self.tree.vacancy(&key) {
            Ok(id) => {
                self.tree.pool[id].val = val;
                (self.tree.pos_of(Some(id)), false)
            }

            Err(path) => {
                let id = self.tree.attach(path, Box::new(Node::new(key, val)));
                (self.tree.pos_of(Some(id)), true)
            }
        }
    }

    /// Removes the entry for `key` and returns its value, if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).map(|(_, v)| v)
    }

    /// Returns the position of the entry for `key`, or the end-marker.
    pub fn find<Q>(&self, key: &Q) -> Pos<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key)
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(key)
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Moves the entries of `other` with keys absent from self into self.
    /// The rest stay in `other`.
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree);
    }

    /// Validates the map's internal structure; see [`AvlTree::check`].
    pub fn check(&self) -> Result<usize> {
        self.tree.check()
    }
}

impl<K: Debug, V: Debug> Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, Q, V> std::ops::Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlMap"),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.tree.extend(iter);
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        AvlMap::from_iter(vs)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        AvlMap {
            tree: AvlTree::from_iter(iter),
        }
    }
}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn at_reports_missing_key() {
        let mut m = AvlMap::from([(1, String::from("one"))]);
        assert_eq!(m.at(&1).map(String::as_str), Ok("one"));
        assert_eq!(m.at(&2), Err(Error::KeyNotFound));

        m.at_mut(&1).unwrap().push('!');
        assert_eq!(m[&1], "one!");
        assert!(m.at_mut(&7).is_err());
    }

    #[test]
    #[should_panic(expected = "Key not found in AvlMap")]
    fn index_panics_on_missing_key() {
        let m = AvlMap::from([(1, 1)]);
        let _ = m[&2];
    }

    #[test]
    fn get_or_insert_default_test() {
        let mut m: AvlMap<&str, usize> = AvlMap::new();
        for w in "a b a c a b".split(' ') {
            *m.get_or_insert_default(w) += 1;
        }
        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            [(&"a", &3), (&"b", &2), (&"c", &1)]
        );
    }

    #[test]
    fn insert_keeps_insert_or_assign_overwrites() {
        let mut m = AvlMap::new();
        assert!(m.insert(5, 'x').1);
        let (p, inserted) = m.insert(5, 'y');
        assert!(!inserted);
        assert_eq!(m.entry_at(p), Some((&5, &'x')));

        let (q, inserted) = m.insert_or_assign(5, 'z');
        assert!(!inserted);
        assert!(p == q);
        assert_eq!(m[&5], 'z');

        let (_, inserted) = m.insert_or_assign(6, 'w');
        assert!(inserted);
        assert!(m.insert_pair((7, 'v')).1);
        assert_eq!(m.len(), 3);
        assert_eq!(m.check(), Ok(3));
    }

    #[test]
    fn debug_is_a_map() {
        let m = AvlMap::from([(2, 'b'), (1, 'a')]);
        assert_eq!(format!("{:?}", m), "{1: 'a', 2: 'b'}");
    }

    #[test]
    fn max_size_is_positive() {
        let m: AvlMap<u64, u64> = AvlMap::new();
        assert!(m.max_size() > 0);
        assert!(m.max_size() < isize::MAX as usize);
    }
}
