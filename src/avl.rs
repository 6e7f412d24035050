#![warn(missing_docs)]
use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::mem;
use tracing::debug;

mod avl_map;
mod avl_set;
mod balance;
mod cursor;
mod pool;

pub use avl_map::AvlMap;
pub use avl_set::{AvlSet, IntoIter as SetIntoIter, Iter as SetIter};
pub use cursor::{IntoIter, Iter, IterMut, NodeRef, Pos};

use pool::{Link, Node, NodeId, Pool};

/// An AVL tree of key-value entries sorted by key.
///
/// This is the engine behind [`AvlMap`] and [`AvlSet`].  [AVL
/// trees](https://en.wikipedia.org/wiki/AVL_tree) keep the heights of the two
/// subtrees of every node within one of each other, which bounds the depth of
/// the tree by roughly 1.44 log2(n).
///
/// Every node knows its parent, so the tree can be walked in either direction
/// from any [`Pos`] without auxiliary state.  Insertion and removal are
/// iterative: they record the ancestors visited on the way down and repair
/// heights and balance along that path on the way back up.
///
/// Keys are unique.  [`insert`](#method.insert) never overwrites a stored
/// value; the adapters layer "insert or assign" on top.
pub struct AvlTree<K, V> {
    pool: Pool<K, V>,
    root: Link,
    len: usize,
}

impl<K, V> AvlTree<K, V> {
    /// Creates a new, empty tree.
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    /// let t: AvlTree<usize, usize> = AvlTree::new();
    /// assert!(t.is_empty());
    /// assert!(t.begin() == t.end());
    /// ```
    pub const fn new() -> Self {
        AvlTree {
            pool: Pool::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all entries from the tree.
    pub fn clear(&mut self) {
        debug!(len = self.len, "clear");
        self.pool.clear();
        self.root = None;
        self.len = 0;
    }

    /// Moves the contents out of self, leaving self empty.
    ///
    /// The nodes keep their identities, so positions taken from self compare
    /// equal to positions into the returned tree.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Exchanges the contents of self and other in constant time.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let mut a = AvlTree::from([(1, 'a')]);
    /// let mut b = AvlTree::from([(2, 'b'), (3, 'c')]);
    /// let pa = a.begin();
    /// a.swap(&mut b);
    /// assert_eq!(a.len(), 2);
    /// assert!(b.begin() == pa);
    /// assert_eq!(b.key(pa), Some(&1));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the entry with the least key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.minimum())
    }

    /// Returns the entry with the greatest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.maximum())
    }

    // Collects the ancestors of `id`, root first.
    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut curr = self.pool[id].parent;
        while let Some(p) = curr {
            path.push(p);
            curr = self.pool[p].parent;
        }
        path.reverse();
        path
    }

    // Repairs heights and balance bottom-up along `path`.
    fn retrace(&mut self, path: &[NodeId]) {
        for &id in path.iter().rev() {
            let top = self.pool.rebalance(id);
            if self.pool[top].parent.is_none() {
                self.root = Some(top);
            }
        }
    }

    // Splices out a node with at most one child and returns it.  The caller
    // retraces.
    fn unlink(&mut self, id: NodeId) -> Box<Node<K, V>> {
        let n = &self.pool[id];
        debug_assert!(n.left.is_none() || n.right.is_none());
        let child = n.left.or(n.right);
        let parent = n.parent;

        if let Some(c) = child {
            self.pool[c].parent = parent;
        }

        match parent {
            Some(p) => self.pool.replace_child(p, id, child),
            None => self.root = child,
        }

        self.pool.release(id)
    }

    // Removes the entry held in `id`, whose ancestors are `path`.
    //
    // A node with two children stays in place: it takes over its successor's
    // entry and the successor's node is the one released.
    fn remove_at(&mut self, id: NodeId, mut path: Vec<NodeId>) -> (K, V) {
        let n = &self.pool[id];
        let removed = match (n.left, n.right) {
            (Some(_), Some(rt)) => {
                path.push(id);
                let mut succ = rt;
                while let Some(lf) = self.pool[succ].left {
                    path.push(succ);
                    succ = lf;
                }

                let mut node = self.unlink(succ);
                let target = &mut self.pool[id];
                mem::swap(&mut target.key, &mut node.key);
                mem::swap(&mut target.val, &mut node.val);
                node
            }

            _ => self.unlink(id),
        };

        self.len -= 1;
        self.retrace(&path);
        (removed.key, removed.val)
    }

    // Takes the node in `id` out of the tree together with its entry.  Unlike
    // `remove_at`, no entry changes nodes: with two children, the successor's
    // node moves into the vacated place.
    fn detach(&mut self, id: NodeId) -> Box<Node<K, V>> {
        let mut path = self.ancestors(id);
        let n = &self.pool[id];
        let (parent, height) = (n.parent, n.height);

        match (n.left, n.right) {
            (Some(lf), Some(rt)) => {
                // nodes between `rt` and the successor, top down
                let mut below = Vec::new();
                let mut succ = rt;
                while let Some(l) = self.pool[succ].left {
                    below.push(succ);
                    succ = l;
                }

                if let Some(&sp) = below.last() {
                    let sr = self.pool[succ].right;
                    self.pool[sp].left = sr;
                    if let Some(c) = sr {
                        self.pool[c].parent = Some(sp);
                    }
                    self.pool[succ].right = Some(rt);
                    self.pool[rt].parent = Some(succ);
                }

                self.pool[succ].left = Some(lf);
                self.pool[lf].parent = Some(succ);
                self.pool[succ].parent = parent;
                self.pool[succ].height = height;
                match parent {
                    Some(p) => self.pool.replace_child(p, id, Some(succ)),
                    None => self.root = Some(succ),
                }

                path.push(succ);
                path.extend(below);
                self.len -= 1;
                self.retrace(&path);
                self.pool.release(id)
            }

            _ => {
                let node = self.unlink(id);
                self.len -= 1;
                self.retrace(&path);
                node
            }
        }
    }

    /// Removes the entry at `pos` and returns the position of the entry that
    /// followed it.  Erasing the end-marker (or a stale position) does
    /// nothing and returns the end-marker.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let mut t = AvlTree::from([(1, ()), (2, ()), (3, ())]);
    /// let p = t.erase(t.begin());
    /// assert_eq!(t.key(p), Some(&2));
    /// assert_eq!(t.len(), 2);
    /// ```
    pub fn erase(&mut self, pos: Pos<K, V>) -> Pos<K, V> {
        let Some(id) = self.resolve(pos) else {
            return Pos::END;
        };

        let n = &self.pool[id];
        let next = if n.left.is_some() && n.right.is_some() {
            // the node survives and takes over its successor's entry
            pos
        } else {
            self.pos_of(self.pool.successor(id))
        };

        let path = self.ancestors(id);
        self.remove_at(id, path);
        next
    }

    /// Validates every structural invariant of the tree and returns the
    /// number of nodes found.
    ///
    /// The checks cover key order, stored heights, AVL balance, agreement
    /// of parent and child links, and the entry count.
    pub fn check(&self) -> Result<usize>
    where
        K: Ord,
    {
        if let Some(r) = self.root {
            let root = self
                .pool
                .get(r)
                .ok_or_else(|| {
                    Error::corrupt(format!("root #{r} is dangling"))
                })?;
            if root.parent.is_some() {
                return Err(Error::corrupt("root has a parent"));
            }
        }

        let (cnt, _) = self.check_subtree(self.root, None, None, None)?;
        if cnt != self.len {
            return Err(Error::corrupt(format!(
                "len is {} but {} nodes are reachable",
                self.len, cnt
            )));
        }

        if cnt != self.pool.occupied() {
            return Err(Error::corrupt(format!(
                "{} nodes are reachable but {} are stored",
                cnt,
                self.pool.occupied()
            )));
        }

        Ok(cnt)
    }

    // Returns the node count and height of the subtree at `link`.
    fn check_subtree<'a>(
        &'a self,
        link: Link,
        parent: Link,
        lo: Option<&'a K>,
        hi: Option<&'a K>,
    ) -> Result<(usize, i8)>
    where
        K: Ord,
    {
        let Some(id) = link else { return Ok((0, -1)) };
        let n = self
            .pool
            .get(id)
            .ok_or_else(|| {
                Error::corrupt(format!("link to empty slot #{id}"))
            })?;

        if n.parent != parent {
            return Err(Error::corrupt(format!(
                "node #{id} has a wrong parent"
            )));
        }

        if lo.is_some_and(|lo| lo >= &n.key)
            || hi.is_some_and(|hi| &n.key >= hi)
        {
            return Err(Error::corrupt(format!("node #{id} is out of order")));
        }

        let (lf_cnt, lf_ht) =
            self.check_subtree(n.left, link, lo, Some(&n.key))?;
        let (rt_cnt, rt_ht) =
            self.check_subtree(n.right, link, Some(&n.key), hi)?;

        let ht = lf_ht.max(rt_ht) + 1;
        if n.height != ht {
            return Err(Error::corrupt(format!(
                "node #{id} records height {} but has height {}",
                n.height, ht
            )));
        }

        if (lf_ht - rt_ht).abs() > 1 {
            return Err(Error::corrupt(format!("node #{id} is unbalanced")));
        }

        Ok((lf_cnt + 1 + rt_cnt, ht))
    }

    fn fmt_node(&self, id: NodeId, f: &mut Formatter<'_>) -> std::fmt::Result
    where
        K: Debug,
        V: Debug,
    {
        let n = &self.pool[id];
        f.write_fmt(format_args!(
            "(ht: {} {{{:?}: {:?}}} ",
            n.height, n.key, n.val
        ))?;

        match n.left {
            None => f.write_str(".")?,
            Some(lf) => self.fmt_node(lf, f)?,
        }

        f.write_str(" ")?;

        match n.right {
            None => f.write_str(".")?,
            Some(rt) => self.fmt_node(rt, f)?,
        }

        f.write_str(")")
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    // Descends towards `key`, recording the nodes visited.
    fn locate<Q>(&self, key: &Q) -> (Link, Vec<NodeId>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut path = Vec::new();
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.pool[id];
            match key.cmp(n.key.borrow()) {
                Less => curr = n.left,
                Equal => return (Some(id), path),
                Greater => curr = n.right,
            }
            path.push(id);
        }

        (None, path)
    }

    // Finds the node holding `key`, or else the path of nodes leading to the
    // empty slot where `key` belongs.
    fn vacancy(&self, key: &K) -> std::result::Result<NodeId, Vec<NodeId>> {
        match self.locate(key) {
            (Some(id), _) => Ok(id),
            (None, path) => Err(path),
        }
    }

    // Hangs `node` below the last node of `path` (or at the root) and repairs
    // the tree.  `path` must come from `vacancy` for the node's key.
    fn attach(&mut self, path: Vec<NodeId>, node: Box<Node<K, V>>) -> NodeId {
        let id = self.pool.adopt(node);
        match path.last() {
            None => self.root = Some(id),
            Some(&p) => {
                self.pool[id].parent = Some(p);
                if self.pool[id].key < self.pool[p].key {
                    self.pool[p].left = Some(id);
                } else {
                    self.pool[p].right = Some(id);
                }
            }
        }

        self.len += 1;
        self.retrace(&path);
        id
    }

    /// Inserts an entry unless the key is already present.
    ///
    /// Returns the position of the entry holding `key` and whether a new
    /// entry was created.  An existing entry is left untouched and `val` is
    /// dropped.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let mut t = AvlTree::new();
    /// let (p, inserted) = t.insert(1, "one");
    /// assert!(inserted);
    /// let (q, inserted) = t.insert(1, "uno");
    /// assert!(!inserted);
    /// assert!(p == q);
    /// assert_eq!(t.value(q), Some(&"one"));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> (Pos<K, V>, bool) {
        match self.vacancy(&key) {
            Ok(id) => (self.pos_of(Some(id)), false),
            Err(path) => {
                let id = self.attach(path, Box::new(Node::new(key, val)));
                (self.pos_of(Some(id)), true)
            }
        }
    }

    /// Removes the entry for `key` and returns it, if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.locate(key) {
            (Some(id), path) => Some(self.remove_at(id, path)),
            (None, _) => None,
        }
    }

    /// Returns the position of the entry for `key`, or the end-marker.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let t = AvlTree::from([(5, 'e'), (7, 'g')]);
    /// assert_eq!(t.value(t.find(&7)), Some(&'g'));
    /// assert!(t.find(&6) == t.end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Pos<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.pos_of(self.locate(key).0)
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).0.is_some()
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).0.map(|id| &self.pool[id].val)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.locate(key).0?;
        Some(&mut self.pool[id].val)
    }

    /// Moves every entry of `other` whose key is absent from self into self.
    ///
    /// Entries are transplanted, not cloned, and entries whose key self
    /// already holds stay where they are in `other`.  Positions held across
    /// the merge keep naming the same entries on both sides: a transplanted
    /// entry reads through self, a retained one through `other`.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let mut a = AvlTree::from([(1, "apple"), (5, "pear")]);
    /// let mut b = AvlTree::from([(2, "zorro"), (5, "X")]);
    /// let p2 = b.find(&2);
    /// a.merge(&mut b);
    /// assert_eq!(a.len(), 3);
    /// assert_eq!(a.get(&5), Some(&"pear"));
    /// assert_eq!(a.value(p2), Some(&"zorro"));
    /// assert_eq!(b.iter().collect::<Vec<_>>(), [(&5, &"X")]);
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        let mut moved = 0;

        // detaching leaves the slots of the other nodes alone
        for id in other.ids_in_order() {
            if let Err(path) = self.vacancy(&other.pool[id].key) {
                let node = other.detach(id);
                self.attach(path, node);
                moved += 1;
            }
        }

        debug!(moved, kept = other.len, "merge");
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        debug!(len = self.len, "deep copy");
        AvlTree {
            pool: self.pool.clone(),
            root: self.root,
            len: self.len,
        }
    }
}

impl<K: Debug, V: Debug> Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.root {
            None => f.write_str("AvlTree(EMPTY)"),
            Some(r) => {
                f.write_fmt(format_args!("AvlTree(#{}, ", self.len))?;
                self.fmt_node(r, f)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for AvlTree<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for AvlTree<K, V> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: std::hash::Hash, V: std::hash::Hash> std::hash::Hash for AvlTree<K, V> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for (k, v) in self.iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTree<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        AvlTree::from_iter(vs)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut t = AvlTree::new();
        t.extend(iter);
        t
    }
}

#[cfg(test)]
mod test {
    extern crate quickcheck;
    use super::*;
    use quickcheck::quickcheck;

    fn bal_test(vs: Vec<(u8, u32)>) {
        let mut t = AvlTree::new();
        for &(k, v) in vs.iter() {
            t.insert(k, v);
            println!("{:?}", t);
            assert_eq!(t.check(), Ok(t.len()));
        }
    }

    fn rm_test(vs: Vec<(i8, u32)>) {
        let mut t = AvlTree::new();
        let mut btree = std::collections::BTreeMap::new();

        for &(k, v) in vs.iter() {
            match k {
                1..=i8::MAX => {
                    let k = k % 32;
                    let inserted = t.insert(k, v).1;
                    assert_eq!(inserted, !btree.contains_key(&k));
                    btree.entry(k).or_insert(v);
                }

                0 | i8::MIN => (),

                _ => {
                    let k = -k % 32;
                    assert_eq!(t.remove(&k), btree.remove_entry(&k));
                }
            }

            assert!(t.iter().cmp(btree.iter()).is_eq());
            assert!(t.check().is_ok());
        }
    }

    // walks from end back to begin, then forward again
    fn walk_test(vs: Vec<u16>) {
        let t: AvlTree<_, _> = vs.iter().map(|&k| (k, ())).collect();
        let mut fwd = Vec::new();
        let mut p = t.begin();
        while p != t.end() {
            fwd.push(*t.key(p).unwrap());
            p = t.next(p);
        }

        let mut back = Vec::new();
        let mut p = t.prev(t.end());
        while p != t.end() {
            back.push(*t.key(p).unwrap());
            p = t.prev(p);
        }
        back.reverse();

        let mut expected = vs.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(fwd, expected);
        assert_eq!(back, expected);
    }

    // systematically try deleting each element of t
    fn chk_all_removes(t: AvlTree<u8, u8>) {
        for (k, v) in t.iter() {
            let mut t2 = t.clone();
            assert_eq!(t2.remove(k), Some((*k, *v)));
            assert!(t2.check().is_ok());
            assert!(t2.find(k) == t2.end());
        }
    }

    #[test]
    fn rm_each_test() {
        // build in order to encourage skewing
        let t: AvlTree<_, _> = (0..32).map(|x| (x, x + 100)).collect();
        chk_all_removes(t);

        // build in reverse order to encourage opposite skewing
        let t: AvlTree<_, _> = (0..32).rev().map(|x| (x, x + 100)).collect();
        chk_all_removes(t);
    }

    #[test]
    fn iter_mut_test() {
        let mut t: AvlTree<_, _> = (0..8).rev().map(|x| (x, 0)).collect();

        for (i, (k, v)) in t.iter_mut().enumerate() {
            assert_eq!(i, *k);
            assert_eq!(0, *v);
            *v = 1;
        }

        assert!(t.check().is_ok());

        for (i, (k, v)) in t.iter().enumerate() {
            assert_eq!(i, *k);
            assert_eq!(1, *v);
        }
    }

    fn bump_all<K>(t: &mut AvlTree<K, u32>) {
        for v in t.values_mut() {
            *v += 1;
        }
    }

    #[test]
    fn values_mut_follows_keys_not_slots() {
        let mut t: AvlTree<_, _> = (0..100).rev().map(|k| (k, k)).collect();
        t.remove(&50);
        t.insert(200, 0);
        bump_all(&mut t);

        let want = (0..100)
            .filter(|k| *k != 50)
            .map(|k| (k, k + 1))
            .chain([(200, 1)]);
        assert!(t.iter().map(|(k, v)| (*k, *v)).eq(want));
        assert_eq!(t.iter_mut().len(), 100);
    }

    #[test]
    fn for_each_mut_test() {
        let mut t: AvlTree<_, _> = (0..8).map(|x| (x, x)).collect();
        t.for_each_mut(|(k, v)| *v += k);
        assert!(t.values().copied().eq((0..8).map(|x| 2 * x)));
    }

    #[test]
    fn bal_test_regr1() {
        bal_test(vec![(4, 0), (0, 0), (5, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn bal_test_regr2() {
        bal_test(vec![(3, 0), (0, 0), (1, 0), (2, 0), (4, 0)]);
    }

    #[test]
    fn rm_test_regr1() {
        rm_test(vec![(101, 0), (100, 0), (1, 0), (-100, 0)]);
    }

    #[test]
    fn rm_test_regr2() {
        rm_test(vec![
            (31, 0),
            (14, 0),
            (1, 0),
            (15, 0),
            (32, 0),
            (16, 0),
            (17, 0),
            (-14, 0),
            (-31, 0),
        ]);
    }

    #[test]
    fn iter_len_test() {
        let t: AvlTree<_, _> = (0..10).map(|i| (i, ())).collect();

        let mut iter = t.iter();
        let mut cnt = 10;
        while iter.next().is_some() {
            assert_eq!(iter.len(), cnt - 1);
            cnt -= 1;
        }
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let t: AvlTree<_, _> = (0..5).map(|i| (i, ())).collect();
        let mut iter = t.iter();
        assert_eq!(iter.next().map(|e| *e.0), Some(0));
        assert_eq!(iter.next_back().map(|e| *e.0), Some(4));
        assert_eq!(iter.len(), 3);
        let rest: Vec<_> = iter.map(|e| *e.0).collect();
        assert_eq!(rest, [1, 2, 3]);
    }

    #[test]
    fn erase_two_children_keeps_position() {
        let mut t: AvlTree<_, _> = (1..=7).map(|i| (i, i * 10)).collect();
        let root = t.root();
        assert_eq!(t.key(root), Some(&4));

        let next = t.erase(root);
        assert!(next == root);
        assert_eq!(t.entry_at(next), Some((&5, &50)));
        assert_eq!(t.len(), 6);
        assert!(t.check().is_ok());
    }

    #[test]
    fn erase_leaf_returns_successor() {
        let mut t: AvlTree<_, _> = (1..=3).map(|i| (i, ())).collect();
        let p = t.find(&1);
        let next = t.erase(p);
        assert_eq!(t.key(next), Some(&2));
        assert_eq!(t.key(p), None);
        assert!(t.erase(t.end()) == t.end());
    }

    #[test]
    fn stale_position_reads_nothing() {
        let mut t: AvlTree<_, _> = (1..=3).map(|i| (i, ())).collect();
        let p = t.find(&3);
        t.remove(&3);
        assert!(t.entry_at(p).is_none());
        assert!(t.next(p) == t.end());
        assert!(t.node(p).is_none());
    }

    #[test]
    fn detach_moves_nodes_not_entries() {
        let mut t: AvlTree<_, _> = (1..=7).map(|i| (i, i * 10)).collect();
        let held: Vec<_> = (1..=7).map(|k| t.find(&k)).collect();
        let root = t.root.unwrap();

        let node = t.detach(root);
        assert_eq!((node.key, node.val), (4, 40));
        assert_eq!(t.check(), Ok(6));
        assert_eq!(t.key(t.root()), Some(&5));
        assert!(t.root() == held[4]);

        for (k, p) in (1..=7).zip(held) {
            let want = (k != 4).then_some(k * 10);
            assert_eq!(t.value(p).copied(), want);
        }
    }

    #[test]
    fn detach_deep_successor() {
        let mut t: AvlTree<_, _> = (0..32).map(|i| (i, ())).collect();
        let root = t.root.unwrap();
        let k = t.pool[root].key;
        let succ = t.find(&(k + 1));

        t.detach(root);
        assert_eq!(t.check(), Ok(31));
        assert!(t.root() == succ);
        assert!(t.find(&k) == t.end());
    }

    #[test]
    fn check_reports_bad_height() {
        let mut t: AvlTree<_, _> = (1..=3).map(|i| (i, ())).collect();
        let r = t.root.unwrap();
        t.pool[r].height = 5;
        assert!(matches!(t.check(), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn check_reports_bad_parent() {
        let mut t: AvlTree<_, _> = (1..=3).map(|i| (i, ())).collect();
        let lf = t.pool[t.root.unwrap()].left.unwrap();
        t.pool[lf].parent = None;
        assert!(matches!(t.check(), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn clone_is_independent() {
        let t: AvlTree<_, _> = (0..16).map(|i| (i, i)).collect();
        let mut u = t.clone();
        assert_eq!(t, u);
        assert!(t.begin() != u.begin());

        *u.get_mut(&3).unwrap() = 99;
        u.remove(&4);
        assert_eq!(t.get(&3), Some(&3));
        assert_eq!(t.len(), 16);
        assert!(u.check().is_ok());
    }

    #[test]
    fn debug_shows_structure() {
        let t = AvlTree::from([(2, 'b'), (1, 'a')]);
        assert_eq!(
            format!("{:?}", t),
            "AvlTree(#2, (ht: 1 {2: 'b'} (ht: 0 {1: 'a'} . .) .))"
        );
        assert_eq!(format!("{:?}", AvlTree::<u8, u8>::new()), "AvlTree(EMPTY)");
    }

    quickcheck! {
        fn qc_bal_test(vs: Vec<(u8, u32)>) -> () {
            bal_test(vs);
        }

        fn qc_rm_test(vs: Vec<(i8, u32)>) -> () {
            rm_test(vs);
        }

        fn qc_walk_test(vs: Vec<u16>) -> () {
            walk_test(vs);
        }

        fn qc_merge_test(v1: Vec<(u8, u8)>, v2: Vec<(u8, u8)>) -> () {
            let mut a: AvlTree<_, _> = v1.iter().copied().collect();
            let mut b: AvlTree<_, _> = v2.iter().copied().collect();
            let total = a.len() + b.len();
            let a0 = a.clone();
            let b0 = b.clone();
            let held: Vec<_> = b.keys().map(|&k| (k, b.find(&k))).collect();

            a.merge(&mut b);
            assert!(a.check().is_ok());
            assert!(b.check().is_ok());
            assert_eq!(a.len() + b.len(), total);
            for (k, v) in a0.iter() {
                assert_eq!(a.get(k), Some(v));
            }
            for (k, v) in b0.iter() {
                assert!(a.contains(k));
                assert_eq!(b.get(k).is_some(), a0.contains(k));
                if let Some(bv) = b.get(k) {
                    assert_eq!(bv, v);
                }
            }
            for (k, p) in held {
                let owner = if a0.contains(&k) { &b } else { &a };
                assert_eq!(owner.key(p), Some(&k));
                assert!(owner.find(&k) == p);
            }
        }
    }
}
