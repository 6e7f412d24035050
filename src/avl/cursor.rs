use super::pool::{Link, Node, NodeId, Pool};
use super::AvlTree;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// A position in an [`AvlTree`]: either at an entry or at the end-marker
/// that sits one past the last entry.
///
/// Positions are detached handles.  They do not borrow the tree, so they can
/// be kept across mutations, and they are resolved against a tree by the
/// accessor methods ([`AvlTree::entry_at`], [`AvlTree::next`] and friends).
///
/// Two positions are equal when they refer to the same node, or when both
/// are end-markers.  Node identity survives rotations, [`AvlTree::swap`],
/// [`AvlTree::merge`] and moves of the whole tree, so a position taken from
/// one tree compares equal to, and reads the same entry as, the matching
/// position of whichever tree owns the node now.
///
/// A position whose node has been removed is stale: accessors treat it like
/// the end-marker.  In the one case where removal relocates an entry (a
/// removed node with two children takes over its in-order successor's
/// entry), a position on the removed key reads the successor afterwards.
pub struct Pos<K, V> {
    // slot hint and node identity
    link: Option<(NodeId, usize)>,
    marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Pos<K, V> {
    pub(crate) const END: Self = Pos {
        link: None,
        marker: PhantomData,
    };

    /// Returns true for the end-marker.
    pub fn is_end(&self) -> bool {
        self.link.is_none()
    }
}

impl<K, V> Clone for Pos<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Pos<K, V> {}

impl<K, V> PartialEq for Pos<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.link.map(|l| l.1) == other.link.map(|l| l.1)
    }
}

impl<K, V> Eq for Pos<K, V> {}

impl<K, V> Debug for Pos<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.link {
            None => f.write_str("Pos(END)"),
            Some((id, _)) => f.write_fmt(format_args!("Pos(#{id})")),
        }
    }
}

impl<K, V> Pool<K, V> {
    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(lf) = self[id].left {
            id = lf;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(rt) = self[id].right {
            id = rt;
        }
        id
    }

    /// The in-order successor of `id`, found through child and parent links.
    pub(crate) fn successor(&self, id: NodeId) -> Link {
        if let Some(rt) = self[id].right {
            return Some(self.leftmost(rt));
        }

        // climb until we arrive from a left child
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self[p].parent;
        }
        None
    }

    /// The in-order predecessor of `id`; mirror of `successor`.
    pub(crate) fn predecessor(&self, id: NodeId) -> Link {
        if let Some(lf) = self[id].left {
            return Some(self.rightmost(lf));
        }

        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].right == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self[p].parent;
        }
        None
    }
}

/// A read-only view of one node, exposing its entry and its place in the
/// tree's structure.
pub struct NodeRef<'a, K, V> {
    tree: &'a AvlTree<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    fn node(&self) -> &'a Node<K, V> {
        &self.tree.pool[self.id]
    }

    /// The node's key.
    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    /// The node's value.
    pub fn value(&self) -> &'a V {
        &self.node().val
    }

    /// Height of the subtree rooted here; a leaf has height 0.
    pub fn height(&self) -> i8 {
        self.node().height
    }

    /// Position of the left child, or the end-marker if there is none.
    pub fn left(&self) -> Pos<K, V> {
        self.tree.pos_of(self.node().left)
    }

    /// Position of the right child, or the end-marker if there is none.
    pub fn right(&self) -> Pos<K, V> {
        self.tree.pos_of(self.node().right)
    }

    /// Position of the parent, or the end-marker for the root.
    pub fn parent(&self) -> Pos<K, V> {
        self.tree.pos_of(self.node().parent)
    }

    /// Position of this node.
    pub fn pos(&self) -> Pos<K, V> {
        self.tree.pos_of(Some(self.id))
    }
}

impl<'a, K: Debug, V: Debug> Debug for NodeRef<'a, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}

impl<K, V> AvlTree<K, V> {
    pub(crate) fn pos_of(&self, link: Link) -> Pos<K, V> {
        Pos {
            link: link.and_then(|id| self.pool.identity(id).map(|p| (id, p))),
            marker: PhantomData,
        }
    }

    /// Maps a position back to a live slot of this tree.
    pub(crate) fn resolve(&self, pos: Pos<K, V>) -> Option<NodeId> {
        let (id, ident) = pos.link?;
        if self.pool.identity(id) == Some(ident) {
            return Some(id);
        }

        // the node changed slots when it was merged into this tree
        self.pool.slot_of(ident)
    }

    /// Position of the least entry, or the end-marker if the tree is empty.
    pub fn begin(&self) -> Pos<K, V> {
        self.pos_of(self.root.map(|r| self.pool.leftmost(r)))
    }

    /// The end-marker.
    pub fn end(&self) -> Pos<K, V> {
        Pos::END
    }

    /// Steps forward in key order.  Stepping from the last entry yields the
    /// end-marker, and the end-marker stays put.
    pub fn next(&self, pos: Pos<K, V>) -> Pos<K, V> {
        match self.resolve(pos) {
            Some(id) => self.pos_of(self.pool.successor(id)),
            None => Pos::END,
        }
    }

    /// Steps backward in key order.  Stepping back from the end-marker
    /// yields the greatest entry (if any); stepping back from the least
    /// entry yields the end-marker.
    pub fn prev(&self, pos: Pos<K, V>) -> Pos<K, V> {
        if pos.is_end() {
            return self.maximum();
        }

        match self.resolve(pos) {
            Some(id) => self.pos_of(self.pool.predecessor(id)),
            None => Pos::END,
        }
    }

    /// Position of the root node, or the end-marker if the tree is empty.
    pub fn root(&self) -> Pos<K, V> {
        self.pos_of(self.root)
    }

    /// Position of the least entry; the end-marker when empty.
    pub fn minimum(&self) -> Pos<K, V> {
        self.begin()
    }

    /// Position of the greatest entry; the end-marker when empty.
    pub fn maximum(&self) -> Pos<K, V> {
        self.pos_of(self.root.map(|r| self.pool.rightmost(r)))
    }

    /// A structural view of the node at `pos`.
    pub fn node(&self, pos: Pos<K, V>) -> Option<NodeRef<'_, K, V>> {
        self.resolve(pos).map(|id| NodeRef { tree: self, id })
    }

    /// The entry at `pos`, or `None` for the end-marker or a stale position.
    pub fn entry_at(&self, pos: Pos<K, V>) -> Option<(&K, &V)> {
        let n = &self.pool[self.resolve(pos)?];
        Some((&n.key, &n.val))
    }

    /// The entry at `pos`, with a mutable reference to the value.
    pub fn entry_at_mut(&mut self, pos: Pos<K, V>) -> Option<(&K, &mut V)> {
        let id = self.resolve(pos)?;
        let n = &mut self.pool[id];
        Some((&n.key, &mut n.val))
    }

    /// The key at `pos`.
    pub fn key(&self, pos: Pos<K, V>) -> Option<&K> {
        self.entry_at(pos).map(|e| e.0)
    }

    /// The value at `pos`.
    pub fn value(&self, pos: Pos<K, V>) -> Option<&V> {
        self.entry_at(pos).map(|e| e.1)
    }

    /// Creates an iterator over the entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use linked_avl::AvlTree;
    ///
    /// let t = AvlTree::from([(2, 'b'), (0, 'z'), (1, 'a')]);
    /// let keys: Vec<_> = t.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [0, 1, 2]);
    /// assert_eq!(t.iter().next_back(), Some((&2, &'b')));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            pool: &self.pool,
            front: self.root.map(|r| self.pool.leftmost(r)),
            back: self.root.map(|r| self.pool.rightmost(r)),
            len: self.len,
        }
    }

    /// Iterates over the entries in key order, with mutable references to
    /// the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let len = self.len;
        let ids = self.ids_in_order();
        let mut slots: Vec<_> = self.pool.slots_mut().collect();
        let nodes: Vec<_> =
            ids.into_iter().filter_map(|id| slots[id].take()).collect();
        IterMut {
            nodes: nodes.into_iter(),
            len,
        }
    }

    /// Produces an iterator over the keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values, ordered by their keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Mutable references to the values, ordered by their keys.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|p| p.1)
    }

    /// Applies `f` to every entry in key order.
    pub fn for_each_mut<F: FnMut((&K, &mut V))>(&mut self, mut f: F) {
        let mut curr = self.root.map(|r| self.pool.leftmost(r));
        while let Some(id) = curr {
            let n = &mut self.pool[id];
            f((&n.key, &mut n.val));
            curr = self.pool.successor(id);
        }
    }

    // slots in key order
    pub(crate) fn ids_in_order(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut curr = self.root.map(|r| self.pool.leftmost(r));
        while let Some(id) = curr {
            ids.push(id);
            curr = self.pool.successor(id);
        }
        ids
    }

    /// Empties the tree and returns its boxed nodes in key order.
    pub(crate) fn drain_nodes(&mut self) -> Vec<Box<Node<K, V>>> {
        let ids = self.ids_in_order();
        let nodes = ids.into_iter().map(|id| self.pool.release(id)).collect();
        self.pool.clear();
        self.root = None;
        self.len = 0;
        nodes
    }
}

/// Iterator over the entries of an [`AvlTree`], sorted by key.
pub struct Iter<'a, K, V> {
    pool: &'a Pool<K, V>,
    front: Link,
    back: Link,
    len: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            pool: self.pool,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let id = self.front?;
        self.len -= 1;
        self.front = self.pool.successor(id);
        let n = &self.pool[id];
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let id = self.back?;
        self.len -= 1;
        self.back = self.pool.predecessor(id);
        let n = &self.pool[id];
        Some((&n.key, &n.val))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Iterator over the entries of an [`AvlTree`] with mutable values.
pub struct IterMut<'a, K, V> {
    nodes: std::vec::IntoIter<&'a mut Node<K, V>>,
    len: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.nodes.next()?;
        self.len -= 1;
        Some((&n.key, &mut n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let n = self.nodes.next_back()?;
        self.len -= 1;
        Some((&n.key, &mut n.val))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// Owning iterator over the entries of an [`AvlTree`], sorted by key.
pub struct IntoIter<K, V> {
    nodes: std::vec::IntoIter<Box<Node<K, V>>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|n| (n.key, n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.nodes.next_back().map(|n| (n.key, n.val))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            nodes: self.drain_nodes().into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
