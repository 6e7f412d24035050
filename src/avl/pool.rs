use std::ops::{Index, IndexMut};

/// Index of a node slot inside a [`Pool`].
pub(crate) type NodeId = usize;

/// A link to a child, a parent, or the root; `None` when absent.
pub(crate) type Link = Option<NodeId>;

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
    pub(crate) height: i8,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, val: V) -> Self {
        Node {
            key,
            val,
            height: 0,
            left: None,
            right: None,
            parent: None,
        }
    }

    // forget any structure from a previous home
    fn detach(&mut self) {
        self.height = 0;
        self.left = None;
        self.right = None;
        self.parent = None;
    }
}

/// Owns the nodes of one tree.
///
/// Nodes are boxed individually so that a node keeps its address for its
/// whole life.  Links between nodes are slot indices, which keeps the parent
/// back-references free of aliasing.  The address only serves as the node's
/// identity (see `Pos`); it is never dereferenced.
pub(crate) struct Pool<K, V> {
    slots: Vec<Option<Box<Node<K, V>>>>,
    free: Vec<NodeId>,
}

impl<K, V> Pool<K, V> {
    pub(crate) const fn new() -> Self {
        Pool {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Takes ownership of a boxed node and returns the slot it now occupies.
    /// Any links the node carried are reset.
    pub(crate) fn adopt(&mut self, mut node: Box<Node<K, V>>) -> NodeId {
        node.detach();
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }

            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Empties a slot and hands back its node.  Links held by other nodes
    /// are the caller's business.
    pub(crate) fn release(&mut self, id: NodeId) -> Box<Node<K, V>> {
        match self.slots.get_mut(id).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }

            None => panic!("Attempt to release an empty slot"),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id).and_then(Option::as_deref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id).and_then(Option::as_deref_mut)
    }

    /// The identity of the node in slot `id`, if the slot is occupied.
    pub(crate) fn identity(&self, id: NodeId) -> Option<usize> {
        self.get(id).map(address)
    }

    /// The slot holding the node with identity `ident`.  Linear in the
    /// number of slots.
    pub(crate) fn slot_of(&self, ident: usize) -> Option<NodeId> {
        self.slots
            .iter()
            .position(|s| s.as_deref().map(address) == Some(ident))
    }

    /// Number of occupied slots.
    pub(crate) fn occupied(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// One entry per slot, indexed like the slots themselves.
    pub(crate) fn slots_mut(
        &mut self,
    ) -> impl Iterator<Item = Option<&mut Node<K, V>>> {
        self.slots.iter_mut().map(|s| s.as_deref_mut())
    }

    /// Points the child link of `parent` that referred to `old` at `new`.
    pub(crate) fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: Link,
    ) {
        let p = &mut self[parent];
        if p.left == Some(old) {
            p.left = new;
        } else {
            debug_assert_eq!(p.right, Some(old));
            p.right = new;
        }
    }
}

// A node's identity is the address of its box.
fn address<K, V>(node: &Node<K, V>) -> usize {
    node as *const Node<K, V> as usize
}

impl<K, V> Default for Pool<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Slot-for-slot copy: links stay valid because indices are preserved, while
// every node gets a fresh box (and with it a fresh identity).
impl<K: Clone, V: Clone> Clone for Pool<K, V> {
    fn clone(&self) -> Self {
        Pool {
            slots: self
                .slots
                .iter()
                .map(|s| s.as_ref().map(|n| Box::new(Node::clone(n))))
                .collect(),
            free: self.free.clone(),
        }
    }
}

impl<K, V> Index<NodeId> for Pool<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.get(id) {
            Some(n) => n,
            None => panic!("Dangling node link {id}"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Pool<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.get_mut(id) {
            Some(n) => n,
            None => panic!("Dangling node link {id}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut pool = Pool::new();
        let a = pool.adopt(Box::new(Node::new(1, 'a')));
        let b = pool.adopt(Box::new(Node::new(2, 'b')));
        assert_eq!(pool.occupied(), 2);

        let node = pool.release(a);
        assert_eq!((node.key, node.val), (1, 'a'));
        assert!(pool.get(a).is_none());
        assert_eq!(pool.occupied(), 1);

        let c = pool.adopt(Box::new(Node::new(3, 'c')));
        assert_eq!(c, a);
        assert_eq!(pool[b].key, 2);
        assert_eq!(pool[c].key, 3);
    }

    #[test]
    fn adopt_keeps_the_box() {
        let mut donor = Pool::new();
        let id = donor.adopt(Box::new(Node::new(7, ())));
        donor[id].height = 3;
        donor[id].parent = Some(12);
        let before = donor.identity(id);

        let mut pool = Pool::new();
        let moved = pool.adopt(donor.release(id));
        assert_eq!(pool.identity(moved), before);
        assert_eq!(pool[moved].height, 0);
        assert_eq!(pool[moved].parent, None);
    }

    #[test]
    fn clone_gives_fresh_identities() {
        let mut pool = Pool::new();
        let id = pool.adopt(Box::new(Node::new("k", 1)));
        let copy = pool.clone();
        assert_eq!(copy[id].key, "k");
        assert_ne!(copy.identity(id), pool.identity(id));
    }

    #[test]
    fn identity_finds_its_slot() {
        let mut donor = Pool::new();
        let id = donor.adopt(Box::new(Node::new(7, ())));
        let ident = donor.identity(id).unwrap();
        assert_eq!(donor.slot_of(ident), Some(id));

        let mut pool = Pool::new();
        pool.adopt(Box::new(Node::new(1, ())));
        let moved = pool.adopt(donor.release(id));
        assert_ne!(moved, id);
        assert_eq!(pool.slot_of(ident), Some(moved));
        assert_eq!(donor.slot_of(ident), None);
    }
}
