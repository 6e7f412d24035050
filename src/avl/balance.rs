use super::pool::{Link, NodeId, Pool};
use tracing::trace;

impl<K, V> Pool<K, V> {
    /// Height of a subtree; an absent subtree has height -1.
    pub(crate) fn height(&self, link: Link) -> i8 {
        link.map_or(-1, |id| self[id].height)
    }

    /// Recomputes the height of `id` from its children.
    pub(crate) fn recompute(&mut self, id: NodeId) {
        let n = &self[id];
        let ht = self.height(n.left).max(self.height(n.right)) + 1;
        self[id].height = ht;
    }

    /// Returns the "balance factor" of the node: left height minus right
    /// height.
    pub(crate) fn balance(&self, id: NodeId) -> i8 {
        let n = &self[id];
        self.height(n.left) - self.height(n.right)
    }

    fn rotate_right(&mut self, a: NodeId) -> NodeId {
        // We want the following transformation:
        //    a(b(x, y), z)   =>   b(x, a(y, z))
        // x and z retain the same parents.
        let Some(b) = self[a].left else { return a };
        let y = self[b].right;
        let parent = self[a].parent;

        // move y from b to a
        self[a].left = y;
        if let Some(y) = y {
            self[y].parent = Some(a);
        }

        // move a into b
        self[b].right = Some(a);
        self[a].parent = Some(b);

        // install b where a used to hang
        self[b].parent = parent;
        if let Some(p) = parent {
            self.replace_child(p, a, Some(b));
        }

        self.recompute(a);
        self.recompute(b);
        b
    }

    fn rotate_left(&mut self, a: NodeId) -> NodeId {
        // We want the following transformation:
        //    a(x, b(y, z)))   =>   b(a(x, y), z)
        let Some(b) = self[a].right else { return a };
        let y = self[b].left;
        let parent = self[a].parent;

        self[a].right = y;
        if let Some(y) = y {
            self[y].parent = Some(a);
        }

        self[b].left = Some(a);
        self[a].parent = Some(b);

        self[b].parent = parent;
        if let Some(p) = parent {
            self.replace_child(p, a, Some(b));
        }

        self.recompute(a);
        self.recompute(b);
        b
    }

    /// Refreshes the height of `id` and, if its balance factor left
    /// [-1, 1], rotates to repair it.  Returns the root of the (possibly
    /// rotated) subtree, which has taken over `id`'s parent.
    pub(crate) fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.recompute(id);

        match self.balance(id) {
            2.. => {
                let lf = self[id].left;
                if let Some(lf) = lf.filter(|&lf| self.balance(lf) < 0) {
                    trace!(node = id, "rotate left-right");
                    self.rotate_left(lf);
                } else {
                    trace!(node = id, "rotate right");
                }
                self.rotate_right(id)
            }

            ..=-2 => {
                let rt = self[id].right;
                if let Some(rt) = rt.filter(|&rt| self.balance(rt) > 0) {
                    trace!(node = id, "rotate right-left");
                    self.rotate_right(rt);
                } else {
                    trace!(node = id, "rotate left");
                }
                self.rotate_left(id)
            }

            _ => id,
        }
    }
}
