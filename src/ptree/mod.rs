//! Binary prefix tree keyed by variable-length bit strings.
//!
//! [PrefixTree] is a Patricia-style trie: nodes are only created for inserted
//! keys and for the branching points where two inserted keys diverge. It
//! serves both as a routing table (longest-prefix match over IP prefixes)
//! and as a counted set over arbitrary binary keys (AS path encodings up to
//! 64 x 32 = 2048 bits).
//!
//! Nodes live in an arena owned by the tree and are addressed by [NodeId].
//! Parent links are plain ids used for upward traversal only, so dropping a
//! tree never recurses regardless of its shape.
mod iter;
mod key;

#[cfg(test)]
mod tests;

pub use iter::Iter;
pub use key::{addr_key, check_bit, common_len, key_match, key_size, make_key, net_key, KeyBytes};

use std::collections::VecDeque;
use thiserror::Error;

/// Index of a node inside its owning [PrefixTree].
///
/// Ids stay valid until the node is removed or the tree is drained; a stale id
/// may later refer to a recycled node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node<T> {
    key: KeyBytes,
    keylen: u16,
    parent: Option<NodeId>,
    child: [Option<NodeId>; 2],
    data: Option<T>,
}

impl<T> Node<T> {
    fn new(key: &[u8], keylen: u16) -> Self {
        Node {
            key: make_key(key, keylen),
            keylen,
            parent: None,
            child: [None, None],
            data: None,
        }
    }

    /// Key bytes, `ceil(keylen / 8)` long with trailing bits zeroed.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn keylen(&self) -> u16 {
        self.keylen
    }

    /// Payload, `None` for pure branching nodes.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child on the side of bit value `bit` (0 or 1).
    pub fn child(&self, bit: usize) -> Option<NodeId> {
        self.child[bit & 1]
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RemoveError {
    #[error("node still carries a payload")]
    HasPayload,
    #[error("node is a branching point with two children")]
    Branching,
}

/// Binary prefix tree storing one optional payload per key.
#[derive(Debug, Clone)]
pub struct PrefixTree<T> {
    slots: Vec<Node<T>>,
    vacant: Vec<NodeId>,
    top: Option<NodeId>,
    len: usize,
}

impl<T> Default for PrefixTree<T> {
    fn default() -> Self {
        PrefixTree {
            slots: Vec::new(),
            vacant: Vec::new(),
            top: None,
            len: 0,
        }
    }
}

impl<T> PrefixTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes carrying a payload.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, branching nodes included.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.slots[id.0]
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.slots[id.0].data.as_ref()
    }

    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots[id.0].data.as_mut()
    }

    /// Clear the payload of a node, leaving the node itself in place.
    pub fn take_data(&mut self, id: NodeId) -> Option<T> {
        let data = self.slots[id.0].data.take();
        if data.is_some() {
            self.len -= 1;
        }
        data
    }

    fn alloc(&mut self, key: &[u8], keylen: u16) -> NodeId {
        let node = Node::new(key, keylen);
        match self.vacant.pop() {
            Some(id) => {
                self.slots[id.0] = node;
                id
            }
            None => {
                self.slots.push(node);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.slots[id.0];
        node.key.clear();
        node.keylen = 0;
        node.parent = None;
        node.child = [None, None];
        node.data = None;
        self.vacant.push(id);
    }

    /// Hang `w` below `v` on the side given by `w`'s bit just after `v`'s key.
    fn link(&mut self, v: NodeId, w: NodeId) {
        let bit = check_bit(&self.slots[w.0].key, self.slots[v.0].keylen);
        self.slots[v.0].child[bit] = Some(w);
        self.slots[w.0].parent = Some(v);
    }

    /// Find or create the node for exactly (`key`, `keylen`).
    fn get_node(&mut self, key: &[u8], keylen: u16) -> NodeId {
        let mut upper = None;
        let mut cursor = self.top;
        while let Some(x) = cursor {
            let node = &self.slots[x.0];
            if node.keylen > keylen || !key_match(&node.key, key, node.keylen) {
                break;
            }
            if node.keylen == keylen {
                return x;
            }
            upper = Some(x);
            cursor = node.child[check_bit(key, node.keylen)];
        }

        let Some(lower) = cursor else {
            let v = self.alloc(key, keylen);
            match upper {
                Some(u) => self.link(u, v),
                None => self.top = Some(v),
            }
            return v;
        };

        // `lower` diverges from the key (or extends past it): insert a node at
        // the common prefix between `upper` and `lower`.
        let branch_len = {
            let w = &self.slots[lower.0];
            common_len(key, keylen, &w.key, w.keylen)
        };
        let branch = self.alloc(key, branch_len);
        self.link(branch, lower);
        match upper {
            Some(u) => self.link(u, branch),
            None => self.top = Some(branch),
        }

        if branch_len == keylen {
            branch
        } else {
            let v = self.alloc(key, keylen);
            self.link(branch, v);
            v
        }
    }

    /// Store `data` under (`key`, `keylen`), replacing any previous payload of
    /// that exact key, and return its node.
    pub fn insert(&mut self, key: &[u8], keylen: u16, data: T) -> NodeId {
        let id = self.get_node(key, keylen);
        if self.slots[id.0].data.replace(data).is_none() {
            self.len += 1;
        }
        id
    }

    /// Node holding a payload under exactly (`key`, `keylen`).
    pub fn lookup_exact(&self, key: &[u8], keylen: u16) -> Option<NodeId> {
        self.lookup_longest_prefix(key, keylen)
            .filter(|id| self.slots[id.0].keylen == keylen)
    }

    /// Deepest payload-bearing node whose key is a prefix of the first
    /// `keylen` bits of `key`.
    pub fn lookup_longest_prefix(&self, key: &[u8], keylen: u16) -> Option<NodeId> {
        let mut matched = None;
        let mut cursor = self.top;
        while let Some(x) = cursor {
            let node = &self.slots[x.0];
            if node.keylen > keylen || !key_match(&node.key, key, node.keylen) {
                break;
            }
            if node.data.is_some() {
                matched = Some(x);
            }
            cursor = node.child[check_bit(key, node.keylen)];
        }
        matched
    }

    pub fn get(&self, key: &[u8], keylen: u16) -> Option<&T> {
        self.lookup_exact(key, keylen).and_then(|id| self.data(id))
    }

    pub fn get_mut(&mut self, key: &[u8], keylen: u16) -> Option<&mut T> {
        let id = self.lookup_exact(key, keylen)?;
        self.data_mut(id)
    }

    /// Remove a payload-less node with at most one child. A single child is
    /// re-linked to the removed node's parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), RemoveError> {
        let node = &self.slots[id.0];
        if node.data.is_some() {
            return Err(RemoveError::HasPayload);
        }
        let child = match node.child {
            [Some(_), Some(_)] => return Err(RemoveError::Branching),
            [Some(c), None] | [None, Some(c)] => Some(c),
            [None, None] => None,
        };

        match (node.parent, child) {
            (Some(parent), Some(child)) => self.link(parent, child),
            (Some(parent), None) => {
                let p = &mut self.slots[parent.0];
                if p.child[0] == Some(id) {
                    p.child[0] = None;
                } else {
                    p.child[1] = None;
                }
            }
            (None, child) => {
                self.top = child;
                if let Some(child) = child {
                    self.slots[child.0].parent = None;
                }
            }
        }

        self.release(id);
        Ok(())
    }

    /// First node in pre-order, the root.
    pub fn head(&self) -> Option<NodeId> {
        self.top
    }

    /// Pre-order successor of `id`: child 0, then child 1, then the nearest
    /// untraversed right sibling of an ancestor.
    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        let v = &self.slots[id.0];
        if let Some(c) = v.child[0] {
            return Some(c);
        }
        if let Some(c) = v.child[1] {
            return Some(c);
        }

        let mut u = v.parent?;
        if self.slots[u.0].child[0] == Some(id) {
            if let Some(w) = self.slots[u.0].child[1] {
                return Some(w);
            }
        }

        let mut t = self.slots[u.0].parent;
        while let Some(anc) = t {
            let anc_node = &self.slots[anc.0];
            match anc_node.child[1] {
                Some(right) if right != u => return Some(right),
                _ => {
                    u = anc;
                    t = anc_node.parent;
                }
            }
        }
        None
    }

    /// Pre-order iterator over all live nodes, branching nodes included.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Iterator over (node, payload) pairs in pre-order.
    pub fn values(&self) -> impl Iterator<Item = (&Node<T>, &T)> + '_ {
        self.iter()
            .filter_map(|(_, node)| node.data().map(|data| (node, data)))
    }

    /// Release every node and return the payloads in pre-order.
    ///
    /// Nodes are collected into a queue while walking, so the teardown uses
    /// constant stack depth for any tree shape. Arena storage is kept for
    /// reuse.
    pub fn drain(&mut self) -> Vec<T> {
        let mut queue = VecDeque::with_capacity(self.node_count());
        let mut payloads = Vec::with_capacity(self.len);

        let mut cursor = self.head();
        while let Some(x) = cursor {
            cursor = self.next_node(x);
            if let Some(data) = self.slots[x.0].data.take() {
                payloads.push(data);
            }
            queue.push_back(x);
        }

        while let Some(x) = queue.pop_front() {
            self.release(x);
        }
        self.top = None;
        self.len = 0;
        payloads
    }

    pub fn clear(&mut self) {
        self.drain();
    }
}
