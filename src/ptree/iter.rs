use crate::ptree::{Node, NodeId, PrefixTree};

/// Pre-order traversal of a [PrefixTree]: parent before children, child 0
/// before child 1. Yields branching nodes too; filter on [Node::data] for
/// stored entries only.
pub struct Iter<'a, T> {
    tree: &'a PrefixTree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(tree: &'a PrefixTree<T>) -> Self {
        Iter {
            tree,
            next: tree.head(),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            next: self.next,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.next_node(id);
        Some((id, self.tree.node(id)))
    }
}

impl<'a, T> IntoIterator for &'a PrefixTree<T> {
    type Item = (NodeId, &'a Node<T>);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
