//! Arena-allocated UCT search tree.

use crate::node::{NodeId, UctNode};

/// Search tree stored as a flat vector addressed by [`NodeId`].
///
/// Nodes are only ever appended; the tree is rebuilt from a fresh root at
/// the start of each search.
#[derive(Clone, Debug)]
pub struct UctTree {
    nodes: Vec<UctNode>,
}

impl UctTree {
    /// Create a tree holding only `root`.
    pub fn new(root: UctNode) -> Self {
        Self { nodes: vec![root] }
    }

    /// # Panics
    /// Panics if the NodeId did not come from this tree.
    pub fn get(&self, id: NodeId) -> &UctNode {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if the NodeId did not come from this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut UctNode {
        &mut self.nodes[id.0]
    }

    /// Append `node` as the child of `parent` reached by `mv`.
    pub fn add_child(&mut self, parent: NodeId, mv: usize, node: UctNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push((mv, id));
        id
    }

    pub fn root(&self) -> &UctNode {
        self.get(NodeId::ROOT)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node with its id.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &UctNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Utilities of the existing children of `id`.
    pub fn child_utilities(&self, id: NodeId) -> impl Iterator<Item = f64> + '_ {
        self.get(id)
            .children
            .iter()
            .map(move |(_, child)| self.get(*child).utility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathology_core::{Side, StateId};

    fn root() -> UctNode {
        UctNode::expanded(StateId::ROOT, Side::Max, 0.5)
    }

    #[test]
    fn test_tree_creation() {
        let tree = UctTree::new(root());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root().state, StateId::ROOT);
    }

    #[test]
    fn test_add_child_links_parent() {
        let mut tree = UctTree::new(root());
        let child = tree.add_child(
            NodeId::ROOT,
            1,
            UctNode::expanded(StateId::new(2), Side::Min, 1.0),
        );
        assert_eq!(child.index(), 1);
        assert_eq!(tree.root().child(1), Some(child));
        assert_eq!(tree.child_utilities(NodeId::ROOT).collect::<Vec<_>>(), vec![1.0]);
    }
}
