//! UCT search-tree node types.
//!
//! The search tree is separate from the game tree: it only holds the nodes
//! that UCT has actually expanded, and refers back to the game tree by
//! [`StateId`].

use pathology_core::{Side, StateId};

/// Index into the search-tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the UCT search tree.
#[derive(Clone, Debug)]
pub struct UctNode {
    /// Game-tree state this node mirrors.
    pub state: StateId,

    /// Side to move at `state`.
    pub side: Side,

    /// Backed-up value in [0, 1], from MAX's point of view.
    pub utility: f64,

    pub visit_count: u32,

    /// Children: (move, node_id) pairs in expansion order.
    pub children: Vec<(usize, NodeId)>,
}

impl UctNode {
    /// A freshly expanded node, counted as visited once with its evaluation.
    pub fn expanded(state: StateId, side: Side, utility: f64) -> Self {
        Self {
            state,
            side,
            utility,
            visit_count: 1,
            children: Vec::new(),
        }
    }

    /// Search-tree child reached by `mv`, if it has been expanded.
    pub fn child(&self, mv: usize) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }

    pub fn is_fully_expanded(&self, branching_factor: usize) -> bool {
        self.children.len() == branching_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_node() {
        let node = UctNode::expanded(StateId::new(5), Side::Min, 0.25);
        assert_eq!(node.visit_count, 1);
        assert!((node.utility - 0.25).abs() < 1e-12);
        assert!(node.children.is_empty());
        assert_eq!(node.child(0), None);
    }

    #[test]
    fn test_child_lookup() {
        let mut node = UctNode::expanded(StateId::ROOT, Side::Max, 0.5);
        node.children.push((1, NodeId(3)));
        node.children.push((0, NodeId(4)));
        assert_eq!(node.child(0), Some(NodeId(4)));
        assert_eq!(node.child(1), Some(NodeId(3)));
        assert!(node.is_fully_expanded(2));
        assert!(!node.is_fully_expanded(3));
    }
}
