//! Backpropagation strategies for UCT.
//!
//! The UCT driver walks the selected path bottom-up and hands every node to a
//! [`Backpropagation`] strategy, so the classic averaging rule and the
//! minimax rule share one traversal.

use pathology_core::Side;

use crate::node::NodeId;
use crate::tree::UctTree;

/// Update one node of the search tree with an iteration's result.
pub trait Backpropagation {
    /// Called once per node on the path, leaf first. Must count the visit.
    fn update(&self, tree: &mut UctTree, id: NodeId, result: f64);
}

/// Incremental mean of all results seen through a node.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanBackup;

impl Backpropagation for MeanBackup {
    fn update(&self, tree: &mut UctTree, id: NodeId, result: f64) {
        let node = tree.get_mut(id);
        node.visit_count += 1;
        node.utility += (result - node.utility) / node.visit_count as f64;
    }
}

/// Utility is the best child utility for the side to move.
///
/// Nodes without children (terminal leaves) keep their evaluation and only
/// count the visit.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimaxBackup;

impl Backpropagation for MinimaxBackup {
    fn update(&self, tree: &mut UctTree, id: NodeId, _result: f64) {
        let side = tree.get(id).side;
        let mut utilities = tree.child_utilities(id);
        let best = utilities.next().map(|first| {
            utilities.fold(first, |best, u| match side {
                Side::Max => best.max(u),
                Side::Min => best.min(u),
            })
        });

        let node = tree.get_mut(id);
        node.visit_count += 1;
        if let Some(best) = best {
            node.utility = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::UctNode;
    use pathology_core::StateId;

    fn tree_with_children(side: Side, utilities: &[f64]) -> UctTree {
        let mut tree = UctTree::new(UctNode::expanded(StateId::ROOT, side, 0.5));
        for (mv, &u) in utilities.iter().enumerate() {
            let child = UctNode::expanded(StateId::new(mv as u32 + 2), side.opposite(), u);
            tree.add_child(NodeId::ROOT, mv, child);
        }
        tree
    }

    #[test]
    fn test_mean_backup_averages() {
        let mut tree = tree_with_children(Side::Max, &[]);
        MeanBackup.update(&mut tree, NodeId::ROOT, 1.0);
        assert_eq!(tree.root().visit_count, 2);
        assert!((tree.root().utility - 0.75).abs() < 1e-12);
        MeanBackup.update(&mut tree, NodeId::ROOT, 0.0);
        assert!((tree.root().utility - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_minimax_backup_max_node() {
        let mut tree = tree_with_children(Side::Max, &[0.2, 0.9, 0.4]);
        MinimaxBackup.update(&mut tree, NodeId::ROOT, 0.0);
        assert_eq!(tree.root().utility, 0.9);
        assert_eq!(tree.root().visit_count, 2);
    }

    #[test]
    fn test_minimax_backup_min_node() {
        let mut tree = tree_with_children(Side::Min, &[0.2, 0.9, 0.4]);
        MinimaxBackup.update(&mut tree, NodeId::ROOT, 1.0);
        assert_eq!(tree.root().utility, 0.2);
    }

    #[test]
    fn test_minimax_backup_leaf_keeps_value() {
        let mut tree = tree_with_children(Side::Max, &[]);
        MinimaxBackup.update(&mut tree, NodeId::ROOT, 1.0);
        assert_eq!(tree.root().utility, 0.5);
        assert_eq!(tree.root().visit_count, 2);
    }
}
