//! Node storage for the synthetic tree.
//!
//! Nodes live in a flat table addressed by `StateId`; parents only hold
//! forward links to children, so the table never needs back-references.

use pathology_core::{Side, StateId};
use serde::{Deserialize, Serialize};

/// A node of the synthetic tree.
///
/// Every field except `heuristic` and `children` is fixed at creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Side to move.
    pub side: Side,

    /// Distance from the root.
    pub depth: u32,

    /// Ground-truth value, always +1 or -1 (MAX's perspective).
    pub minimax: i8,

    /// Move that preserves `minimax` for the side to move.
    pub optimal_move: usize,

    /// Probability that a non-optimal move flips `minimax`.
    pub flip_rate: f64,

    /// Children created so far: (move, state) pairs.
    pub children: Vec<(usize, StateId)>,

    /// First move taken from the root on the way here (None for root).
    pub move_at_root: Option<usize>,

    /// Cached evaluation, filled on first request.
    pub heuristic: Option<f64>,
}

impl Node {
    /// Create the root node, MAX to move and winning.
    pub fn root(optimal_move: usize) -> Self {
        Self {
            side: Side::Max,
            depth: 0,
            minimax: 1,
            optimal_move,
            flip_rate: 1.0,
            children: Vec::new(),
            move_at_root: None,
            heuristic: None,
        }
    }

    /// The side to move holds the winning value and can squander it.
    pub fn is_choice_node(&self) -> bool {
        self.minimax == self.side.sign()
    }

    /// Ground truth as a 0/1 win indicator for MAX.
    pub fn truth(&self) -> f64 {
        if self.minimax > 0 {
            1.0
        } else {
            0.0
        }
    }

    /// Child reached by `mv`, if it was generated already.
    pub fn child(&self, mv: usize) -> Option<StateId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let root = Node::root(1);
        assert_eq!(root.side, Side::Max);
        assert_eq!(root.minimax, 1);
        assert!(root.is_choice_node());
        assert_eq!(root.truth(), 1.0);
        assert_eq!(root.move_at_root, None);
    }

    #[test]
    fn test_forced_node() {
        let mut node = Node::root(0);
        node.side = Side::Min;
        assert!(!node.is_choice_node());
        node.minimax = -1;
        assert!(node.is_choice_node());
        assert_eq!(node.truth(), 0.0);
    }

    #[test]
    fn test_child_lookup() {
        let mut node = Node::root(0);
        node.children.push((1, StateId::new(2)));
        assert_eq!(node.child(1), Some(StateId::new(2)));
        assert_eq!(node.child(0), None);
    }
}
