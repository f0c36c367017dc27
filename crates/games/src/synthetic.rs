//! The synthetic flip-rate tree.
//!
//! The tree is never materialized: a node is created the first time a
//! search asks for it and memoized in an append-only table, so a tree of
//! depth 10,000 costs only as much memory as the searches that visit it.

use pathology_core::{
    random_source, FlipRate, GameTree, PathologyError, PathologyProbe, RandomSource, Result, Side,
    StateId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{config::TreeConfig, heuristic::AnyHeuristic, snapshot, Heuristic, Node};

/// A lazily generated ±1 minimax tree.
///
/// Generation rule for the child of `(state, move)`, applied exactly once:
/// - forced node or optimal move: the child keeps the parent's value
/// - otherwise: the value flips with the parent's flip rate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    heuristic: Option<AnyHeuristic>,
    rng: RandomSource,
}

impl SyntheticTree {
    /// Create a tree holding only its root.
    ///
    /// # Errors
    /// Returns `PathologyError::InvalidConfig` if the config is invalid.
    pub fn new(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        let mut tree = Self {
            rng: random_source(config.seed),
            config,
            nodes: Vec::new(),
            heuristic: None,
        };
        let optimal_move = tree.draw_optimal_move();
        tree.nodes.push(Node::root(optimal_move));
        Ok(tree)
    }

    /// Attach the evaluator used for non-terminal nodes.
    pub fn set_heuristic(&mut self, heuristic: AnyHeuristic) {
        self.heuristic = Some(heuristic);
    }

    pub fn with_heuristic(mut self, heuristic: AnyHeuristic) -> Self {
        self.set_heuristic(heuristic);
        self
    }

    pub fn heuristic(&self) -> Option<&AnyHeuristic> {
        self.heuristic.as_ref()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn depth(&self) -> u32 {
        self.config.depth
    }

    pub fn flip_rate(&self) -> FlipRate {
        self.config.flip_rate
    }

    /// Number of nodes generated so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a generated node.
    pub fn node(&self, state: StateId) -> Result<&Node> {
        state
            .index()
            .and_then(|i| self.nodes.get(i))
            .ok_or(PathologyError::UnknownState(state))
    }

    /// Ground-truth value of every root move, generating the root's children.
    pub fn root_move_values(&mut self) -> Result<Vec<i8>> {
        (0..self.config.branching_factor)
            .map(|mv| self.root_child(mv).map(|child| self.nodes[child].minimax))
            .collect()
    }

    /// Returns true if `mv` at the root preserves MAX's win.
    pub fn is_optimal_root_move(&mut self, mv: usize) -> Result<bool> {
        let child = self.root_child(mv)?;
        Ok(self.nodes[child].minimax == 1)
    }

    /// Encode the full node table, heuristic and generator state.
    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        snapshot::encode(self)
    }

    /// Restore a tree produced by [`SyntheticTree::to_snapshot`].
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        let tree: Self = snapshot::decode(bytes)?;
        if tree.nodes.is_empty() {
            return Err(PathologyError::Snapshot("snapshot has no root".to_string()));
        }
        Ok(tree)
    }

    fn root_child(&mut self, mv: usize) -> Result<usize> {
        let child = self
            .get_new_state(StateId::ROOT, mv)?
            .ok_or_else(|| PathologyError::InvalidConfig("the root is terminal".to_string()))?;
        self.slot(child)
    }

    fn slot(&self, state: StateId) -> Result<usize> {
        state
            .index()
            .filter(|&i| i < self.nodes.len())
            .ok_or(PathologyError::UnknownState(state))
    }

    fn draw_optimal_move(&mut self) -> usize {
        if self.config.fixed {
            0
        } else {
            self.rng.gen_range(0..self.config.branching_factor)
        }
    }

    fn spawn_child(&mut self, parent: usize, mv: usize) -> Node {
        let (side, depth, minimax, choice, optimal_move, flip_rate, move_at_root) = {
            let p = &self.nodes[parent];
            (
                p.side,
                p.depth,
                p.minimax,
                p.is_choice_node(),
                p.optimal_move,
                p.flip_rate,
                p.move_at_root,
            )
        };

        let flip = choice && mv != optimal_move && self.rng.gen::<f64>() < flip_rate;
        let side = side.opposite();

        Node {
            side,
            depth: depth + 1,
            minimax: if flip { -minimax } else { minimax },
            optimal_move: self.draw_optimal_move(),
            flip_rate: self.config.flip_rate.for_side(side),
            children: Vec::new(),
            move_at_root: move_at_root.or(Some(mv)),
            heuristic: None,
        }
    }
}

impl GameTree for SyntheticTree {
    fn branching_factor(&self) -> usize {
        self.config.branching_factor
    }

    fn side(&self, state: StateId) -> Result<Side> {
        Ok(self.node(state)?.side)
    }

    fn is_terminal(&self, state: StateId) -> Result<bool> {
        Ok(self.node(state)?.depth == self.config.depth)
    }

    fn get_new_state(&mut self, state: StateId, mv: usize) -> Result<Option<StateId>> {
        if mv >= self.config.branching_factor {
            return Err(PathologyError::MoveOutOfRange {
                mv,
                branching_factor: self.config.branching_factor,
            });
        }
        let parent = self.slot(state)?;
        if self.nodes[parent].depth == self.config.depth {
            return Ok(None);
        }
        if let Some(child) = self.nodes[parent].child(mv) {
            return Ok(Some(child));
        }

        let node = self.spawn_child(parent, mv);
        let child = StateId::from_index(self.nodes.len());
        trace!(
            parent = %state,
            mv,
            child = %child,
            minimax = node.minimax,
            "created node"
        );
        self.nodes.push(node);
        self.nodes[parent].children.push((mv, child));
        Ok(Some(child))
    }

    fn get_eval(&mut self, state: StateId) -> Result<f64> {
        let slot = self.slot(state)?;
        if let Some(cached) = self.nodes[slot].heuristic {
            return Ok(cached);
        }

        let node = &self.nodes[slot];
        let value = if node.depth == self.config.depth {
            node.truth()
        } else {
            self.heuristic
                .as_mut()
                .ok_or(PathologyError::MissingHeuristic)?
                .evaluate(&self.config, node)
        };
        debug_assert!((0.0..=1.0).contains(&value), "evaluation {} out of range", value);

        self.nodes[slot].heuristic = Some(value);
        Ok(value)
    }
}

impl PathologyProbe for SyntheticTree {
    fn is_choice_state(&self, state: StateId) -> Result<bool> {
        Ok(self.node(state)?.is_choice_node())
    }

    fn is_pathological_move(&mut self, state: StateId, mv: usize) -> Result<bool> {
        if state == StateId::ROOT {
            return Err(PathologyError::ProbeOutOfDomain(
                "the root has no committed branch".to_string(),
            ));
        }
        if !self.config.flip_rate.is_adversarial() {
            return Err(PathologyError::ProbeOutOfDomain(
                "flip rates must both be 1".to_string(),
            ));
        }
        let node = self.node(state)?;
        if !node.is_choice_node() {
            return Err(PathologyError::ProbeOutOfDomain(format!(
                "{} is a forced node",
                state
            )));
        }
        let root_move = node
            .move_at_root
            .ok_or(PathologyError::UnknownState(state))?;

        // Sign of the branch committed to at the root.
        let branch = self.root_child(root_move)?;
        let branch_sign = self.nodes[branch].minimax;
        let child = self
            .get_new_state(state, mv)?
            .ok_or_else(|| PathologyError::ProbeOutOfDomain(format!("{} is terminal", state)))?;
        Ok(self.node(child)?.minimax != branch_sign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::PerfectHeuristic;

    fn fixed_tree(depth: u32) -> SyntheticTree {
        SyntheticTree::new(TreeConfig::new(2, depth).with_seed(1).fixed())
            .unwrap()
            .with_heuristic(PerfectHeuristic.into())
    }

    #[test]
    fn test_root() {
        let tree = fixed_tree(3);
        let root = tree.node(StateId::ROOT).unwrap();
        assert_eq!(root.minimax, 1);
        assert_eq!(root.side, Side::Max);
        assert_eq!(root.optimal_move, 0);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_ids_are_incremental_and_memoized() {
        let mut tree = fixed_tree(3);
        let a = tree.get_new_state(StateId::ROOT, 1).unwrap().unwrap();
        let b = tree.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert_eq!(a, StateId::new(2));
        assert_eq!(b, StateId::new(3));
        assert_eq!(tree.get_new_state(StateId::ROOT, 1).unwrap(), Some(a));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_move_out_of_range() {
        let mut tree = fixed_tree(3);
        let err = tree.get_new_state(StateId::ROOT, 2).unwrap_err();
        assert!(matches!(err, PathologyError::MoveOutOfRange { mv: 2, .. }));
    }

    #[test]
    fn test_unknown_state() {
        let mut tree = fixed_tree(3);
        assert!(tree.get_new_state(StateId::new(99), 0).is_err());
        assert!(tree.get_eval(StateId::new(0)).is_err());
    }

    #[test]
    fn test_terminal_has_no_successor() {
        let mut tree = fixed_tree(1);
        let leaf = tree.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert!(tree.is_terminal(leaf).unwrap());
        assert_eq!(tree.get_new_state(leaf, 0).unwrap(), None);
    }

    #[test]
    fn test_zero_depth_root_is_terminal() {
        let mut tree = fixed_tree(0);
        assert!(tree.is_terminal(StateId::ROOT).unwrap());
        assert_eq!(tree.get_eval(StateId::ROOT).unwrap(), 1.0);
    }

    #[test]
    fn test_fixed_adversarial_children() {
        // Flip rate 1 at the root: the optimal move keeps +1, the other flips.
        let mut tree = fixed_tree(4);
        assert_eq!(tree.root_move_values().unwrap(), vec![1, -1]);
        assert!(tree.is_optimal_root_move(0).unwrap());
        assert!(!tree.is_optimal_root_move(1).unwrap());
    }

    #[test]
    fn test_move_at_root_propagates() {
        let mut tree = fixed_tree(4);
        let a = tree.get_new_state(StateId::ROOT, 1).unwrap().unwrap();
        let b = tree.get_new_state(a, 0).unwrap().unwrap();
        let c = tree.get_new_state(b, 1).unwrap().unwrap();
        assert_eq!(tree.node(a).unwrap().move_at_root, Some(1));
        assert_eq!(tree.node(c).unwrap().move_at_root, Some(1));
        assert_eq!(tree.node(c).unwrap().depth, 3);
        assert_eq!(tree.node(c).unwrap().side, Side::Min);
    }

    #[test]
    fn test_eval_is_memoized() {
        let mut tree = fixed_tree(4);
        let a = tree.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert_eq!(tree.node(a).unwrap().heuristic, None);
        let first = tree.get_eval(a).unwrap();
        assert_eq!(tree.node(a).unwrap().heuristic, Some(first));
        assert_eq!(tree.get_eval(a).unwrap(), first);
    }

    #[test]
    fn test_missing_heuristic() {
        let mut tree = SyntheticTree::new(TreeConfig::new(2, 4).with_seed(3)).unwrap();
        let a = tree.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert!(matches!(
            tree.get_eval(a),
            Err(PathologyError::MissingHeuristic)
        ));
    }

    #[test]
    fn test_pathology_probe_preconditions() {
        let mut tree = fixed_tree(6);
        assert!(tree.is_pathological_move(StateId::ROOT, 0).is_err());

        // Move 1 at the root flips to -1, so MIN is winning at that child.
        let minus = tree.get_new_state(StateId::ROOT, 1).unwrap().unwrap();
        assert!(tree.is_choice_state(minus).unwrap());
        // Optimal move preserves the branch sign.
        assert!(!tree.is_pathological_move(minus, 0).unwrap());
        // The other move flips back to +1 with probability 1.
        assert!(tree.is_pathological_move(minus, 1).unwrap());

        let mut partial = SyntheticTree::new(
            TreeConfig::new(2, 6)
                .with_flip_rate(FlipRate::new(0.5, 0.5).unwrap())
                .with_seed(1),
        )
        .unwrap();
        let child = partial.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert!(matches!(
            partial.is_pathological_move(child, 0),
            Err(PathologyError::ProbeOutOfDomain(_))
        ));
    }

    #[test]
    fn test_probe_rejects_forced_node() {
        let mut tree = fixed_tree(6);
        // Root move 0 keeps +1 with MIN to move: a forced node.
        let plus = tree.get_new_state(StateId::ROOT, 0).unwrap().unwrap();
        assert!(!tree.is_choice_state(plus).unwrap());
        assert!(tree.is_pathological_move(plus, 0).is_err());
    }

    #[test]
    fn test_snapshot_restores_generation() {
        let mut tree = SyntheticTree::new(TreeConfig::new(3, 8).with_seed(11))
            .unwrap()
            .with_heuristic(PerfectHeuristic.into());
        tree.get_new_state(StateId::ROOT, 2).unwrap();

        let bytes = tree.to_snapshot().unwrap();
        let mut restored = SyntheticTree::from_snapshot(&bytes).unwrap();
        assert_eq!(restored.node_count(), tree.node_count());

        // Generator state travels with the snapshot: new nodes agree too.
        for mv in 0..3 {
            let a = tree.get_new_state(StateId::new(2), mv).unwrap().unwrap();
            let b = restored.get_new_state(StateId::new(2), mv).unwrap().unwrap();
            assert_eq!(a, b);
            assert_eq!(tree.node(a).unwrap().minimax, restored.node(b).unwrap().minimax);
            assert_eq!(
                tree.node(a).unwrap().optimal_move,
                restored.node(b).unwrap().optimal_move
            );
        }
    }
}
