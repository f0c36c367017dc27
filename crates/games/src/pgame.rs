//! Pearl's P-game.
//!
//! A uniform tree built eagerly, bottom-up: leaves are won independently
//! with a fixed probability and internal nodes take the minimax of their
//! children. Ids follow heap order, so the child of `(state, move)` is
//! computed rather than stored:
//!
//! ```text
//! child = state * b + move - b + 2        (root = 1)
//! ```
//!
//! The only evaluation available is the mean playout: the fraction of won
//! leaves below a node.

use pathology_core::{GameTree, PathologyError, PathologyProbe, Result, Side, StateId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::snapshot;

/// Largest tree the eager construction accepts.
pub const MAX_PGAME_NODES: u64 = 1 << 22;

/// Redraws allowed when looking for a tree with a decisive root.
const MAX_ATTEMPTS: usize = 10_000;

/// Bisection steps when solving for the leaf win probability.
const BISECTION_STEPS: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PNode {
    side: Side,
    depth: u32,
    minimax: i8,
    mean_playout: f64,
}

/// An eagerly built P-game tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PGame {
    depth: u32,
    branching_factor: usize,
    nodes: Vec<PNode>,
}

/// Probability `x` in (0, 1) solving `(1 - x)^b = x`.
///
/// With this leaf win rate the root of a deep tree is equally likely to be
/// won or lost.
pub fn leaf_win_probability(branching_factor: usize) -> f64 {
    let b = branching_factor as i32;
    let f = |x: f64| (1.0 - x).powi(b) - x;
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..BISECTION_STEPS {
        let mid = (lo + hi) / 2.0;
        if f(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

impl PGame {
    /// Build a P-game of the given shape.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `branching_factor < 2` or the tree would
    /// exceed [`MAX_PGAME_NODES`].
    pub fn new<R: Rng>(depth: u32, branching_factor: usize, rng: &mut R) -> Result<Self> {
        let num_nodes = Self::checked_size(depth, branching_factor)?;
        let b = branching_factor;
        let num_leaves = (b as u64).pow(depth) as usize;
        let leaf_rate = leaf_win_probability(b);
        let leaf_side = if depth % 2 == 0 { Side::Max } else { Side::Min };

        // Built from the last id down; `built[n - id]` holds node `id`.
        let mut built: Vec<PNode> = Vec::with_capacity(num_nodes);
        for i in 0..num_nodes {
            let state = num_nodes - i;
            let node = if i < num_leaves {
                let mut minimax = if rng.gen::<f64>() < leaf_rate { 1 } else { -1 };
                if leaf_side == Side::Max {
                    minimax = -minimax;
                }
                PNode {
                    side: leaf_side,
                    depth,
                    minimax,
                    mean_playout: if minimax > 0 { 1.0 } else { 0.0 },
                }
            } else {
                let children: Vec<&PNode> = (0..b)
                    .map(|mv| &built[num_nodes - (state * b + mv + 2 - b)])
                    .collect();
                let side = children[0].side.opposite();
                let values = children.iter().map(|c| c.minimax);
                let minimax = match side {
                    Side::Max => values.max(),
                    Side::Min => values.min(),
                }
                .unwrap_or(1);
                PNode {
                    side,
                    depth: children[0].depth - 1,
                    minimax,
                    mean_playout: children.iter().map(|c| c.mean_playout).sum::<f64>() / b as f64,
                }
            };
            built.push(node);
        }
        built.reverse();

        debug!(depth, branching_factor, nodes = num_nodes, "built P-game");
        Ok(Self {
            depth,
            branching_factor,
            nodes: built,
        })
    }

    /// Build P-games until one has a winning root whose moves disagree, so
    /// that the root decision actually matters.
    pub fn generate_interesting<R: Rng>(
        depth: u32,
        branching_factor: usize,
        rng: &mut R,
    ) -> Result<Self> {
        for _ in 0..MAX_ATTEMPTS {
            let game = Self::new(depth, branching_factor, rng)?;
            if game.is_interesting() {
                return Ok(game);
            }
        }
        Err(PathologyError::InvalidConfig(format!(
            "no decisive P-game of depth {} found in {} attempts",
            depth, MAX_ATTEMPTS
        )))
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ground-truth value of `state`.
    pub fn minimax(&self, state: StateId) -> Result<i8> {
        Ok(self.node(state)?.minimax)
    }

    /// Ground-truth value of every root move.
    pub fn root_move_values(&self) -> Result<Vec<i8>> {
        (0..self.branching_factor)
            .map(|mv| self.minimax(self.child_of(StateId::ROOT, mv)))
            .collect()
    }

    pub fn is_optimal_root_move(&self, mv: usize) -> Result<bool> {
        Ok(self.minimax(self.child_of(StateId::ROOT, mv))? == 1)
    }

    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        snapshot::encode(self)
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        snapshot::decode(bytes)
    }

    fn is_interesting(&self) -> bool {
        if self.depth == 0 || self.nodes[0].minimax != 1 {
            return false;
        }
        let first = self.nodes[1].minimax;
        self.nodes[2..=self.branching_factor]
            .iter()
            .any(|n| n.minimax != first)
    }

    fn checked_size(depth: u32, branching_factor: usize) -> Result<usize> {
        if branching_factor < 2 {
            return Err(PathologyError::InvalidConfig(format!(
                "branching factor must be at least 2, got {}",
                branching_factor
            )));
        }
        let b = branching_factor as u64;
        let too_large = || {
            PathologyError::InvalidConfig(format!(
                "P-game of depth {} and branching factor {} exceeds {} nodes",
                depth, branching_factor, MAX_PGAME_NODES
            ))
        };
        let total = b
            .checked_pow(depth + 1)
            .map(|p| (p - 1) / (b - 1))
            .ok_or_else(too_large)?;
        if total > MAX_PGAME_NODES {
            return Err(too_large());
        }
        Ok(total as usize)
    }

    fn child_of(&self, state: StateId, mv: usize) -> StateId {
        let b = self.branching_factor as u32;
        StateId::new(state.get() * b + mv as u32 + 2 - b)
    }

    fn node(&self, state: StateId) -> Result<&PNode> {
        state
            .index()
            .and_then(|i| self.nodes.get(i))
            .ok_or(PathologyError::UnknownState(state))
    }
}

impl GameTree for PGame {
    fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    fn side(&self, state: StateId) -> Result<Side> {
        Ok(self.node(state)?.side)
    }

    fn is_terminal(&self, state: StateId) -> Result<bool> {
        Ok(self.node(state)?.depth == self.depth)
    }

    fn get_new_state(&mut self, state: StateId, mv: usize) -> Result<Option<StateId>> {
        if mv >= self.branching_factor {
            return Err(PathologyError::MoveOutOfRange {
                mv,
                branching_factor: self.branching_factor,
            });
        }
        if self.is_terminal(state)? {
            return Ok(None);
        }
        Ok(Some(self.child_of(state, mv)))
    }

    fn get_eval(&mut self, state: StateId) -> Result<f64> {
        let node = self.node(state)?;
        Ok(if node.depth == self.depth {
            if node.minimax > 0 {
                1.0
            } else {
                0.0
            }
        } else {
            node.mean_playout
        })
    }
}

impl PathologyProbe for PGame {
    fn is_choice_state(&self, state: StateId) -> Result<bool> {
        let node = self.node(state)?;
        Ok(node.minimax == node.side.sign())
    }

    fn is_pathological_move(&mut self, _state: StateId, _mv: usize) -> Result<bool> {
        Err(PathologyError::ProbeOutOfDomain(
            "P-games have no flip-rate model".to_string(),
        ))
    }
}
