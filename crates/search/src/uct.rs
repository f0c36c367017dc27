//! Upper Confidence bounds applied to Trees.
//!
//! One driver runs select/expand/backpropagate over an explicit search tree;
//! the backup rule and the tie-breaking policy are injected as strategies,
//! which yields the classic, minimax and pathology-bias variants.
//!
//! Descent is a loop over an explicit path, so game trees thousands of plies
//! deep do not grow the call stack.

use pathology_core::{GameTree, PathologyError, PathologyProbe, RandomSource, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backprop::{Backpropagation, MeanBackup, MinimaxBackup};
use crate::config::UctConfig;
use crate::node::{NodeId, UctNode};
use crate::stop::StopFlag;
use crate::tie_break::{PathologyBiasTieBreak, TieBreak, UniformTieBreak};
use crate::tree::UctTree;

/// Classic UCT: mean backup, uniform tie-breaking.
pub type Uct = UctPlayer<MeanBackup, UniformTieBreak>;

/// UCT whose nodes back up the best child utility instead of the mean.
pub type UctMinimax = UctPlayer<MinimaxBackup, UniformTieBreak>;

/// Classic UCT with ties biased toward or away from pathological moves.
pub type UctBias = UctPlayer<MeanBackup, PathologyBiasTieBreak>;

/// Result of a UCT search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UctResult {
    /// Greedy root move, `None` if the root is terminal.
    pub best_move: Option<usize>,

    /// Backed-up utility of `best_move` (of the root when terminal).
    pub utility: f64,

    /// Search-tree nodes created, root included.
    pub node_count: usize,

    pub iterations: usize,

    /// Greedy root move after each iteration, when recording is enabled.
    pub decisions: Vec<Option<usize>>,
}

/// UCT player generic over its backup rule `B` and tie-break policy `T`.
pub struct UctPlayer<B, T> {
    config: UctConfig,
    branching_factor: usize,
    backup: B,
    tie_break: T,
    rng: RandomSource,
    stop: StopFlag,
    tree: Option<UctTree>,
}

impl<B: Backpropagation + Default> UctPlayer<B, UniformTieBreak> {
    /// Create a player for `game` with uniform tie-breaking.
    pub fn new<G: GameTree>(game: &G, config: UctConfig) -> Result<Self> {
        Self::with_strategies(game, config, B::default(), UniformTieBreak)
    }
}

impl UctPlayer<MeanBackup, PathologyBiasTieBreak> {
    /// Create a player whose ties favour pathological moves with
    /// probability `pathology_bias`.
    pub fn with_pathology_bias<G: PathologyProbe>(
        game: &G,
        config: UctConfig,
        pathology_bias: f64,
    ) -> Result<Self> {
        let tie_break = PathologyBiasTieBreak::new(pathology_bias)?;
        Self::with_strategies(game, config, MeanBackup, tie_break)
    }
}

impl<B: Backpropagation, T> UctPlayer<B, T> {
    pub fn with_strategies<G: GameTree>(
        game: &G,
        config: UctConfig,
        backup: B,
        tie_break: T,
    ) -> Result<Self> {
        let branching_factor = game.branching_factor();
        config.validate(branching_factor)?;
        let rng = pathology_core::random_source(config.seed);
        Ok(Self {
            config,
            branching_factor,
            backup,
            tie_break,
            rng,
            stop: StopFlag::default(),
            tree: None,
        })
    }

    /// Poll `stop` before every iteration; a raised flag ends the search
    /// with `Cancelled`.
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    /// Search tree of the last completed search.
    pub fn tree(&self) -> Option<&UctTree> {
        self.tree.as_ref()
    }

    /// Run the configured number of iterations from the root of `game` and
    /// pick the root move greedily.
    ///
    /// With `record_decisions`, the greedy pick after each iteration draws
    /// from the same randomness source as the search itself.
    pub fn search<G>(&mut self, game: &mut G) -> Result<UctResult>
    where
        G: GameTree,
        T: TieBreak<G>,
    {
        if game.branching_factor() != self.branching_factor {
            return Err(PathologyError::InvalidConfig(format!(
                "player built for branching factor {}, game has {}",
                self.branching_factor,
                game.branching_factor()
            )));
        }

        // A non-terminal root is never evaluated, so the heuristic's noise
        // stream is spent on expanded nodes only.
        let root = game.root();
        let root_utility = if game.is_terminal(root)? {
            game.get_eval(root)?
        } else {
            0.0
        };
        let mut tree = UctTree::new(UctNode::expanded(root, game.side(root)?, root_utility));
        let mut decisions = Vec::new();

        for iteration in 0..self.config.iterations {
            self.stop.check()?;
            self.iterate(game, &mut tree)?;
            if self.config.record_decisions {
                decisions.push(self.select_move(game, &tree, NodeId::ROOT, 0.0)?);
            }
            trace!(iteration, nodes = tree.len(), "UCT iteration");
        }

        let best_move = self.select_move(game, &tree, NodeId::ROOT, 0.0)?;
        let utility = match best_move.and_then(|mv| tree.root().child(mv)) {
            Some(child) => tree.get(child).utility,
            None => tree.root().utility,
        };

        debug!(
            best_move = ?best_move,
            utility,
            nodes = tree.len(),
            iterations = self.config.iterations,
            "UCT search complete"
        );

        let result = UctResult {
            best_move,
            utility,
            node_count: tree.len(),
            iterations: self.config.iterations,
            decisions,
        };
        self.tree = Some(tree);
        Ok(result)
    }

    /// One iteration: descend, expand one node, back the result up the path.
    fn iterate<G>(&mut self, game: &mut G, tree: &mut UctTree) -> Result<()>
    where
        G: GameTree,
        T: TieBreak<G>,
    {
        let mut path = vec![NodeId::ROOT];
        let mut current = NodeId::ROOT;

        let result = loop {
            let mv = match self.select_move(game, tree, current, self.config.bias_constant)? {
                Some(mv) => mv,
                None => break game.get_eval(tree.get(current).state)?,
            };
            match tree.get(current).child(mv) {
                Some(child) => {
                    path.push(child);
                    current = child;
                }
                None => break expand(game, tree, current, mv)?,
            }
        };

        for &id in path.iter().rev() {
            self.backup.update(tree, id, result);
        }
        Ok(())
    }

    /// Move to play at `id`, or `None` if its state is terminal.
    ///
    /// Unvisited moves are tried before UCB1 is applied.
    fn select_move<G>(
        &mut self,
        game: &mut G,
        tree: &UctTree,
        id: NodeId,
        bias_constant: f64,
    ) -> Result<Option<usize>>
    where
        G: GameTree,
        T: TieBreak<G>,
    {
        let node = tree.get(id);
        if game.is_terminal(node.state)? {
            return Ok(None);
        }

        let candidates: Vec<usize> = if node.is_fully_expanded(self.branching_factor) {
            best_ucb_moves(tree, node, bias_constant)
        } else {
            (0..self.branching_factor)
                .filter(|&mv| node.child(mv).is_none())
                .collect()
        };

        self.tie_break
            .break_tie(game, node.state, &candidates, &mut self.rng)
            .map(Some)
    }
}

/// Create the search-tree child of `parent` for `mv` and return its
/// evaluation.
fn expand<G: GameTree>(
    game: &mut G,
    tree: &mut UctTree,
    parent: NodeId,
    mv: usize,
) -> Result<f64> {
    let state = tree.get(parent).state;
    let child_state = game
        .get_new_state(state, mv)?
        .ok_or(PathologyError::TerminalState(state))?;
    let value = game.get_eval(child_state)?;
    let side = game.side(child_state)?;
    let id = tree.add_child(parent, mv, UctNode::expanded(child_state, side, value));
    trace!(parent = parent.index(), child = id.index(), mv, value, "expanded");
    Ok(value)
}

/// Moves sharing the best UCB1 score for the side to move at `node`, in
/// move order.
fn best_ucb_moves(tree: &UctTree, node: &UctNode, bias_constant: f64) -> Vec<usize> {
    let log_parent = (node.visit_count as f64).ln();
    let sign = node.side.sign() as f64;

    let mut scored: Vec<(usize, f64)> = node
        .children
        .iter()
        .map(|&(mv, child)| {
            let child = tree.get(child);
            let exploration = (log_parent / child.visit_count as f64).sqrt();
            (mv, child.utility + sign * bias_constant * exploration)
        })
        .collect();
    scored.sort_by_key(|&(mv, _)| mv);

    let mut best = Vec::new();
    let mut best_score: Option<f64> = None;
    for (mv, score) in scored {
        match best_score {
            Some(b) if score == b => best.push(mv),
            Some(b) if !node.side.prefers(score, b) => {}
            _ => {
                best_score = Some(score);
                best.clear();
                best.push(mv);
            }
        }
    }
    best
}
