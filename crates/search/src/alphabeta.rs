//! Depth-limited minimax search with alpha-beta pruning.
//!
//! Besides the decision, the search keeps pruning bookkeeping: the number of
//! nodes visited, the number of cutoffs, and a running estimate of the size
//! of the tree actually searched. The estimate starts at the size of the
//! full-width tree and loses, on every cutoff, the subtrees that were skipped.

use pathology_core::{GameTree, PathologyError, RandomSource, Result, Side, StateId};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AlphaBetaConfig;
use crate::stop::StopFlag;

/// Result of an alpha-beta search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaBetaResult {
    /// Best root move, `None` if the root is terminal.
    pub best_move: Option<usize>,

    /// Backed-up value of the root.
    pub utility: f64,

    pub node_count: u64,

    pub prune_count: u64,

    /// Full-width node count minus the subtrees skipped by cutoffs.
    pub estimated_node_count: u64,
}

/// Alpha-beta player with a fixed depth.
pub struct AlphaBetaPlayer {
    config: AlphaBetaConfig,
    branching_factor: usize,
    rng: RandomSource,
    stop: StopFlag,
    node_count: u64,
    prune_count: u64,
    estimated_node_count: u64,
}

impl AlphaBetaPlayer {
    /// Create a player for `game`.
    ///
    /// Fails if the depth is zero or the full-width tree of that depth does
    /// not fit the node counters.
    pub fn new<G: GameTree>(game: &G, config: AlphaBetaConfig) -> Result<Self> {
        config.validate()?;
        let branching_factor = game.branching_factor();
        if branching_size(branching_factor, config.depth).is_none() {
            return Err(PathologyError::InvalidConfig(format!(
                "alpha-beta depth {} is too deep for branching factor {}",
                config.depth, branching_factor
            )));
        }
        let rng = pathology_core::random_source(config.seed);
        Ok(Self {
            config,
            branching_factor,
            rng,
            stop: StopFlag::default(),
            node_count: 0,
            prune_count: 0,
            estimated_node_count: 0,
        })
    }

    /// Poll `stop` at every node; a raised flag ends the search with
    /// `Cancelled`.
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &AlphaBetaConfig {
        &self.config
    }

    /// Node count of a full-width tree of `depth` plies.
    pub fn branch_size(&self, depth: u32) -> u64 {
        branching_size(self.branching_factor, depth).unwrap_or(u64::MAX)
    }

    /// Search `config.depth` plies from the root of `game`.
    pub fn search<G: GameTree>(&mut self, game: &mut G) -> Result<AlphaBetaResult> {
        if game.branching_factor() != self.branching_factor {
            return Err(PathologyError::InvalidConfig(format!(
                "player built for branching factor {}, game has {}",
                self.branching_factor,
                game.branching_factor()
            )));
        }

        self.node_count = 0;
        self.prune_count = 0;
        self.estimated_node_count = self.branch_size(self.config.depth);

        let root = game.root();
        let side = game.side(root)?;
        let (utility, best_move) = self.alphabeta(
            game,
            root,
            self.config.depth,
            side,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )?;

        debug!(
            best_move = ?best_move,
            utility,
            nodes = self.node_count,
            prunes = self.prune_count,
            estimated = self.estimated_node_count,
            "alpha-beta search complete"
        );

        Ok(AlphaBetaResult {
            best_move,
            utility,
            node_count: self.node_count,
            prune_count: self.prune_count,
            estimated_node_count: self.estimated_node_count,
        })
    }

    fn alphabeta<G: GameTree>(
        &mut self,
        game: &mut G,
        state: StateId,
        depth: u32,
        side: Side,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<(f64, Option<usize>)> {
        self.stop.check()?;
        self.node_count += 1;

        if depth == 0 || game.is_terminal(state)? {
            return Ok((game.get_eval(state)?, None));
        }

        let mut moves: Vec<usize> = (0..self.branching_factor).collect();
        if self.config.randomize_moves {
            moves.shuffle(&mut self.rng);
        }

        let mut score = match side {
            Side::Max => f64::NEG_INFINITY,
            Side::Min => f64::INFINITY,
        };
        let mut best_move = moves[0];

        for (visited, &mv) in moves.iter().enumerate() {
            let child = game
                .get_new_state(state, mv)?
                .ok_or(PathologyError::TerminalState(state))?;
            let (eval, _) = self.alphabeta(game, child, depth - 1, side.opposite(), alpha, beta)?;

            if side.prefers(eval, score) {
                score = eval;
                best_move = mv;
                match side {
                    Side::Max => alpha = alpha.max(score),
                    Side::Min => beta = beta.min(score),
                }
            }

            // A cutoff after the last sibling skips nothing and is not counted.
            let skipped = (self.branching_factor - visited - 1) as u64;
            if alpha >= beta && skipped > 0 {
                self.prune_count += 1;
                self.estimated_node_count = self
                    .estimated_node_count
                    .saturating_sub(self.branch_size(depth - 1).saturating_mul(skipped));
                trace!(%state, depth, mv, skipped, "cutoff");
                break;
            }
        }

        Ok((score, Some(best_move)))
    }
}

/// `(b^(d+1) - 1) / (b - 1)`, or `None` on overflow.
fn branching_size(branching_factor: usize, depth: u32) -> Option<u64> {
    let b = branching_factor as u64;
    if b < 2 {
        return depth.checked_add(1).map(u64::from);
    }
    b.checked_pow(depth.checked_add(1)?).map(|p| (p - 1) / (b - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathology_games::{heuristic::PerfectHeuristic, SyntheticTree, TreeConfig};

    fn fixed_tree(depth: u32) -> SyntheticTree {
        SyntheticTree::new(TreeConfig::new(2, depth).with_seed(11).fixed())
            .unwrap()
            .with_heuristic(PerfectHeuristic.into())
    }

    #[test]
    fn test_branch_size() {
        assert_eq!(branching_size(2, 0), Some(1));
        assert_eq!(branching_size(2, 2), Some(7));
        assert_eq!(branching_size(3, 3), Some(40));
        assert_eq!(branching_size(2, 64), None);
    }

    #[test]
    fn test_depth_zero_rejected() {
        let game = fixed_tree(4);
        let err = AlphaBetaPlayer::new(&game, AlphaBetaConfig::with_depth(0))
            .err()
            .unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_overflowing_depth_rejected() {
        let game = fixed_tree(4);
        assert!(AlphaBetaPlayer::new(&game, AlphaBetaConfig::with_depth(200)).is_err());
    }

    #[test]
    fn test_terminal_root() {
        let mut game = fixed_tree(0);
        let mut player = AlphaBetaPlayer::new(&game, AlphaBetaConfig::with_depth(3)).unwrap();
        let result = player.search(&mut game).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.utility, 1.0);
        assert_eq!(result.node_count, 1);
    }

    #[test]
    fn test_depth_one_searches_every_root_move() {
        // The root window is unbounded, so no cutoff can happen at depth 1.
        let mut game = fixed_tree(5);
        let mut player = AlphaBetaPlayer::new(&game, AlphaBetaConfig::with_depth(1)).unwrap();
        let result = player.search(&mut game).unwrap();
        assert_eq!(result.best_move, Some(0));
        assert_eq!(result.utility, 1.0);
        assert_eq!(result.prune_count, 0);
        assert_eq!(result.node_count, 3);
        assert_eq!(result.estimated_node_count, 3);
    }
}
