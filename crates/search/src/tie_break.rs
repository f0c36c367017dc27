//! Tie-breaking policies for UCT move selection.
//!
//! Ties arise both among equal UCB1 scores and among the unvisited moves of
//! a partially expanded node; both go through the same policy.

use pathology_core::{GameTree, PathologyError, PathologyProbe, RandomSource, Result, StateId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Choose one of several equally good moves at `state`.
pub trait TieBreak<G: GameTree> {
    fn break_tie(
        &mut self,
        game: &mut G,
        state: StateId,
        moves: &[usize],
        rng: &mut RandomSource,
    ) -> Result<usize>;
}

fn pick(moves: &[usize], rng: &mut RandomSource) -> Result<usize> {
    moves
        .choose(rng)
        .copied()
        .ok_or_else(|| PathologyError::InvalidConfig("no candidate moves to choose from".into()))
}

/// Uniform choice among the tied moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformTieBreak;

impl<G: GameTree> TieBreak<G> for UniformTieBreak {
    fn break_tie(
        &mut self,
        _game: &mut G,
        _state: StateId,
        moves: &[usize],
        rng: &mut RandomSource,
    ) -> Result<usize> {
        pick(moves, rng)
    }
}

/// Steers ties at non-root choice nodes toward or away from pathological
/// moves.
///
/// With probability `pathology_bias` the choice is made among the moves
/// that would flip the branch away from its root sign, otherwise among the
/// safe ones. An empty group falls back to the other one.
#[derive(Clone, Copy, Debug)]
pub struct PathologyBiasTieBreak {
    pathology_bias: f64,
}

impl PathologyBiasTieBreak {
    pub fn new(pathology_bias: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&pathology_bias) {
            return Err(PathologyError::InvalidConfig(format!(
                "pathology bias must be in [0, 1], got {}",
                pathology_bias
            )));
        }
        Ok(Self { pathology_bias })
    }

    pub fn pathology_bias(&self) -> f64 {
        self.pathology_bias
    }
}

impl<G: PathologyProbe> TieBreak<G> for PathologyBiasTieBreak {
    fn break_tie(
        &mut self,
        game: &mut G,
        state: StateId,
        moves: &[usize],
        rng: &mut RandomSource,
    ) -> Result<usize> {
        if moves.len() < 2 || state == game.root() || !game.is_choice_state(state)? {
            return pick(moves, rng);
        }

        let mut pathological = Vec::new();
        let mut safe = Vec::new();
        for &mv in moves {
            if game.is_pathological_move(state, mv)? {
                pathological.push(mv);
            } else {
                safe.push(mv);
            }
        }

        let prefer_pathological = rng.gen::<f64>() < self.pathology_bias;
        let group = match (prefer_pathological, pathological.is_empty(), safe.is_empty()) {
            (_, true, _) => &safe,
            (_, _, true) => &pathological,
            (true, _, _) => &pathological,
            (false, _, _) => &safe,
        };
        pick(group, rng)
    }
}
