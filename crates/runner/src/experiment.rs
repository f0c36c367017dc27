//! One experiment game: build a hidden tree, let every algorithm decide on
//! it, score the decisions.
//!
//! All algorithms see the same hidden tree. Before each run the tree is
//! restored from the latest snapshot; after a completed run the grown tree
//! becomes the new snapshot. A run that times out leaves the snapshot as it
//! was.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use pathology_core::{random_source, GameTree, PathologyProbe, Side, StateId};
use pathology_games::{
    create_heuristic, snapshot, HeuristicParams, PGame, SyntheticTree, TreeConfig,
};
use pathology_search::{Algorithm, Decision, StopFlag};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Kind of hidden tree an experiment is played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Lazily generated flip-rate tree.
    Crit,
    /// Pearl's uniform random-leaf game.
    P,
}

/// Everything needed to play one game, shared by all games of a run.
#[derive(Clone, Debug)]
pub struct ExperimentConfig {
    pub game_type: GameType,

    /// Shape of the hidden tree; the seed is set per game.
    pub tree: TreeConfig,

    /// Heuristic name for `crit` trees.
    pub heuristic: String,

    pub heuristic_params: HeuristicParams,

    pub algorithms: Vec<Algorithm>,

    /// Wall-clock budget of a single algorithm run.
    pub timeout: Duration,

    pub record_decisions: bool,
}

/// A hidden tree of either kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExperimentTree {
    Crit(SyntheticTree),
    P(PGame),
}

impl ExperimentTree {
    /// Build the hidden tree of one game.
    pub fn build(config: &ExperimentConfig, seed: Option<u64>) -> Result<Self> {
        match config.game_type {
            GameType::Crit => {
                let mut tree_config = config.tree.clone();
                tree_config.seed = seed;
                let params = HeuristicParams {
                    seed: seed.map(|s| s.wrapping_add(1)),
                    ..config.heuristic_params.clone()
                };
                let heuristic = create_heuristic(&config.heuristic, &params)
                    .with_context(|| format!("Failed to create heuristic {}", config.heuristic))?;
                let tree = SyntheticTree::new(tree_config)?.with_heuristic(heuristic);
                Ok(ExperimentTree::Crit(tree))
            }
            GameType::P => {
                let mut rng = random_source(seed);
                let game = PGame::generate_interesting(
                    config.tree.depth,
                    config.tree.branching_factor,
                    &mut rng,
                )?;
                Ok(ExperimentTree::P(game))
            }
        }
    }

    /// Ground-truth value of each root move.
    pub fn root_move_values(&mut self) -> Result<Vec<i8>> {
        Ok(match self {
            ExperimentTree::Crit(tree) => tree.root_move_values()?,
            ExperimentTree::P(game) => game.root_move_values()?,
        })
    }

    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        Ok(snapshot::encode(self)?)
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        Ok(snapshot::decode(bytes)?)
    }

    pub fn node_count(&self) -> usize {
        match self {
            ExperimentTree::Crit(tree) => tree.node_count(),
            ExperimentTree::P(game) => game.node_count(),
        }
    }
}

impl GameTree for ExperimentTree {
    fn branching_factor(&self) -> usize {
        match self {
            ExperimentTree::Crit(tree) => tree.branching_factor(),
            ExperimentTree::P(game) => game.branching_factor(),
        }
    }

    fn side(&self, state: StateId) -> pathology_core::Result<Side> {
        match self {
            ExperimentTree::Crit(tree) => tree.side(state),
            ExperimentTree::P(game) => game.side(state),
        }
    }

    fn is_terminal(&self, state: StateId) -> pathology_core::Result<bool> {
        match self {
            ExperimentTree::Crit(tree) => tree.is_terminal(state),
            ExperimentTree::P(game) => game.is_terminal(state),
        }
    }

    fn get_new_state(
        &mut self,
        state: StateId,
        mv: usize,
    ) -> pathology_core::Result<Option<StateId>> {
        match self {
            ExperimentTree::Crit(tree) => tree.get_new_state(state, mv),
            ExperimentTree::P(game) => game.get_new_state(state, mv),
        }
    }

    fn get_eval(&mut self, state: StateId) -> pathology_core::Result<f64> {
        match self {
            ExperimentTree::Crit(tree) => tree.get_eval(state),
            ExperimentTree::P(game) => game.get_eval(state),
        }
    }
}

impl PathologyProbe for ExperimentTree {
    fn is_choice_state(&self, state: StateId) -> pathology_core::Result<bool> {
        match self {
            ExperimentTree::Crit(tree) => tree.is_choice_state(state),
            ExperimentTree::P(game) => game.is_choice_state(state),
        }
    }

    fn is_pathological_move(&mut self, state: StateId, mv: usize) -> pathology_core::Result<bool> {
        match self {
            ExperimentTree::Crit(tree) => tree.is_pathological_move(state, mv),
            ExperimentTree::P(game) => game.is_pathological_move(state, mv),
        }
    }
}

/// One algorithm's outcome on one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerResult {
    pub algo: String,

    /// `None` when the run timed out.
    pub decision: Option<Decision>,

    /// Whether the chosen root move keeps the win.
    pub optimal: Option<bool>,

    pub elapsed_secs: f64,
}

/// All algorithms' outcomes on one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameResult {
    pub id: usize,
    pub seed: Option<u64>,
    pub move_utilities: Vec<i8>,
    pub players: Vec<PlayerResult>,
}

/// Result of a game plus the final snapshot of its hidden tree.
pub struct GameOutcome {
    pub result: GameResult,
    pub snapshot: Vec<u8>,
}

/// Play game `id`: every configured algorithm decides on the same tree.
pub fn run_game(config: &ExperimentConfig, id: usize, seed: Option<u64>) -> Result<GameOutcome> {
    let mut tree = ExperimentTree::build(config, seed)
        .with_context(|| format!("Failed to build game {}", id))?;
    let move_utilities = tree.root_move_values()?;
    let mut snapshot = tree.to_snapshot()?;
    drop(tree);

    info!(game = id, ?move_utilities, "game ready");

    let mut players = Vec::with_capacity(config.algorithms.len());
    for (i, algorithm) in config.algorithms.iter().enumerate() {
        let game = ExperimentTree::from_snapshot(&snapshot)?;
        let algo_seed = seed.map(|s| s.wrapping_add(i as u64 + 2));
        let start = Instant::now();

        let outcome = run_with_timeout(
            algorithm.clone(),
            game,
            algo_seed,
            config.record_decisions,
            config.timeout,
        )
        .with_context(|| format!("Algorithm {} failed on game {}", algorithm, id))?;
        let elapsed_secs = start.elapsed().as_secs_f64();

        let player = match outcome {
            Some((decision, game)) => {
                let optimal = decision
                    .best_move
                    .and_then(|mv| move_utilities.get(mv))
                    .map(|&value| value == 1);
                info!(
                    game = id,
                    algo = %algorithm,
                    best_move = ?decision.best_move,
                    ?optimal,
                    nodes = game.node_count(),
                    elapsed_secs,
                    "decision"
                );
                snapshot = game.to_snapshot()?;
                PlayerResult {
                    algo: algorithm.to_string(),
                    decision: Some(decision),
                    optimal,
                    elapsed_secs,
                }
            }
            None => {
                warn!(game = id, algo = %algorithm, timeout = ?config.timeout, "search timed out");
                PlayerResult {
                    algo: algorithm.to_string(),
                    decision: None,
                    optimal: None,
                    elapsed_secs,
                }
            }
        };
        players.push(player);
    }

    Ok(GameOutcome {
        result: GameResult {
            id,
            seed,
            move_utilities,
            players,
        },
        snapshot,
    })
}

/// Run `algorithm` on a worker thread, giving up after `timeout`.
///
/// On success the grown tree is handed back. On timeout the worker is told to
/// stop, joined, and its tree discarded.
pub fn run_with_timeout(
    algorithm: Algorithm,
    mut game: ExperimentTree,
    seed: Option<u64>,
    record_decisions: bool,
    timeout: Duration,
) -> Result<Option<(Decision, ExperimentTree)>> {
    let (tx, rx) = mpsc::channel();
    let stop = StopFlag::new();
    let worker_stop = stop.clone();
    let name = format!("search-{}", algorithm);
    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let result = algorithm
                .run_until_stopped(&mut game, seed, record_decisions, &worker_stop)
                .map(|decision| (decision, game));
            // The receiver stops listening after a timeout.
            let _ = tx.send(result);
        })
        .with_context(|| format!("Failed to spawn {}", name))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => Ok(Some(result?)),
        Err(RecvTimeoutError::Timeout) => {
            stop.stop();
            if handle.join().is_err() {
                bail!("{} panicked after its timeout", name);
            }
            debug!(thread = %name, "stopped timed out worker");
            Ok(None)
        }
        Err(RecvTimeoutError::Disconnected) => bail!("{} exited without a result", name),
    }
}

/// Fraction of completed decisions that kept the win, per algorithm.
pub fn optimal_rates(games: &[GameResult]) -> Vec<(String, f64)> {
    let Some(first) = games.first() else {
        return Vec::new();
    };
    (0..first.players.len())
        .map(|i| {
            let scored: Vec<bool> = games
                .iter()
                .filter_map(|g| g.players.get(i).and_then(|p| p.optimal))
                .collect();
            let rate = if scored.is_empty() {
                0.0
            } else {
                scored.iter().filter(|&&ok| ok).count() as f64 / scored.len() as f64
            };
            (first.players[i].algo.clone(), rate)
        })
        .collect()
}
