//! Pathology Search - game-tree search players
//!
//! This crate provides the players whose decisions are compared on synthetic
//! trees:
//!
//! - **Alpha-beta**: depth-limited minimax with pruning bookkeeping
//! - **UCT**: Monte Carlo tree search with UCB1 selection, with pluggable
//!   backup rules (mean or minimax) and tie-breaking policies (uniform or
//!   biased toward pathological moves)
//! - **Algorithm names**: the string grammar experiments use to pick players
//!
//! # Example
//!
//! ```
//! use pathology_games::{heuristic::PerfectHeuristic, SyntheticTree, TreeConfig};
//! use pathology_search::{AlphaBetaConfig, AlphaBetaPlayer, Uct, UctConfig};
//!
//! let config = TreeConfig::new(2, 20).with_seed(7);
//! let mut game = SyntheticTree::new(config).unwrap();
//! game.set_heuristic(PerfectHeuristic.into());
//!
//! let mut alphabeta = AlphaBetaPlayer::new(&game, AlphaBetaConfig::with_depth(4)).unwrap();
//! let result = alphabeta.search(&mut game).unwrap();
//! println!("alpha-beta: {:?} ({} prunes)", result.best_move, result.prune_count);
//!
//! let mut uct = Uct::new(&game, UctConfig::new(1.0, 200).with_seed(7)).unwrap();
//! let result = uct.search(&mut game).unwrap();
//! println!("UCT: {:?} ({} nodes)", result.best_move, result.node_count);
//! ```

pub mod algorithm;
pub mod alphabeta;
pub mod backprop;
pub mod config;
pub mod node;
pub mod stop;
pub mod tie_break;
pub mod tree;
pub mod uct;

pub use algorithm::{algorithm_set, Algorithm, Decision, ALGORITHM_SETS};
pub use alphabeta::{AlphaBetaPlayer, AlphaBetaResult};
pub use backprop::{Backpropagation, MeanBackup, MinimaxBackup};
pub use config::{AlphaBetaConfig, UctConfig};
pub use node::{NodeId, UctNode};
pub use stop::StopFlag;
pub use tie_break::{PathologyBiasTieBreak, TieBreak, UniformTieBreak};
pub use tree::UctTree;
pub use uct::{Uct, UctBias, UctMinimax, UctPlayer, UctResult};
