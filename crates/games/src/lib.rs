//! Pathology Games - stochastically generated two-player zero-sum trees
//!
//! This crate implements the game trees that search algorithms are studied
//! on, without needing a real game:
//!
//! - [`SyntheticTree`] - an arbitrarily deep ±1 minimax tree generated lazily,
//!   where non-optimal moves at choice nodes flip the value with a per-side
//!   probability
//! - [`PGame`] - Pearl's uniform random-leaf game, built eagerly
//! - [`heuristic`] - evaluators that turn a node's hidden ground truth into
//!   the observable value search algorithms see at their cutoff
//!
//! # Example
//!
//! ```
//! use pathology_core::{GameTree, StateId};
//! use pathology_games::{heuristic::PerfectHeuristic, SyntheticTree, TreeConfig};
//!
//! let config = TreeConfig::new(2, 10).with_seed(42);
//! let mut tree = SyntheticTree::new(config).unwrap();
//! tree.set_heuristic(PerfectHeuristic.into());
//!
//! let child = tree.get_new_state(StateId::ROOT, 1).unwrap().unwrap();
//! let eval = tree.get_eval(child).unwrap();
//! assert!(eval == 0.0 || eval == 1.0);
//! ```

pub mod config;
pub mod heuristic;
mod node;
pub mod pgame;
pub mod snapshot;
mod synthetic;

pub use config::TreeConfig;
pub use heuristic::{create_heuristic, AnyHeuristic, Heuristic, HeuristicParams};
pub use node::Node;
pub use pgame::PGame;
pub use synthetic::SyntheticTree;
