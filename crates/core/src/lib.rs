//! Pathology Core - shared abstractions for synthetic game-tree search
//!
//! This crate provides the `GameTree` trait that search algorithms consume,
//! the identifiers and value types they exchange, and the error taxonomy
//! shared by the whole workspace.
//!
//! # Types
//!
//! - [`GameTree`] - Trait for lazily explored two-player zero-sum trees
//! - [`PathologyProbe`] - Research instrumentation for adversarial-move studies
//! - [`Side`] - The player to move (MAX or MIN)
//! - [`StateId`] - Handle of a node in a game tree, root is 1
//! - [`FlipRate`] - Per-side probability of a non-optimal move flipping the value

mod error;
mod game;
mod rng;
mod types;

pub use error::{PathologyError, Result};
pub use game::{GameTree, PathologyProbe};
pub use rng::{random_source, RandomSource};
pub use types::{FlipRate, Side, StateId};
