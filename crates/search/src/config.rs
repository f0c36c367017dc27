//! Search configuration parameters.
//!
//! Each config is checked against the branching factor of the tree it will
//! search when a player is constructed, so bad parameters surface before any
//! node is created.

use pathology_core::{PathologyError, Result};
use serde::{Deserialize, Serialize};

/// Alpha-beta configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaBetaConfig {
    /// Search depth in plies, at least 1.
    pub depth: u32,

    /// Seed for move-order shuffling.
    pub seed: Option<u64>,

    /// Shuffle the moves of every node before enumerating them.
    pub randomize_moves: bool,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            seed: None,
            randomize_moves: false,
        }
    }
}

impl AlphaBetaConfig {
    /// Create a config searching `depth` plies in natural move order.
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn randomized(mut self) -> Self {
        self.randomize_moves = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(PathologyError::InvalidConfig(
                "alpha-beta depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// UCT configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UctConfig {
    /// UCB1 exploration constant.
    pub bias_constant: f64,

    /// Number of select/expand/backpropagate iterations.
    pub iterations: usize,

    /// Seed for tie-breaking.
    pub seed: Option<u64>,

    /// Record the greedy root decision after every iteration.
    pub record_decisions: bool,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            bias_constant: 1.0,
            iterations: 1000,
            seed: None,
            record_decisions: false,
        }
    }
}

impl UctConfig {
    /// Create a config with the given exploration constant and budget.
    pub fn new(bias_constant: f64, iterations: usize) -> Self {
        Self {
            bias_constant,
            iterations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn recording_decisions(mut self) -> Self {
        self.record_decisions = true;
        self
    }

    /// The budget must let every root move be tried once.
    pub fn validate(&self, branching_factor: usize) -> Result<()> {
        if !(self.bias_constant.is_finite() && self.bias_constant > 0.0) {
            return Err(PathologyError::InvalidConfig(format!(
                "UCT bias constant must be positive, got {}",
                self.bias_constant
            )));
        }
        if self.iterations < branching_factor {
            return Err(PathologyError::InvalidConfig(format!(
                "UCT needs at least {} iterations, got {}",
                branching_factor, self.iterations
            )));
        }
        Ok(())
    }
}
