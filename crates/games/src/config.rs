//! Synthetic tree construction parameters.

use pathology_core::{FlipRate, PathologyError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of a synthetic tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Moves per non-terminal node (>= 2).
    pub branching_factor: usize,

    /// Depth of the terminal level; the root is terminal when 0.
    pub depth: u32,

    /// Flip probabilities, MAX's rate <= MIN's rate.
    pub flip_rate: FlipRate,

    /// Seed for the tree's randomness source, entropy when `None`.
    pub seed: Option<u64>,

    /// Move 0 is optimal everywhere. Requires flip rates (1, 1).
    pub fixed: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            branching_factor: 2,
            depth: 200,
            flip_rate: FlipRate::ADVERSARIAL,
            seed: None,
            fixed: false,
        }
    }
}

impl TreeConfig {
    /// Create a config with the given shape and default flip rates.
    pub fn new(branching_factor: usize, depth: u32) -> Self {
        Self {
            branching_factor,
            depth,
            ..Default::default()
        }
    }

    pub fn with_flip_rate(mut self, flip_rate: FlipRate) -> Self {
        self.flip_rate = flip_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.branching_factor < 2 {
            return Err(PathologyError::InvalidConfig(format!(
                "branching factor must be at least 2, got {}",
                self.branching_factor
            )));
        }
        if self.fixed && !self.flip_rate.is_adversarial() {
            return Err(PathologyError::InvalidConfig(
                "a fixed tree requires flip rates (1, 1)".to_string(),
            ));
        }
        Ok(())
    }
}
