use serde::{Deserialize, Serialize};

use super::Heuristic;
use crate::{Node, TreeConfig};

/// Digits kept after the decimal point.
const ROUNDING_DIGITS: i32 = 6;

/// Exact expected outcome of a uniformly random continuation.
///
/// Under the flip-rate model a random move at a choice node keeps the
/// value with probability `k = 1 - rate + rate / b` (the optimal move is
/// hit with probability `1/b`, any other move survives the flip with
/// probability `1 - rate`). Alternating the two sides' survival rates over
/// the remaining half-depths gives the probability that the node's value
/// survives to a leaf, which is rescaled to [0, 1] from MAX's perspective.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ExpectedPlayoutHeuristic;

impl ExpectedPlayoutHeuristic {
    /// Probability that the value of a choice node survives `rem_depth`
    /// random plies.
    pub fn survival(tree: &TreeConfig, rem_depth: u32) -> f64 {
        debug_assert!(rem_depth > 0);
        let b = tree.branching_factor as f64;
        let k1 = 1.0 - tree.flip_rate.max_rate() + tree.flip_rate.max_rate() / b;
        let k2 = 1.0 - tree.flip_rate.min_rate() + tree.flip_rate.min_rate() / b;
        let k = k1 * k2;
        let d = (rem_depth / 2) as i32;

        let mut p = if d == 0 {
            1.0
        } else if (1.0 - k).abs() < f64::EPSILON {
            // No flips at all: the geometric tail vanishes with (1 - k2).
            1.0
        } else {
            k.powi(d) + (1.0 - k2) * (1.0 - k.powi(d + 1)) / (1.0 - k)
        };
        if rem_depth % 2 != 0 {
            p *= k1;
        }
        // The closed form overshoots 1 when MIN's rate is much larger than MAX's.
        p.clamp(0.0, 1.0)
    }
}

impl Heuristic for ExpectedPlayoutHeuristic {
    fn evaluate(&mut self, tree: &TreeConfig, node: &Node) -> f64 {
        let mut depth = node.depth;

        // A forced node hands the move to the winner without changing the
        // value, so evaluate its (virtual) child instead.
        if !node.is_choice_node() {
            depth += 1;
            if depth == tree.depth {
                return node.truth();
            }
        }

        let survival = Self::survival(tree, tree.depth - depth);
        let directional = (2.0 * survival - 1.0) * f64::from(node.minimax);
        let value = (directional + 1.0) / 2.0;
        let scale = 10f64.powi(ROUNDING_DIGITS);
        (value * scale).round() / scale
    }

    fn name(&self) -> &str {
        "expected-playout"
    }
}
