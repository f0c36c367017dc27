use serde::{Deserialize, Serialize};

use super::Heuristic;
use crate::{Node, TreeConfig};

/// Zero-noise baseline: returns the ground truth as a 0/1 win indicator.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PerfectHeuristic;

impl Heuristic for PerfectHeuristic {
    fn evaluate(&mut self, _tree: &TreeConfig, node: &Node) -> f64 {
        node.truth()
    }

    fn name(&self) -> &str {
        "perfect"
    }
}
