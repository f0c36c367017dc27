//! Heuristic evaluators.
//!
//! A heuristic stands in for a real static evaluation function: it turns a
//! non-terminal node's hidden ground truth into an observable value in
//! [0, 1] that search algorithms treat as the evaluation at their cutoff.
//!
//! - [`PerfectHeuristic`]: the ground truth itself
//! - [`HistogramHeuristic`]: ground truth plus noise drawn from a sampled
//!   distribution (Gaussian, uniform, or an empirical real-game histogram)
//! - [`ExpectedPlayoutHeuristic`]: closed-form probability that a random
//!   continuation keeps the root's advantage

mod expected_playout;
mod histogram;
mod perfect;

use std::path::PathBuf;

use pathology_core::{PathologyError, Result};
use serde::{Deserialize, Serialize};

use crate::{Node, TreeConfig};

pub use expected_playout::ExpectedPlayoutHeuristic;
pub use histogram::{Histogram, HistogramHeuristic, EMPIRICAL_DATASETS};
pub use perfect::PerfectHeuristic;

/// Names accepted by [`create_heuristic`] besides the empirical datasets.
pub const SIMPLE_HEURISTICS: &[&str] = &["perfect", "gaussian", "uniform", "expected-playout"];

/// Trait for evaluating synthetic tree nodes.
pub trait Heuristic {
    /// Evaluate a non-terminal node, returning a value in [0, 1].
    ///
    /// The value may depend only on the node's ground truth, the tree's
    /// shape and the heuristic's own randomness, never on search history.
    fn evaluate(&mut self, tree: &TreeConfig, node: &Node) -> f64;

    /// Name the heuristic was selected by.
    fn name(&self) -> &str;
}

/// Any of the recognized heuristics, selected at construction time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AnyHeuristic {
    Perfect(PerfectHeuristic),
    Histogram(HistogramHeuristic),
    ExpectedPlayout(ExpectedPlayoutHeuristic),
}

impl Heuristic for AnyHeuristic {
    fn evaluate(&mut self, tree: &TreeConfig, node: &Node) -> f64 {
        match self {
            AnyHeuristic::Perfect(h) => h.evaluate(tree, node),
            AnyHeuristic::Histogram(h) => h.evaluate(tree, node),
            AnyHeuristic::ExpectedPlayout(h) => h.evaluate(tree, node),
        }
    }

    fn name(&self) -> &str {
        match self {
            AnyHeuristic::Perfect(h) => h.name(),
            AnyHeuristic::Histogram(h) => h.name(),
            AnyHeuristic::ExpectedPlayout(h) => h.name(),
        }
    }
}

impl From<PerfectHeuristic> for AnyHeuristic {
    fn from(h: PerfectHeuristic) -> Self {
        AnyHeuristic::Perfect(h)
    }
}

impl From<HistogramHeuristic> for AnyHeuristic {
    fn from(h: HistogramHeuristic) -> Self {
        AnyHeuristic::Histogram(h)
    }
}

impl From<ExpectedPlayoutHeuristic> for AnyHeuristic {
    fn from(h: ExpectedPlayoutHeuristic) -> Self {
        AnyHeuristic::ExpectedPlayout(h)
    }
}

/// Variant-specific heuristic parameters.
#[derive(Clone, Debug)]
pub struct HeuristicParams {
    /// Noise spread: standard deviation (Gaussian) or half-width (uniform).
    pub spread: f64,

    /// Number of samples drawn to build a noise distribution.
    pub sample_size: usize,

    /// Directory holding `<dataset>.json` empirical histograms.
    pub data_dir: PathBuf,

    /// Seed for the heuristic's own randomness source.
    pub seed: Option<u64>,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            spread: 0.25,
            sample_size: 100_000,
            data_dir: PathBuf::from("data/heuristics"),
            seed: None,
        }
    }
}

/// Build a heuristic from its name.
///
/// # Errors
/// - `UnknownHeuristic` if `name` is not recognized
/// - `InvalidConfig` for a non-positive spread or empty sample size
/// - `HistogramLoad` if an empirical dataset cannot be read
pub fn create_heuristic(name: &str, params: &HeuristicParams) -> Result<AnyHeuristic> {
    match name {
        "perfect" => Ok(PerfectHeuristic.into()),
        "gaussian" => {
            HistogramHeuristic::gaussian(params.spread, params.sample_size, params.seed)
                .map(Into::into)
        }
        "uniform" => {
            HistogramHeuristic::uniform(params.spread, params.sample_size, params.seed)
                .map(Into::into)
        }
        "expected-playout" => Ok(ExpectedPlayoutHeuristic.into()),
        dataset if EMPIRICAL_DATASETS.contains(&dataset) => {
            HistogramHeuristic::empirical(dataset, &params.data_dir, params.seed).map(Into::into)
        }
        other => Err(PathologyError::UnknownHeuristic(other.to_string())),
    }
}
