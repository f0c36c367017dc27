//! Noise heuristics backed by a sampled distribution.
//!
//! Gaussian, uniform and empirical evaluators share one mechanism: a pair
//! of sample sets (one for losing nodes, one for winning nodes) built once,
//! a random draw from the set matching the node's ground truth, and a
//! min-max normalization against the samples' own range.

use std::fs;
use std::path::Path;

use pathology_core::{random_source, PathologyError, RandomSource, Result};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Heuristic;
use crate::{Node, TreeConfig};

/// Empirical datasets of real-game static evaluation residuals.
pub const EMPIRICAL_DATASETS: &[&str] = &[
    "chess-rand-10",
    "chess-pseu-10",
    "othello-rand-10",
    "othello-pseu-10",
];

/// Evaluation samples indexed by which side is actually winning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Histogram {
    /// Samples observed when MAX is losing.
    pub losing: Vec<f64>,

    /// Samples observed when MAX is winning.
    pub winning: Vec<f64>,
}

impl Histogram {
    /// Read a histogram from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PathologyError::HistogramLoad(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| PathologyError::HistogramLoad(format!("{}: {}", path.display(), e)))
    }

    /// Draw `sample_size` samples around -1 and +1 from a noise distribution.
    fn around_signs<D, R>(noise: D, sample_size: usize, rng: &mut R) -> Self
    where
        D: Distribution<f64>,
        R: Rng,
    {
        let mut draw = |center: f64| -> Vec<f64> {
            (0..sample_size)
                .map(|_| center + noise.sample(&mut *rng))
                .collect()
        };
        let losing = draw(-1.0);
        let winning = draw(1.0);
        Self { losing, winning }
    }
}

/// Heuristic that samples a noisy evaluation from a [`Histogram`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistogramHeuristic {
    label: String,
    histogram: Histogram,
    min: f64,
    max: f64,
    rng: RandomSource,
}

impl HistogramHeuristic {
    /// Build from an explicit histogram.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if either sample set is empty or all samples
    /// are equal (the normalization range would be empty).
    pub fn from_histogram(label: &str, histogram: Histogram, seed: Option<u64>) -> Result<Self> {
        Self::with_rng(label, histogram, random_source(seed))
    }

    /// Ground truth plus Gaussian noise with standard deviation `spread`.
    pub fn gaussian(spread: f64, sample_size: usize, seed: Option<u64>) -> Result<Self> {
        check_noise(spread, sample_size)?;
        let noise = Normal::new(0.0, spread)
            .map_err(|e| PathologyError::InvalidConfig(format!("gaussian spread: {}", e)))?;
        let mut rng = random_source(seed);
        let histogram = Histogram::around_signs(noise, sample_size, &mut rng);
        Self::with_rng("gaussian", histogram, rng)
    }

    /// Ground truth plus uniform noise on `[-spread, spread]`.
    pub fn uniform(spread: f64, sample_size: usize, seed: Option<u64>) -> Result<Self> {
        check_noise(spread, sample_size)?;
        let noise = Uniform::new_inclusive(-spread, spread);
        let mut rng = random_source(seed);
        let histogram = Histogram::around_signs(noise, sample_size, &mut rng);
        Self::with_rng("uniform", histogram, rng)
    }

    /// Load the named empirical dataset from `<data_dir>/<name>.json`.
    pub fn empirical(name: &str, data_dir: &Path, seed: Option<u64>) -> Result<Self> {
        let histogram = Histogram::load(&data_dir.join(format!("{}.json", name)))?;
        Self::from_histogram(name, histogram, seed)
    }

    /// Lowest and highest sample, the normalization range.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Sampling continues from `rng`, the generator that drew the histogram
    /// for the noise variants.
    fn with_rng(label: &str, histogram: Histogram, rng: RandomSource) -> Result<Self> {
        if histogram.losing.is_empty() || histogram.winning.is_empty() {
            return Err(PathologyError::InvalidConfig(format!(
                "histogram {} has an empty sample set",
                label
            )));
        }
        let samples = || histogram.losing.iter().chain(histogram.winning.iter());
        let min = samples().copied().fold(f64::INFINITY, f64::min);
        let max = samples().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > min) {
            return Err(PathologyError::InvalidConfig(format!(
                "histogram {} has no spread",
                label
            )));
        }

        debug!(label, min, max, "built evaluation histogram");
        Ok(Self {
            label: label.to_string(),
            histogram,
            min,
            max,
            rng,
        })
    }
}

fn check_noise(spread: f64, sample_size: usize) -> Result<()> {
    if !(spread > 0.0) || !spread.is_finite() {
        return Err(PathologyError::InvalidConfig(format!(
            "noise spread must be positive, got {}",
            spread
        )));
    }
    if sample_size == 0 {
        return Err(PathologyError::InvalidConfig(
            "noise sample size must be positive".to_string(),
        ));
    }
    Ok(())
}

impl Heuristic for HistogramHeuristic {
    fn evaluate(&mut self, _tree: &TreeConfig, node: &Node) -> f64 {
        let samples = if node.minimax > 0 {
            &self.histogram.winning
        } else {
            &self.histogram.losing
        };
        let sample = samples[self.rng.gen_range(0..samples.len())];
        (sample - self.min) / (self.max - self.min)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
