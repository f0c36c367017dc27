//! Algorithm selection by name.
//!
//! Experiments name their players with short strings:
//!
//! - `ab-<depth>`: alpha-beta
//! - `uct-<bias>-<iterations>`: classic UCT
//! - `uct_minimax-<bias>-<iterations>`: UCT with minimax backup
//! - `uct_bias-<bias>-<iterations>-<pathology_bias>`: UCT with biased ties
//! - `rand`: a uniformly random root move

use std::fmt;
use std::str::FromStr;

use pathology_core::{random_source, PathologyError, PathologyProbe, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alphabeta::{AlphaBetaPlayer, AlphaBetaResult};
use crate::config::{AlphaBetaConfig, UctConfig};
use crate::stop::StopFlag;
use crate::uct::{Uct, UctBias, UctMinimax, UctResult};

/// A parsed player description.
#[derive(Clone, Debug, PartialEq)]
pub enum Algorithm {
    Random,
    AlphaBeta {
        depth: u32,
    },
    Uct {
        bias_constant: f64,
        iterations: usize,
    },
    UctMinimax {
        bias_constant: f64,
        iterations: usize,
    },
    UctBias {
        bias_constant: f64,
        iterations: usize,
        pathology_bias: f64,
    },
}

/// What a player decided at the root, with whatever counters it keeps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub best_move: Option<usize>,
    pub utility: Option<f64>,
    pub node_count: Option<u64>,
    pub prune_count: Option<u64>,
    pub estimated_node_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<Option<usize>>,
}

impl From<AlphaBetaResult> for Decision {
    fn from(result: AlphaBetaResult) -> Self {
        Self {
            best_move: result.best_move,
            utility: Some(result.utility),
            node_count: Some(result.node_count),
            prune_count: Some(result.prune_count),
            estimated_node_count: Some(result.estimated_node_count),
            decisions: Vec::new(),
        }
    }
}

impl From<UctResult> for Decision {
    fn from(result: UctResult) -> Self {
        Self {
            best_move: result.best_move,
            utility: Some(result.utility),
            node_count: Some(result.node_count as u64),
            prune_count: None,
            estimated_node_count: None,
            decisions: result.decisions,
        }
    }
}

impl Algorithm {
    /// Check the parameters that do not depend on the game.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Algorithm::Random => Ok(()),
            Algorithm::AlphaBeta { depth } => AlphaBetaConfig::with_depth(depth).validate(),
            Algorithm::Uct {
                bias_constant,
                iterations,
            }
            | Algorithm::UctMinimax {
                bias_constant,
                iterations,
            } => UctConfig::new(bias_constant, iterations).validate(0),
            Algorithm::UctBias {
                bias_constant,
                iterations,
                pathology_bias,
            } => {
                UctConfig::new(bias_constant, iterations).validate(0)?;
                if !(0.0..=1.0).contains(&pathology_bias) {
                    return Err(PathologyError::InvalidConfig(format!(
                        "pathology bias must be in [0, 1], got {}",
                        pathology_bias
                    )));
                }
                Ok(())
            }
        }
    }

    /// Decide a root move for `game`.
    ///
    /// UCT variants record their per-iteration decisions when
    /// `record_decisions` is set.
    pub fn run<G: PathologyProbe>(
        &self,
        game: &mut G,
        seed: Option<u64>,
        record_decisions: bool,
    ) -> Result<Decision> {
        self.run_until_stopped(game, seed, record_decisions, &StopFlag::default())
    }

    /// Like [`Algorithm::run`], but fails with `Cancelled` as soon as the
    /// search notices `stop` raised.
    pub fn run_until_stopped<G: PathologyProbe>(
        &self,
        game: &mut G,
        seed: Option<u64>,
        record_decisions: bool,
        stop: &StopFlag,
    ) -> Result<Decision> {
        let uct_config = |bias_constant: f64, iterations: usize| {
            let mut config = UctConfig::new(bias_constant, iterations);
            config.seed = seed;
            config.record_decisions = record_decisions;
            config
        };

        match *self {
            Algorithm::Random => {
                let root = game.root();
                if game.is_terminal(root)? {
                    return Ok(Decision::default());
                }
                let mv = random_source(seed).gen_range(0..game.branching_factor());
                Ok(Decision {
                    best_move: Some(mv),
                    ..Default::default()
                })
            }
            Algorithm::AlphaBeta { depth } => {
                let config = AlphaBetaConfig {
                    depth,
                    seed,
                    randomize_moves: false,
                };
                let mut player = AlphaBetaPlayer::new(game, config)?.with_stop_flag(stop.clone());
                Ok(player.search(game)?.into())
            }
            Algorithm::Uct {
                bias_constant,
                iterations,
            } => {
                let mut player = Uct::new(game, uct_config(bias_constant, iterations))?
                    .with_stop_flag(stop.clone());
                Ok(player.search(game)?.into())
            }
            Algorithm::UctMinimax {
                bias_constant,
                iterations,
            } => {
                let mut player = UctMinimax::new(game, uct_config(bias_constant, iterations))?
                    .with_stop_flag(stop.clone());
                Ok(player.search(game)?.into())
            }
            Algorithm::UctBias {
                bias_constant,
                iterations,
                pathology_bias,
            } => {
                let mut player = UctBias::with_pathology_bias(
                    game,
                    uct_config(bias_constant, iterations),
                    pathology_bias,
                )?
                .with_stop_flag(stop.clone());
                Ok(player.search(game)?.into())
            }
        }
    }
}

impl FromStr for Algorithm {
    type Err = PathologyError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || PathologyError::UnknownAlgorithm(s.to_string());
        let mut parts = s.split('-');
        let name = parts.next().ok_or_else(unknown)?;
        let params: Vec<&str> = parts.collect();

        fn parse<T: FromStr>(value: &str, s: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| PathologyError::UnknownAlgorithm(s.to_string()))
        }

        let algorithm = match (name, params.as_slice()) {
            ("rand", []) => Algorithm::Random,
            ("ab", [depth]) => Algorithm::AlphaBeta {
                depth: parse(depth, s)?,
            },
            ("uct", [c, n]) => Algorithm::Uct {
                bias_constant: parse(c, s)?,
                iterations: parse(n, s)?,
            },
            ("uct_minimax", [c, n]) => Algorithm::UctMinimax {
                bias_constant: parse(c, s)?,
                iterations: parse(n, s)?,
            },
            ("uct_bias", [c, n, p]) => Algorithm::UctBias {
                bias_constant: parse(c, s)?,
                iterations: parse(n, s)?,
                pathology_bias: parse(p, s)?,
            },
            _ => return Err(unknown()),
        };
        algorithm.validate()?;
        Ok(algorithm)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Random => write!(f, "rand"),
            Algorithm::AlphaBeta { depth } => write!(f, "ab-{}", depth),
            Algorithm::Uct {
                bias_constant,
                iterations,
            } => write!(f, "uct-{}-{}", bias_constant, iterations),
            Algorithm::UctMinimax {
                bias_constant,
                iterations,
            } => write!(f, "uct_minimax-{}-{}", bias_constant, iterations),
            Algorithm::UctBias {
                bias_constant,
                iterations,
                pathology_bias,
            } => write!(
                f,
                "uct_bias-{}-{}-{}",
                bias_constant, iterations, pathology_bias
            ),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Names of the predefined algorithm sets.
pub const ALGORITHM_SETS: &[&str] = &[
    "full",
    "lite",
    "ab-sm",
    "b6",
    "deep",
    "dirty",
    "uct",
    "uct-lite",
    "uct-tiny",
    "uct-minimax-lite",
    "uct-minimax-tiny",
];

const BIAS_CONSTANTS: &[&str] = &["0.001", "0.01", "0.1", "1", "10"];
const ITERATION_BUDGETS: &[usize] = &[100_000, 10_000, 1_000, 100, 10];

/// Expand a predefined set into its algorithms.
pub fn algorithm_set(name: &str) -> Result<Vec<Algorithm>> {
    let uct_grid = |budgets: &[usize]| -> Vec<String> {
        BIAS_CONSTANTS
            .iter()
            .flat_map(|c| budgets.iter().map(move |n| format!("uct-{}-{}", c, n)))
            .collect()
    };
    let fixed = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };

    let names = match name {
        "full" => {
            let mut names = fixed(&["ab-8", "ab-6", "ab-4", "ab-2"]);
            names.extend(uct_grid(ITERATION_BUDGETS));
            names
        }
        "lite" => fixed(&[
            "ab-5", "ab-4", "ab-3", "ab-2", "ab-1", "uct-1-512", "uct-1-128", "uct-1-32",
            "uct-1-8",
        ]),
        "ab-sm" => fixed(&["ab-8", "ab-6", "ab-4", "ab-2"]),
        "b6" => fixed(&[
            "ab-6",
            "ab-4",
            "ab-2",
            "uct-0.01-10000",
            "uct-0.5-10000",
            "uct-0.99-10000",
        ]),
        "deep" => fixed(&[
            "ab-8",
            "uct-0.001-10000",
            "uct-0.01-10000",
            "uct-0.1-10000",
            "uct-1-10000",
            "uct-10-10000",
        ]),
        "dirty" => fixed(&["uct-0.001-100000", "uct-0.001-10"]),
        "uct" => uct_grid(ITERATION_BUDGETS),
        "uct-lite" => uct_grid(&ITERATION_BUDGETS[1..]),
        "uct-tiny" => fixed(&["uct-1-10"]),
        "uct-minimax-lite" => BIAS_CONSTANTS
            .iter()
            .chain(std::iter::once(&"1000000"))
            .map(|c| format!("uct_minimax-{}-10000", c))
            .collect(),
        "uct-minimax-tiny" => fixed(&["uct_minimax-1-10"]),
        _ => return Err(PathologyError::UnknownAlgorithm(name.to_string())),
    };

    names.iter().map(|s| s.parse()).collect()
}
