//! Experiment driver for search-pathology studies.
//!
//! Plays a batch of games on hidden synthetic trees, lets every algorithm of
//! a set decide the root move of each game, and writes the decisions with
//! their ground-truth scoring to `<log-dir>/<batch-id>/<job-id>/results.json`.

mod experiment;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use experiment::{ExperimentConfig, GameResult, GameType};
use pathology_core::FlipRate;
use pathology_games::{HeuristicParams, TreeConfig};
use pathology_search::{algorithm_set, Algorithm, ALGORITHM_SETS};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Compare search algorithms on synthetic game trees.
#[derive(Parser, Debug, Serialize)]
#[command(name = "pathology-run")]
#[command(about = "Run alpha-beta and UCT players on hidden synthetic game trees")]
struct Cli {
    /// Name of this job's output directory.
    job_id: String,

    /// Directory grouping related jobs.
    #[arg(long, default_value = "default-batch")]
    batch_id: String,

    /// `crit` for flip-rate trees, `p` for P-games.
    #[arg(long, value_enum, default_value = "crit")]
    game_type: GameType,

    /// Flip rates of MAX and MIN.
    #[arg(
        long,
        num_args = 2,
        value_names = ["MAX_RATE", "MIN_RATE"],
        default_values_t = [1.0, 1.0]
    )]
    flip_rate: Vec<f64>,

    /// Branching factor of the tree.
    #[arg(long, default_value = "2")]
    b_factor: usize,

    /// Depth of the tree.
    #[arg(long, default_value = "10000")]
    game_depth: u32,

    /// Predefined set of algorithms to compare.
    #[arg(long, default_value = "full")]
    algo_set: String,

    /// Individual algorithms, overriding the set (e.g. `ab-4`, `uct-1-1000`).
    #[arg(long = "algo", conflicts_with = "algo_set")]
    algos: Vec<String>,

    /// Heuristic used at the search cutoff of `crit` trees.
    #[arg(long, default_value = "perfect")]
    heuristic: String,

    /// Noise spread of the Gaussian and uniform heuristics.
    #[arg(long, default_value = "0.25")]
    stdev: f64,

    /// Samples drawn to build a noise distribution.
    #[arg(long, default_value = "100000")]
    num_samples: usize,

    /// Number of games to play.
    #[arg(long, default_value = "1")]
    num_games: usize,

    /// Timeout of each search, in seconds.
    #[arg(long, default_value = "1800")]
    timeout: u64,

    /// Base seed; game `i` uses `seed + 1000 * i`.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding empirical heuristic histograms.
    #[arg(long, default_value = "data/heuristics")]
    data_dir: PathBuf,

    /// Root of the output directories.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Record each UCT player's greedy root move after every iteration.
    #[arg(long)]
    record_decisions: bool,

    /// Keep each game's final tree snapshot next to the results.
    #[arg(long)]
    keep_snapshots: bool,

    /// Log level, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn algorithms(&self) -> Result<Vec<Algorithm>> {
        if self.algos.is_empty() {
            algorithm_set(&self.algo_set).with_context(|| {
                format!(
                    "Unknown algorithm set {} (expected one of {})",
                    self.algo_set,
                    ALGORITHM_SETS.join(", ")
                )
            })
        } else {
            self.algos
                .iter()
                .map(|s| s.parse().with_context(|| format!("Invalid algorithm {}", s)))
                .collect()
        }
    }

    fn experiment_config(&self) -> Result<ExperimentConfig> {
        ensure!(self.flip_rate.len() == 2, "--flip-rate takes exactly two values");
        let flip_rate = FlipRate::new(self.flip_rate[0], self.flip_rate[1])?;
        let tree = TreeConfig::new(self.b_factor, self.game_depth).with_flip_rate(flip_rate);
        tree.validate()?;

        Ok(ExperimentConfig {
            game_type: self.game_type,
            tree,
            heuristic: self.heuristic.clone(),
            heuristic_params: HeuristicParams {
                spread: self.stdev,
                sample_size: self.num_samples,
                data_dir: self.data_dir.clone(),
                seed: None,
            },
            algorithms: self.algorithms()?,
            timeout: Duration::from_secs(self.timeout),
            record_decisions: self.record_decisions,
        })
    }

    fn output_dir(&self) -> PathBuf {
        self.log_dir.join(&self.batch_id).join(&self.job_id)
    }
}

/// Contents of `results.json`.
#[derive(Serialize)]
struct RunResults<'a> {
    args: &'a Cli,
    games: Vec<GameResult>,
}

/// Initialize tracing with the given log level.
fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(())
}

fn write_results(cli: &Cli, games: Vec<GameResult>) -> Result<PathBuf> {
    let path = cli.output_dir().join("results.json");
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let results = RunResults { args: cli, games };
    serde_json::to_writer_pretty(BufWriter::new(file), &results)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = cli.experiment_config()?;
    let output = cli.output_dir();
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    info!(
        job = %cli.job_id,
        batch = %cli.batch_id,
        game_type = ?config.game_type,
        b = config.tree.branching_factor,
        depth = config.tree.depth,
        algorithms = config.algorithms.len(),
        games = cli.num_games,
        "starting experiment"
    );
    let start = Instant::now();

    let outcomes = (0..cli.num_games)
        .into_par_iter()
        .map(|id| {
            let seed = cli.seed.map(|s| s.wrapping_add(id as u64 * 1000));
            experiment::run_game(&config, id, seed)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut games = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if cli.keep_snapshots {
            let path = output.join(format!("game_{:06}.msgpack", outcome.result.id));
            fs::write(&path, &outcome.snapshot)
                .with_context(|| format!("Failed to write snapshot {:?}", path))?;
        }
        games.push(outcome.result);
    }

    for (algo, rate) in experiment::optimal_rates(&games) {
        info!(%algo, optimal_rate = rate, "summary");
    }

    let path = write_results(cli, games)?;
    info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        results = ?path,
        "experiment complete"
    );
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    run(&cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["pathology-run"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["job"]);
        assert_eq!(cli.batch_id, "default-batch");
        assert_eq!(cli.game_type, GameType::Crit);
        assert_eq!(cli.flip_rate, vec![1.0, 1.0]);
        assert_eq!(cli.b_factor, 2);
        assert_eq!(cli.game_depth, 10_000);
        assert_eq!(cli.timeout, 1800);
        assert_eq!(cli.algorithms().unwrap().len(), 29);
        assert_eq!(cli.output_dir(), PathBuf::from("logs/default-batch/job"));
    }

    #[test]
    fn test_explicit_algorithms_override_set() {
        let cli = parse(&["job", "--algo", "ab-3", "--algo", "uct-1-100"]);
        let algorithms = cli.algorithms().unwrap();
        assert_eq!(algorithms.len(), 2);
        assert_eq!(algorithms[0].to_string(), "ab-3");
        let argv = ["pathology-run", "job", "--algo", "ab-3", "--algo-set", "lite"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cli = parse(&["job", "--flip-rate", "0.9", "0.1"]);
        assert!(cli.experiment_config().is_err());
        let cli = parse(&["job", "--b-factor", "1"]);
        assert!(cli.experiment_config().is_err());
        let cli = parse(&["job", "--algo", "mcts-5"]);
        assert!(cli.experiment_config().is_err());
        let cli = parse(&["job", "--algo-set", "enormous"]);
        assert!(cli.experiment_config().is_err());
    }

    #[test]
    fn test_run_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_str().unwrap();
        let cli = parse(&[
            "job-1",
            "--batch-id",
            "batch",
            "--game-depth",
            "30",
            "--algo",
            "ab-2",
            "--algo",
            "uct-1-20",
            "--num-games",
            "3",
            "--seed",
            "7",
            "--log-dir",
            log_dir,
            "--keep-snapshots",
        ]);

        let path = run(&cli).unwrap();
        assert_eq!(path, dir.path().join("batch/job-1/results.json"));

        let json: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(json["args"]["job_id"], "job-1");
        let games = json["games"].as_array().unwrap();
        assert_eq!(games.len(), 3);
        for game in games {
            assert_eq!(game["players"].as_array().unwrap().len(), 2);
            assert_eq!(game["move_utilities"].as_array().unwrap().len(), 2);
        }
        assert!(dir.path().join("batch/job-1/game_000002.msgpack").exists());
    }
}
