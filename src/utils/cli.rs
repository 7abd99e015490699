use crate::config::OptimizeConfig;
use crate::estimate::EstimatorKind;
use crate::tuner::CoefficientSchedule;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "prokopakop-spsa")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "SPSA tuner for UCI engine evaluation parameters", long_about = None)]
pub struct Cli {
    /// Path to engine executable
    #[arg(long)]
    pub engine: PathBuf,

    /// Number of SPSA iterations
    #[arg(long, default_value_t = 100)]
    pub iterations: u32,

    /// Estimator: `match` plays games, `eval` compares evaluations
    #[arg(long, default_value_t = EstimatorKind::Match)]
    pub estimator: EstimatorKind,

    /// Shorthand for `--estimator eval`
    #[arg(long, conflicts_with = "estimator")]
    pub simple: bool,

    /// Seed for perturbations and position sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML file with `[[param]]` entries (built-in table if absent)
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Stability constant A
    #[arg(long = "big-a", default_value_t = 10.0)]
    pub stability: f64,

    /// Step size decay exponent
    #[arg(long, default_value_t = 0.602)]
    pub alpha: f64,

    /// Perturbation decay exponent
    #[arg(long, default_value_t = 0.101)]
    pub gamma: f64,

    /// Games per iteration, rounded up to an even number (match mode)
    #[arg(long, default_value_t = 100)]
    pub games_per_iter: u32,

    /// Time control, e.g. 1+0.1 (match mode)
    #[arg(long, default_value = "1+0.1")]
    pub time_control: String,

    /// Concurrent games (match mode)
    #[arg(long, default_value_t = 1)]
    pub concurrency: u32,

    /// Path to cutechess-cli (match mode)
    #[arg(long, default_value = "cutechess-cli")]
    pub cutechess: String,

    /// Where the match runner writes its games (match mode)
    #[arg(long, default_value = "spsa_games.pgn")]
    pub pgn_out: PathBuf,

    /// Wall-clock limit for one batch of games, in seconds (match mode)
    #[arg(long, default_value_t = 300)]
    pub match_timeout: u64,

    /// EPD position corpus (eval mode)
    #[arg(long, value_name = "FILE")]
    pub epd: Option<PathBuf>,

    /// Number of FEN positions to load from EPD (eval mode)
    #[arg(long, default_value_t = 500)]
    pub fen_count: usize,

    /// Positions to sample per iteration (eval mode)
    #[arg(long, default_value_t = 20)]
    pub positions_per_iter: usize,

    /// Search depth for evaluation (eval mode)
    #[arg(long, default_value_t = 4)]
    pub search_depth: u32,

    /// Wall-clock limit for one evaluation query, in seconds (eval mode)
    #[arg(long, default_value_t = 15)]
    pub eval_timeout: u64,

    /// Centipawn divisor of the eval-to-score logistic (eval mode)
    #[arg(long, default_value_t = 100.0)]
    pub eval_scale: f64,

    /// Output file
    #[arg(long, default_value = "spsa_results.json")]
    pub output: PathBuf,

    /// Save the session every N iterations (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    pub save_every: u32,
}

impl Cli {
    pub fn into_config(self) -> OptimizeConfig {
        OptimizeConfig {
            engine: self.engine,
            iterations: self.iterations,
            schedule: CoefficientSchedule {
                stability: self.stability,
                alpha: self.alpha,
                gamma: self.gamma,
            },
            seed: self.seed,
            estimator: if self.simple {
                EstimatorKind::Eval
            } else {
                self.estimator
            },
            games_per_iter: self.games_per_iter,
            time_control: self.time_control,
            concurrency: self.concurrency,
            match_runner: self.cutechess,
            pgn_out: self.pgn_out,
            match_timeout: Duration::from_secs(self.match_timeout),
            epd_path: self.epd,
            fen_count: self.fen_count,
            positions_per_iter: self.positions_per_iter,
            search_depth: self.search_depth,
            eval_timeout: Duration::from_secs(self.eval_timeout),
            eval_scale: self.eval_scale,
            params_file: self.params,
            output: self.output,
            save_every: self.save_every,
        }
    }
}
