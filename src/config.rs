use crate::error::TunerError;
use crate::estimate::{
    CutechessRunner, EstimatorKind, EvalEstimator, MatchEstimator, MatchSettings, ScoreEstimator,
    UciEngine, default_corpus_candidates, load_positions,
};
use crate::tuner::{CoefficientSchedule, ParameterSet, PerturbationGenerator, SpsaOptimizer};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a tuning session needs to know before it starts.
#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub engine: PathBuf,
    pub iterations: u32,
    pub schedule: CoefficientSchedule,
    /// Fixes the perturbation and sampling RNGs; random if absent.
    pub seed: Option<u64>,
    pub estimator: EstimatorKind,

    // Match-based estimation
    pub games_per_iter: u32,
    pub time_control: String,
    pub concurrency: u32,
    pub match_runner: String,
    pub pgn_out: PathBuf,
    pub match_timeout: Duration,

    // Evaluation-based estimation
    pub epd_path: Option<PathBuf>,
    pub fen_count: usize,
    pub positions_per_iter: usize,
    pub search_depth: u32,
    pub eval_timeout: Duration,
    /// Logistic divisor turning a centipawn difference into a score.
    pub eval_scale: f64,

    pub params_file: Option<PathBuf>,
    pub output: PathBuf,
    /// Checkpoint interval in iterations; 0 saves only at the end.
    pub save_every: u32,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            engine: PathBuf::new(),
            iterations: 100,
            schedule: CoefficientSchedule::default(),
            seed: None,
            estimator: EstimatorKind::Match,
            games_per_iter: 100,
            time_control: "1+0.1".to_string(),
            concurrency: 1,
            match_runner: "cutechess-cli".to_string(),
            pgn_out: PathBuf::from("spsa_games.pgn"),
            match_timeout: Duration::from_secs(300),
            epd_path: None,
            fen_count: 500,
            positions_per_iter: 20,
            search_depth: 4,
            eval_timeout: Duration::from_secs(15),
            eval_scale: 100.0,
            params_file: None,
            output: PathBuf::from("spsa_results.json"),
            save_every: 0,
        }
    }
}

impl OptimizeConfig {
    /// Rejects settings that would make the schedule or the estimators meaningless.
    pub fn validate(&self) -> Result<(), TunerError> {
        if !self.engine.exists() {
            return Err(TunerError::EngineNotFound(self.engine.clone()));
        }

        let schedule = &self.schedule;
        if !(schedule.alpha > 0.0 && schedule.gamma > 0.0 && schedule.stability >= 0.0) {
            return Err(TunerError::Config(
                "alpha and gamma must be positive, A non-negative".to_string(),
            ));
        }
        if self.games_per_iter == 0 {
            return Err(TunerError::Config("games per iteration must be positive".to_string()));
        }
        if self.concurrency == 0 {
            return Err(TunerError::Config("concurrency must be positive".to_string()));
        }
        if self.positions_per_iter == 0 || self.search_depth == 0 {
            return Err(TunerError::Config(
                "positions per iteration and search depth must be positive".to_string(),
            ));
        }
        if !(self.eval_scale > 0.0) {
            return Err(TunerError::Config("eval scale must be positive".to_string()));
        }

        Ok(())
    }

    pub fn load_params(&self) -> Result<ParameterSet, TunerError> {
        match &self.params_file {
            Some(path) => {
                log::info!("Loading parameters from {}", path.display());
                ParameterSet::load(path)
            }
            None => Ok(ParameterSet::default()),
        }
    }

    /// Builds the estimator selected by `estimator`, spawning nothing yet.
    pub fn build_estimator(&self, seed: u64) -> Result<ScoreEstimator, TunerError> {
        match self.estimator {
            EstimatorKind::Match => {
                let runner = CutechessRunner::new(
                    &self.match_runner,
                    MatchSettings {
                        engine: self.engine.clone(),
                        time_control: self.time_control.clone(),
                        concurrency: self.concurrency,
                        pgn_out: self.pgn_out.clone(),
                        timeout: self.match_timeout,
                    },
                )?;
                Ok(ScoreEstimator::Match(MatchEstimator::new(
                    Box::new(runner),
                    self.games_per_iter,
                )))
            }
            EstimatorKind::Eval => {
                let engine = UciEngine::new(&self.engine, self.eval_timeout)?;
                let candidates = match &self.epd_path {
                    Some(path) => vec![path.clone()],
                    None => default_corpus_candidates(engine.path()),
                };
                let positions = load_positions(&candidates, self.fen_count);

                Ok(ScoreEstimator::Evaluation(EvalEstimator::seeded(
                    Box::new(engine),
                    positions,
                    self.positions_per_iter,
                    self.search_depth,
                    self.eval_scale,
                    seed,
                )))
            }
        }
    }

    /// Validates the configuration and wires up a ready-to-run optimizer.
    pub fn build_optimizer(&self) -> Result<SpsaOptimizer<ScoreEstimator>, TunerError> {
        self.validate()?;

        let params = self.load_params()?;
        let seed = self.seed.unwrap_or_else(rand::random);
        log::info!("Seed: {}", seed);

        // Sampling gets its own stream so the sign sequence does not depend on the estimator
        let estimator = self.build_estimator(seed.wrapping_add(1))?;
        let signs = PerturbationGenerator::seeded(seed);

        Ok(
            SpsaOptimizer::new(params, self.schedule, signs, estimator)
                .with_checkpoints(self.output.clone(), self.save_every),
        )
    }
}
