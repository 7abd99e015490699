//! SPSA parameter optimizer for chess engine tuning.
//!
//! Each iteration perturbs every parameter at once, asks the estimator how the
//! plus configuration fares against the minus one, and moves the parameters
//! along the estimated gradient.
//!
//! See <https://www.chessprogramming.org/SPSA>.

use super::best::BestTracker;
use super::params::{ParameterSet, Snapshot};
use super::perturbation::PerturbationGenerator;
use super::schedule::CoefficientSchedule;
use super::session::{IterationRecord, SessionLog};
use super::step::{apply_gradient, perturb};
use crate::estimate::Estimate;
use rand::RngCore;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Iterations between full parameter dumps in the log.
const DUMP_INTERVAL: u32 = 10;

pub struct SpsaOptimizer<E: Estimate, R: RngCore = StdRng> {
    params: ParameterSet,
    schedule: CoefficientSchedule,
    signs: PerturbationGenerator<R>,
    estimator: E,
    best: BestTracker,
    log: SessionLog,
    iteration: u32,
    stop_flag: Arc<AtomicBool>,
    checkpoint: Option<(PathBuf, u32)>,
}

impl<E: Estimate, R: RngCore> SpsaOptimizer<E, R> {
    pub fn new(
        params: ParameterSet,
        schedule: CoefficientSchedule,
        signs: PerturbationGenerator<R>,
        estimator: E,
    ) -> Self {
        let initial = params.snapshot();

        Self {
            params,
            schedule,
            signs,
            estimator,
            best: BestTracker::new(initial.clone()),
            log: SessionLog::new(initial),
            iteration: 0,
            stop_flag: Arc::new(AtomicBool::new(false)),
            checkpoint: None,
        }
    }

    /// Writes the session log to `path` every `every` iterations.
    pub fn with_checkpoints(mut self, path: PathBuf, every: u32) -> Self {
        if every > 0 {
            self.checkpoint = Some((path, every));
        }
        self
    }

    /// Setting this flag stops the session after the current iteration.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn best(&self) -> &BestTracker {
        &self.best
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// One full SPSA step: perturb, score, update, track, record.
    pub fn iterate(&mut self) -> IterationRecord {
        self.iteration += 1;
        let k = self.iteration;
        let (a_k, c_k) = self.schedule.coefficients(k);

        let signs = self.signs.signs(self.params.len());
        let perturbation = perturb(&self.params, c_k, &signs);
        if !perturbation.degenerate.is_empty() {
            log::debug!(
                "  {} parameter(s) clamped to a single value this iteration",
                perturbation.degenerate.len()
            );
        }

        let scores = self
            .estimator
            .estimate(&perturbation.plus, &perturbation.minus);

        apply_gradient(&mut self.params, &perturbation, a_k, scores);

        let snapshot = self.params.snapshot();
        if self.best.observe(k, scores.plus, &snapshot) {
            log::debug!("  New best score {:.4}", scores.plus);
        }

        let record = IterationRecord {
            iteration: k,
            score_plus: scores.plus,
            score_minus: scores.minus,
            best_score: self.best.score,
            best_iteration: self.best.iteration,
            params: snapshot,
        };
        self.log.append(record.clone(), &self.best);

        record
    }

    /// Runs `iterations` steps (or until stopped) and returns the final
    /// parameter values. The best values are available through [`Self::best`].
    pub fn run(&mut self, iterations: u32) -> Snapshot {
        log::info!("Starting SPSA tuning for {} iterations...", iterations);
        log::info!(
            "Parameters: {:?}",
            self.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );

        for i in 0..iterations {
            if self.stop_flag.load(Ordering::Relaxed) {
                log::warn!("Stopped after {} of {} iterations", i, iterations);
                break;
            }

            let record = self.iterate();
            log::info!(
                "[{}/{}] Plus: {:.3}, Minus: {:.3}, Best: {:.3} @ iter {}",
                i + 1,
                iterations,
                record.score_plus,
                record.score_minus,
                record.best_score,
                record.best_iteration
            );

            if (i + 1) % DUMP_INTERVAL == 0 {
                self.log_parameters();
            }

            self.save_checkpoint();
        }

        self.params.snapshot()
    }

    fn log_parameters(&self) {
        log::info!("Current parameter values:");
        for p in self.params.iter() {
            log::info!("  {}: {}", p.name, p);
        }
    }

    fn save_checkpoint(&self) {
        if let Some((path, every)) = &self.checkpoint {
            if self.iteration % every == 0 {
                if let Err(e) = self.log.save(path) {
                    log::warn!("Failed to write checkpoint {}: {}", path.display(), e);
                }
            }
        }
    }
}
