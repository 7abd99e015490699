use super::{EngineSession, Estimate, Scores};
use crate::tuner::Configuration;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Proxy estimator: compares shallow-search evaluations of both candidates on
/// a random sample of positions instead of playing games.
///
/// Cheap, but it measures evaluation drift rather than playing strength.
pub struct EvalEstimator {
    engine: Box<dyn EngineSession>,
    positions: Vec<String>,
    positions_per_iter: usize,
    depth: u32,
    /// Centipawn divisor of the logistic mapping.
    scale: f64,
    rng: StdRng,
}

impl EvalEstimator {
    pub fn new(
        engine: Box<dyn EngineSession>,
        positions: Vec<String>,
        positions_per_iter: usize,
        depth: u32,
        scale: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            engine,
            positions,
            positions_per_iter,
            depth,
            scale,
            rng,
        }
    }

    pub fn seeded(
        engine: Box<dyn EngineSession>,
        positions: Vec<String>,
        positions_per_iter: usize,
        depth: u32,
        scale: f64,
        seed: u64,
    ) -> Self {
        Self::new(
            engine,
            positions,
            positions_per_iter,
            depth,
            scale,
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    fn sample(&mut self) -> Vec<usize> {
        let amount = self.positions_per_iter.min(self.positions.len());
        index::sample(&mut self.rng, self.positions.len(), amount).into_vec()
    }
}

/// Maps an average centipawn advantage to an expected score.
pub fn logistic(avg_diff: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-avg_diff / scale))
}

impl Estimate for EvalEstimator {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores {
        let sample = self.sample();
        if sample.is_empty() {
            return Scores::NEUTRAL;
        }

        let mut total_diff = 0.0;
        let mut failures = 0;

        for &i in &sample {
            let fen = &self.positions[i];
            let eval_plus = self.engine.evaluate(plus, fen, self.depth);
            let eval_minus = self.engine.evaluate(minus, fen, self.depth);

            if eval_plus.is_none() || eval_minus.is_none() {
                failures += 1;
            }

            // Engine output is untrusted, so stay out of i32 arithmetic
            let diff = eval_plus.unwrap_or(0) as f64 - eval_minus.unwrap_or(0) as f64;
            log::trace!("  {}: {:+}", fen, diff);
            total_diff += diff;
        }

        if failures == sample.len() {
            log::warn!("Every evaluation query failed, treating iteration as a draw");
            return Scores::NEUTRAL;
        }

        let avg_diff = total_diff / sample.len() as f64;
        let score_plus = logistic(avg_diff, self.scale);

        log::debug!(
            "  Eval diff over {} positions: {:+.1}cp ({} failed queries)",
            sample.len(),
            avg_diff,
            failures
        );

        Scores::new(score_plus, 1.0 - score_plus)
    }
}
