//! Noisy measurements of how the plus configuration fares against the minus one.

pub mod engine;
pub mod evaluation;
pub mod match_play;
pub mod positions;

pub use engine::*;
pub use evaluation::*;
pub use match_play::*;
pub use positions::*;

use crate::tuner::Configuration;
use strum_macros::{Display, EnumString};

/// Win-probability-like scores for the plus and minus candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub plus: f64,
    pub minus: f64,
}

impl Scores {
    /// No information: yields a zero gradient.
    pub const NEUTRAL: Scores = Scores {
        plus: 0.5,
        minus: 0.5,
    };

    pub fn new(plus: f64, minus: f64) -> Self {
        Self { plus, minus }
    }

    pub fn is_neutral(&self) -> bool {
        self.plus == self.minus
    }
}

/// Anything that can compare two candidate configurations.
pub trait Estimate {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EstimatorKind {
    /// Full games through the external match runner.
    Match,
    /// Shallow-search evaluation differences over sampled positions.
    Eval,
}

/// The two measurement strategies, picked by configuration.
pub enum ScoreEstimator {
    Match(MatchEstimator),
    Evaluation(EvalEstimator),
}

impl ScoreEstimator {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            ScoreEstimator::Match(_) => EstimatorKind::Match,
            ScoreEstimator::Evaluation(_) => EstimatorKind::Eval,
        }
    }
}

impl Estimate for ScoreEstimator {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores {
        match self {
            ScoreEstimator::Match(estimator) => estimator.estimate(plus, minus),
            ScoreEstimator::Evaluation(estimator) => estimator.estimate(plus, minus),
        }
    }
}
