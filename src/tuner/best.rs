use super::params::Snapshot;

/// Keeps the parameter snapshot taken after the iteration with the highest
/// plus-score. Ties keep the earlier one.
#[derive(Debug, Clone)]
pub struct BestTracker {
    pub score: f64,
    pub iteration: u32,
    pub params: Snapshot,
}

impl BestTracker {
    /// Starts from the neutral prior of 0.5 with the initial parameters.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            score: 0.5,
            iteration: 0,
            params: initial,
        }
    }

    /// Returns true if this iteration became the new best.
    pub fn observe(&mut self, iteration: u32, score_plus: f64, params: &Snapshot) -> bool {
        if score_plus > self.score {
            self.score = score_plus;
            self.iteration = iteration;
            self.params = params.clone();
            true
        } else {
            false
        }
    }
}
