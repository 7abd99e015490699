use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Draws the Bernoulli +/-1 perturbation vector for each iteration.
///
/// The generator owns its RNG so a fixed seed replays the same sign sequence.
#[derive(Debug, Clone)]
pub struct PerturbationGenerator<R: RngCore = StdRng> {
    rng: R,
}

impl PerturbationGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> PerturbationGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One sign per parameter, in parameter order. Never yields 0.
    pub fn signs(&mut self, count: usize) -> Vec<f64> {
        (0..count)
            .map(|_| if self.rng.random_bool(0.5) { 1.0 } else { -1.0 })
            .collect()
    }
}
