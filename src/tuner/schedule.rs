//! SPSA gain sequences.
//!
//! See <https://www.chessprogramming.org/SPSA#Automated_Tuning>.

/// Decay constants for the step size `a_k` and the perturbation size `c_k`:
///
///   a_k = 1 / (A + k + 1)^alpha
///   c_k = 1 / (k + 1)^gamma
///
/// The per-parameter magnitudes live on [`TunableParameter`](super::TunableParameter),
/// so the numerators here are always 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSchedule {
    /// Delays the decay of a_k in early iterations.
    pub stability: f64,
    /// Decay rate for a. 0.602
    pub alpha: f64,
    /// Decay rate for c. 0.101
    pub gamma: f64,
}

impl Default for CoefficientSchedule {
    fn default() -> Self {
        Self {
            stability: 10.0,
            alpha: 0.602,
            gamma: 0.101,
        }
    }
}

impl CoefficientSchedule {
    /// Returns `(a_k, c_k)` for the 1-based iteration `k`.
    pub fn coefficients(&self, k: u32) -> (f64, f64) {
        (self.step_size(k), self.perturbation_size(k))
    }

    pub fn step_size(&self, k: u32) -> f64 {
        1.0 / (self.stability + k as f64 + 1.0).powf(self.alpha)
    }

    pub fn perturbation_size(&self, k: u32) -> f64 {
        1.0 / (k as f64 + 1.0).powf(self.gamma)
    }
}
