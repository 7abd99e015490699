use super::params::{Configuration, ParameterSet};
use crate::estimate::Scores;

/// The two candidate configurations of one iteration, plus what is needed to
/// turn their scores back into an update.
#[derive(Debug, Clone)]
pub struct Perturbation {
    pub plus: Configuration,
    pub minus: Configuration,
    pub signs: Vec<f64>,
    pub c_k: f64,
    /// Indices of parameters where clamping moved plus or minus off its
    /// unclamped position.
    pub degenerate: Vec<usize>,
}

/// Builds `theta + c_k * c * delta` and `theta - c_k * c * delta`, clamped.
pub fn perturb(params: &ParameterSet, c_k: f64, signs: &[f64]) -> Perturbation {
    debug_assert_eq!(params.len(), signs.len());

    let mut plus = Vec::with_capacity(params.len());
    let mut minus = Vec::with_capacity(params.len());
    let mut degenerate = Vec::new();

    for (i, (param, &sign)) in params.iter().zip(signs).enumerate() {
        let offset = c_k * param.perturbation * sign;
        let (raw_up, raw_down) = (param.value + offset, param.value - offset);
        let up = param.clamp(raw_up);
        let down = param.clamp(raw_down);

        if up != raw_up || down != raw_down {
            degenerate.push(i);
        }

        plus.push((param.name.clone(), up));
        minus.push((param.name.clone(), down));
    }

    Perturbation {
        plus: Configuration::new(plus),
        minus: Configuration::new(minus),
        signs: signs.to_vec(),
        c_k,
        degenerate,
    }
}

/// Applies the two-point SPSA gradient estimate to every parameter.
///
/// The divisor is the unclamped displacement `2 * c_k * c * delta`, so clamped
/// candidates never produce a near-zero denominator. Neutral scores give a
/// zero gradient and leave the set untouched.
pub fn apply_gradient(
    params: &mut ParameterSet,
    perturbation: &Perturbation,
    a_k: f64,
    scores: Scores,
) {
    let diff = scores.plus - scores.minus;

    for (param, &sign) in params.iter_mut().zip(&perturbation.signs) {
        let gradient = diff / (2.0 * perturbation.c_k * param.perturbation * sign);
        let step = a_k * param.step * gradient;
        param.value = param.clamp(param.value + step);
    }
}
