use prokopakop_spsa::{
    CoefficientSchedule, Configuration, EngineSession, Estimate, EstimatorKind, EvalEstimator,
    MatchEstimator, MatchResult, MatchRunner, ParameterSet, PerturbationGenerator, ScoreEstimator,
    Scores, SessionReport, SpsaOptimizer, TunableParameter,
};
use std::sync::atomic::Ordering;

/// Deterministic objective: plus wins in proportion to how much closer it is
/// to a hidden optimum than minus.
struct QuadraticBowl {
    optimum: Vec<(String, f64)>,
}

impl QuadraticBowl {
    fn distance(&self, config: &Configuration) -> f64 {
        self.optimum
            .iter()
            .map(|(name, target)| {
                let v = config.get(name).unwrap_or(*target);
                (v - target) * (v - target)
            })
            .sum()
    }
}

impl Estimate for QuadraticBowl {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores {
        let advantage = self.distance(minus) - self.distance(plus);
        let score_plus = 1.0 / (1.0 + (-advantage / 50.0).exp());
        Scores::new(score_plus, 1.0 - score_plus)
    }
}

fn bowl_params() -> ParameterSet {
    ParameterSet::new(vec![
        TunableParameter::new("Alpha", 20.0, 0.0, 100.0).with_scales(Some(5.0), Some(40.0)),
        TunableParameter::new("Beta", 80.0, 0.0, 100.0).with_scales(Some(5.0), Some(40.0)),
        TunableParameter::new("Gamma", 50.0, 0.0, 100.0).with_scales(Some(5.0), Some(40.0)),
    ])
    .unwrap()
}

fn bowl() -> QuadraticBowl {
    QuadraticBowl {
        optimum: vec![
            ("Alpha".to_string(), 60.0),
            ("Beta".to_string(), 40.0),
            ("Gamma".to_string(), 50.0),
        ],
    }
}

fn bowl_optimizer(seed: u64) -> SpsaOptimizer<QuadraticBowl> {
    SpsaOptimizer::new(
        bowl_params(),
        CoefficientSchedule::default(),
        PerturbationGenerator::seeded(seed),
        bowl(),
    )
}

#[test]
fn test_fixed_seed_gives_identical_trajectories() {
    let mut first = bowl_optimizer(2024);
    let mut second = bowl_optimizer(2024);

    let final_first = first.run(40);
    let final_second = second.run(40);

    assert_eq!(final_first, final_second);
    assert_eq!(first.log().history(), second.log().history());

    // Bit-identical, not merely close
    for (a, b) in first.log().history().iter().zip(second.log().history()) {
        for (name, value) in &a.params {
            assert_eq!(value.to_bits(), b.params[name].to_bits());
        }
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut first = bowl_optimizer(1);
    let mut second = bowl_optimizer(2);

    assert_ne!(first.run(20), second.run(20));
}

#[test]
fn test_moves_toward_optimum() {
    let mut optimizer = bowl_optimizer(7);
    let initial_distance = bowl().distance(&to_config(&optimizer.params().snapshot()));

    let final_params = optimizer.run(200);
    let final_distance = bowl().distance(&to_config(&final_params));

    assert!(
        final_distance < initial_distance,
        "distance went from {} to {}",
        initial_distance,
        final_distance
    );
}

fn to_config(snapshot: &prokopakop_spsa::Snapshot) -> Configuration {
    Configuration::new(snapshot.iter().map(|(k, v)| (k.clone(), *v)).collect())
}

#[test]
fn test_history_is_ordered_and_complete() {
    let mut optimizer = bowl_optimizer(9);
    optimizer.run(15);

    let iterations: Vec<u32> = optimizer.log().history().iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, (1..=15).collect::<Vec<_>>());
    assert_eq!(optimizer.iteration(), 15);

    for record in optimizer.log().history() {
        for p in bowl_params().iter() {
            let v = record.params[&p.name];
            assert!(p.min_val <= v && v <= p.max_val);
        }
    }
}

#[test]
fn test_stop_flag_ends_between_iterations() {
    let mut optimizer = bowl_optimizer(3);
    optimizer.run(5);

    optimizer.stop_flag().store(true, Ordering::Relaxed);
    optimizer.run(50);

    assert_eq!(optimizer.log().len(), 5);
}

#[test]
fn test_checkpoints_written_periodically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");

    let mut optimizer = bowl_optimizer(5).with_checkpoints(path.clone(), 4);
    optimizer.run(10);

    // Last checkpoint was taken after iteration 8
    let report = SessionReport::load(&path).unwrap();
    assert_eq!(report.summary.total_iterations, 8);
    assert_eq!(report.history.len(), 8);
    assert_eq!(report.initial_params.get("Alpha"), Some(&20));
}

// ============================================================================
// Estimator variants through the optimizer
// ============================================================================

/// Plus always wins a fixed share of the games; counts calls.
struct SkewedRunner {
    calls: u32,
}

impl MatchRunner for SkewedRunner {
    fn play(
        &mut self,
        _plus: &Configuration,
        _minus: &Configuration,
        games: u32,
    ) -> Option<MatchResult> {
        self.calls += 1;
        if self.calls % 3 == 0 {
            return None;
        }
        Some(MatchResult {
            wins_plus: games / 2,
            wins_minus: games / 4,
            draws: games - games / 2 - games / 4,
        })
    }
}

#[test]
fn test_match_variant_through_optimizer() {
    let estimator =
        ScoreEstimator::Match(MatchEstimator::new(Box::new(SkewedRunner { calls: 0 }), 41));
    assert_eq!(estimator.kind(), EstimatorKind::Match);

    let mut optimizer = SpsaOptimizer::new(
        ParameterSet::default(),
        CoefficientSchedule::default(),
        PerturbationGenerator::seeded(8),
        estimator,
    );
    optimizer.run(6);

    let history = optimizer.log().history();
    // Every third batch fails and is recorded as a neutral pair
    assert_eq!(history[2].score_plus, 0.5);
    assert_eq!(history[2].score_minus, 0.5);
    assert_eq!(history[1].params, history[2].params);
    assert!(history[0].score_plus > 0.5);
}

struct SilentEngine;

impl EngineSession for SilentEngine {
    fn evaluate(&mut self, _config: &Configuration, _fen: &str, _depth: u32) -> Option<i32> {
        None
    }
}

#[test]
fn test_eval_variant_without_answers_is_idle() {
    let estimator = ScoreEstimator::Evaluation(EvalEstimator::seeded(
        Box::new(SilentEngine),
        vec!["8/8/8/8/8/8/8/K6k w - - 0 1".to_string()],
        20,
        4,
        100.0,
        1,
    ));
    assert_eq!(estimator.kind(), EstimatorKind::Eval);

    let params = ParameterSet::default();
    let initial = params.snapshot();
    let mut optimizer = SpsaOptimizer::new(
        params,
        CoefficientSchedule::default(),
        PerturbationGenerator::seeded(8),
        estimator,
    );

    assert_eq!(optimizer.run(5), initial);
}
