use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use prokopakop_spsa::{
    CoefficientSchedule, Configuration, Estimate, ParameterSet, PerturbationGenerator, Scores,
    SpsaOptimizer,
};

/// Scores plus by the sum of its option values, so every iteration moves something.
struct SumEstimator;

impl Estimate for SumEstimator {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores {
        let diff: f64 = plus.iter().map(|(_, v)| v).sum::<f64>()
            - minus.iter().map(|(_, v)| v).sum::<f64>();
        let score_plus = 1.0 / (1.0 + 10f64.powf(-diff / 100.0));
        Scores::new(score_plus, 1.0 - score_plus)
    }
}

fn iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsa_iterations");

    // The estimator is free here, so this measures the optimizer's own bookkeeping
    for iterations in [10, 100] {
        group.bench_with_input(
            BenchmarkId::new("iterations", iterations),
            &iterations,
            |b, &iterations| {
                b.iter(|| {
                    let mut optimizer = SpsaOptimizer::new(
                        ParameterSet::default(),
                        CoefficientSchedule::default(),
                        PerturbationGenerator::seeded(42),
                        SumEstimator,
                    );
                    black_box(optimizer.run(iterations))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, iteration_benchmark);
criterion_main!(benches);
