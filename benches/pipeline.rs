use std::sync::Arc;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use cocorels::{
    detect_conflicts, Context, Dilemma, DilemmaScheduler, EngineConfig, EthicalProcessor,
    InteractionMatrix, ScoreMap, ScoringRuntime, TaskType, Taxonomy,
};

fn bench_process_dilemma(c: &mut Criterion) {
    let taxonomy = Taxonomy::standard();
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(1));

    group.bench_function("process_wisdom", |b| {
        // One processor across iterations, so resolver state accumulates.
        let mut processor = EthicalProcessor::new(EngineConfig::default());
        let dilemma = Dilemma::new("Should I report a colleague?", Context::new(), TaskType::Wisdom);
        b.iter(|| processor.process(&dilemma, &taxonomy));
    });

    group.bench_function("process_duty", |b| {
        let mut processor = EthicalProcessor::new(EngineConfig::default());
        let dilemma = Dilemma::new("Must I keep this promise?", Context::new(), TaskType::Duty);
        b.iter(|| processor.process(&dilemma, &taxonomy));
    });

    group.finish();
}

fn bench_detect_conflicts(c: &mut Criterion) {
    let taxonomy = Taxonomy::standard();
    let order = taxonomy.codes();
    let config = EngineConfig::default();
    let matrix = InteractionMatrix::build(&order, &config.interactions);
    // Alternating extremes so every overridden pair exceeds the gap threshold.
    let scores: ScoreMap = order
        .iter()
        .cloned()
        .zip([1000, 29_000].into_iter().cycle())
        .collect();

    c.bench_function("pipeline/detect_conflicts", |b| {
        b.iter(|| detect_conflicts(&order, &scores, &matrix, &config.resolution));
    });
}

fn bench_runtime_round_trip(c: &mut Criterion) {
    c.bench_function("pipeline/runtime_round_trip", |b| {
        b.iter_custom(|iters| {
            // Fresh runtime per sample so queued work does not leak between samples.
            let runtime = ScoringRuntime::new(
                DilemmaScheduler::new(EngineConfig::default()),
                Arc::new(Taxonomy::standard()),
                cocorels::ScoringRuntimeConfig { queue_capacity: 1024 },
            );

            let start = Instant::now();
            for _ in 0..iters {
                let _ = runtime
                    .enqueue("Is it fair?", Context::new(), TaskType::Wisdom)
                    .unwrap()
                    .join()
                    .unwrap();
            }
            start.elapsed()
        });
    });
}

criterion_group!(
    benches,
    bench_process_dilemma,
    bench_detect_conflicts,
    bench_runtime_round_trip
);
criterion_main!(benches);
