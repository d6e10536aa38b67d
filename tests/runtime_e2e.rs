use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cocorels::{
    ConflictResolver, Context, DecayConfig, Dilemma, DilemmaScheduler, EngineConfig, EthicalProcessor,
    ScoringRuntime, ScoringRuntimeConfig, StaticGuard, TaskType, Taxonomy,
};

fn seeded_runtime() -> ScoringRuntime {
    let config = EngineConfig {
        decay: DecayConfig { fault_probability: 0.0 },
        ..EngineConfig::default()
    };
    let resolver = ConflictResolver::with_seed(config.decay, 5);
    ScoringRuntime::with_processor(
        EthicalProcessor::with_resolver(config, resolver),
        Arc::new(Taxonomy::standard()),
    )
}

#[test]
fn runtime_matches_direct_scheduler() {
    let taxonomy = Taxonomy::standard();
    let queries = ["alpha", "beta", "gamma", "delta"];

    let rt = seeded_runtime();
    let via_runtime: Vec<_> = queries
        .iter()
        .map(|q| rt.process(Dilemma::new(*q, Context::new(), TaskType::Wisdom)).unwrap())
        .map(|o| o.into_report().unwrap())
        .collect();

    let config = EngineConfig {
        decay: DecayConfig { fault_probability: 0.0 },
        ..EngineConfig::default()
    };
    let resolver = ConflictResolver::with_seed(config.decay, 5);
    let mut scheduler = DilemmaScheduler::with_processor(EthicalProcessor::with_resolver(config, resolver));
    for q in queries {
        scheduler.enqueue(q, Context::new(), TaskType::Wisdom);
    }
    let direct: Vec<_> = scheduler
        .process_all(&taxonomy)
        .into_iter()
        .map(|o| o.into_report().unwrap())
        .collect();

    for (r, d) in via_runtime.iter().zip(&direct) {
        assert_eq!(r.scores, d.scores);
        assert_eq!(r.conflicts, d.conflicts);
        assert!((r.momentum - d.momentum).abs() < 1e-12);
    }

    let state = rt.resolver_state().unwrap();
    assert_eq!(&state, scheduler.processor().resolver().state());
}

#[test]
fn submissions_from_many_threads_are_serialized() {
    let rt = Arc::new(ScoringRuntime::new(
        DilemmaScheduler::new(EngineConfig::default()),
        Arc::new(Taxonomy::standard()),
        ScoringRuntimeConfig { queue_capacity: 256 },
    ));

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let rt = Arc::clone(&rt);
            thread::spawn(move || {
                let handles: Vec<_> = (0..10)
                    .map(|i| {
                        rt.enqueue(format!("t{t} q{i}"), Context::new(), TaskType::Duty)
                            .unwrap()
                    })
                    .collect();
                for handle in handles {
                    let id = handle.dilemma_id();
                    let report = handle
                        .join_timeout(Duration::from_secs(10))
                        .unwrap()
                        .into_report()
                        .unwrap();
                    assert_eq!(report.dilemma_id, id);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let state = rt.resolver_state().unwrap();
    assert_eq!(state.time_step, 80);
    assert!(state.momentum >= 0.0);
}

#[test]
fn untrusted_platform_rejects_every_submission() {
    let scheduler = DilemmaScheduler::default().with_guard(Box::new(StaticGuard::failing("puf mismatch")));
    let rt = ScoringRuntime::new(
        scheduler,
        Arc::new(Taxonomy::standard()),
        ScoringRuntimeConfig::default(),
    );

    let outcome = rt
        .enqueue("q", Context::new(), TaskType::Wisdom)
        .unwrap()
        .join()
        .unwrap();
    assert!(!outcome.is_completed());
    assert!(!outcome.hardware_compatible());
}

#[test]
fn dropping_runtime_finishes_queued_work() {
    let rt = seeded_runtime();
    let handles: Vec<_> = (0..5)
        .map(|i| rt.enqueue(format!("q{i}"), Context::new(), TaskType::Wisdom).unwrap())
        .collect();
    drop(rt);

    for handle in handles {
        assert!(handle.join().unwrap().is_completed());
    }
}
