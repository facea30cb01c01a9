//! Round and estimator throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gourmet_rtp::config::GourmetConfig;
use gourmet_rtp::games::processor::GameProcessor;
use gourmet_rtp::games::types::{GameSelection, RiskTier};
use gourmet_rtp::games::SeededSource;
use gourmet_rtp::simulation::estimator::{estimate_rtp_parallel, run_trials};

fn bench_rounds(c: &mut Criterion) {
    let processor = GameProcessor::new(&GourmetConfig::default()).unwrap();
    let selections = [
        GameSelection::Slots,
        GameSelection::Scratch,
        GameSelection::Plinko { risk: RiskTier::High },
        GameSelection::Mines { picks: 3 },
        GameSelection::Blackjack,
    ];

    let mut group = c.benchmark_group("rounds_10k");
    for selection in selections {
        let model = processor.model(&selection).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(selection), &selection, |b, _| {
            let mut rng = SeededSource::from_seed(7);
            b.iter(|| run_trials(&*model, black_box(10_000), 1.0, &mut rng).unwrap())
        });
    }
    group.finish();
}

fn bench_parallel_estimate(c: &mut Criterion) {
    let processor = GameProcessor::new(&GourmetConfig::default()).unwrap();
    let model = processor.model(&GameSelection::Scratch).unwrap();

    let mut group = c.benchmark_group("scratch_100k");
    for workers in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| estimate_rtp_parallel(&*model, 100_000, 1.0, 42, workers).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rounds, bench_parallel_estimate);
criterion_main!(benches);
