//! Criterion benchmarks for IS-MCTS searches on Kuhn poker.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ismcts::evaluator::{RandomRolloutEvaluator, UniformEvaluator};
use ismcts::games::kuhn::KuhnState;
use ismcts::mcts::{ISMCTSConfig, ISMCTSSearch, WorldSamples};

fn search_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Kuhn search");
    let state = KuhnState::with_cards(1, 2);

    for sims in [100u32, 1000] {
        group.throughput(Throughput::Elements(sims as u64));

        let config = ISMCTSConfig::default().with_simulations(sims);
        group.bench_with_input(BenchmarkId::new("uniform", sims), &config, |b, config| {
            let mut search = ISMCTSSearch::new(UniformEvaluator, config.clone());
            b.iter(|| std::hint::black_box(search.run_search(&state)));
        });

        group.bench_with_input(BenchmarkId::new("rollout", sims), &config, |b, config| {
            let mut search = ISMCTSSearch::new(RandomRolloutEvaluator::new(1), config.clone());
            b.iter(|| std::hint::black_box(search.run_search(&state)));
        });

        let bounded = config.clone().with_world_samples(WorldSamples::Bounded(8));
        group.bench_with_input(BenchmarkId::new("bounded_samples", sims), &bounded, |b, config| {
            let mut search = ISMCTSSearch::new(UniformEvaluator, config.clone());
            b.iter(|| std::hint::black_box(search.run_search(&state)));
        });
    }

    group.finish();
}

criterion_group!(benches, search_bench);
criterion_main!(benches);
