use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crashsim_execution::{draw, sample, Engine, RandSource, VirtualScheduler};
use crashsim_types::{EngineConfig, UNIT};
use rand::{rngs::StdRng, SeedableRng};

fn sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");

    group.bench_function("sample", |b| {
        b.iter(|| black_box(sample(black_box(0.81), black_box(0.42))))
    });

    group.bench_function("draw", |b| {
        let mut source = RandSource(StdRng::seed_from_u64(0));
        b.iter(|| black_box(draw(&mut source)))
    });

    group.finish();
}

fn rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_rounds");
    for threshold in [1.5f64, 2.0, 5.0] {
        group.bench_function(BenchmarkId::new("auto_play_round", threshold), |b| {
            let mut engine = Engine::new(
                EngineConfig {
                    starting_balance: u64::MAX / 2,
                    ..EngineConfig::default()
                },
                VirtualScheduler::new(),
                RandSource(StdRng::seed_from_u64(1)),
            );
            b.iter(|| {
                engine.place_bet(UNIT).expect("balance covers stake");
                engine.set_auto_play(true, threshold);
                engine.start_round();
                engine.run_round();
                engine.set_auto_play(false, threshold);
                engine.new_round();
                black_box(engine.take_events());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, sampler, rounds);
criterion_main!(benches);
