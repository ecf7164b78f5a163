//! Map generation benchmark.
//!
//! Generation relaxes mirrored obstacle pairs and restarts on failure, so its
//! cost varies by seed. This measures a spread of seeds.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use royale::core::rng::DeterministicRng;
use royale::game::map::generate_map;
use royale::MatchConfig;

fn bench_generate_map(c: &mut Criterion) {
    let config = MatchConfig::default();

    c.bench_function("generate_map seed 42", |b| {
        b.iter(|| {
            let mut rng = DeterministicRng::new(black_box(42));
            generate_map(&mut rng, &config)
        })
    });

    c.bench_function("generate_map 16 seeds", |b| {
        b.iter(|| {
            for seed in 0..16u64 {
                let mut rng = DeterministicRng::new(black_box(seed));
                let _ = black_box(generate_map(&mut rng, &config));
            }
        })
    });
}

criterion_group!(benches, bench_generate_map);
criterion_main!(benches);
