use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nanovec_core::{Engine, EngineConfig, Metric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

const DIMENSION: usize = 128;

fn random_vector(rng: &mut StdRng) -> Vec<f32> {
    (0..DIMENSION).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn build_engine(size: usize) -> (tempfile::TempDir, Engine) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.nvdb");
    let engine = Engine::create(EngineConfig::new("bench", path, DIMENSION, Metric::Cosine)).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    for id in 0..size {
        engine.insert(id as u64, random_vector(&mut rng)).unwrap();
    }
    (dir, engine)
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for size in [1_000usize, 10_000, 50_000] {
        let (_dir, engine) = build_engine(size);
        let mut rng = StdRng::seed_from_u64(99);
        let query = random_vector(&mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| engine.search(&query, 10, 0.0).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
