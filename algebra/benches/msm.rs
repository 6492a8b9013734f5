use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use zkinfer_algebra::bn254::{BN254PairingEngine, BN254Scalar, BN254G1, BN254G2};
use zkinfer_algebra::prelude::*;

fn bench_msm(c: &mut Criterion) {
    let mut prng = test_rng();
    let mut group = c.benchmark_group("bench_msm");
    group.sample_size(10);
    for log_size in [10usize, 12, 14] {
        let n = 1 << log_size;
        let points: Vec<BN254G1> = (0..n).map(|_| BN254G1::random(&mut prng)).collect();
        let scalars: Vec<BN254Scalar> = (0..n).map(|_| BN254Scalar::random(&mut prng)).collect();
        let p: Vec<&BN254G1> = points.iter().collect();
        let s: Vec<&BN254Scalar> = scalars.iter().collect();
        group.bench_with_input(BenchmarkId::new("g1", n), &n, |b, _| {
            b.iter(|| BN254G1::multi_exp(&s, &p))
        });
    }
    group.finish();
}

fn bench_pairing(c: &mut Criterion) {
    let mut prng = test_rng();
    let a: Vec<BN254G1> = (0..4).map(|_| BN254G1::random(&mut prng)).collect();
    let b: Vec<BN254G2> = (0..4).map(|_| BN254G2::random(&mut prng)).collect();

    let mut group = c.benchmark_group("bench_pairing");
    group.bench_function("single", |bench| {
        bench.iter(|| BN254PairingEngine::pairing(&a[0], &b[0]))
    });
    group.bench_function("multi_4", |bench| {
        bench.iter(|| BN254PairingEngine::multi_pairing(&a, &b))
    });
    group.finish();
}

criterion_group!(benches, bench_msm, bench_pairing);
criterion_main!(benches);
