use criterion::{criterion_group, criterion_main, Criterion};
use zkinfer::{Inputs, LinearModel, OptimizationLevel, SchemeKind, Workspace};

const SCALE: u32 = 1000;

fn bench_pipeline(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::open_at(dir.path()).unwrap();

    let weights: Vec<f64> = (0..32).map(|i| (i as f64 - 16.0) / 8.0).collect();
    let model = LinearModel::new(weights, 0.25);
    let graph = model.to_graph(SCALE).unwrap();
    let xs: Vec<i64> = (0..32).map(|i| i % 9 - 4).collect();
    let mut inputs: Inputs = xs
        .iter()
        .enumerate()
        .map(|(i, x)| (format!("x{}", i + 1), *x))
        .collect();
    inputs.insert("y", model.evaluate(&xs, SCALE).unwrap());

    let circuit = ws.compile(&graph, OptimizationLevel::O3).unwrap();
    let (pk, vk) = ws.setup(&circuit, SchemeKind::Groth16).unwrap();
    let (proof, public) = ws.prove(&circuit, &pk, &inputs).unwrap();

    let mut group = c.benchmark_group("bench_pipeline");
    group.sample_size(10);
    group.bench_function("compile".to_string(), |b| {
        b.iter(|| ws.compile(&graph, OptimizationLevel::O3).unwrap())
    });
    group.bench_function("setup".to_string(), |b| {
        b.iter(|| ws.setup(&circuit, SchemeKind::Groth16).unwrap())
    });
    group.bench_function("prove".to_string(), |b| {
        b.iter(|| ws.prove(&circuit, &pk, &inputs).unwrap())
    });
    group.bench_function("verify".to_string(), |b| {
        b.iter(|| assert!(ws.verify(&vk, &proof, &public).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
