use criterion::{criterion_group, criterion_main, Criterion};
use zkinfer_algebra::bn254::{BN254PairingEngine, BN254Scalar};
use zkinfer_algebra::prelude::*;
use zkinfer_groth16::{prove, setup, verify, CancellationToken, PublicInputs};
use zkinfer_r1cs::layers::{dense, relu_layer};
use zkinfer_r1cs::{compile, generate_witness, Graph, Inputs, NodeId, OptimizationLevel};

type P = BN254PairingEngine;

/// A 16-8-1 perceptron with ReLU activations.
fn perceptron() -> Graph {
    let mut g = Graph::new();
    let x: Vec<NodeId> = (0..16).map(|i| g.private_input(&format!("x{}", i))).collect();
    let w1: Vec<Vec<i64>> = (0..8)
        .map(|i| (0..16).map(|j| ((i * 7 + j * 3) % 11) as i64 - 5).collect())
        .collect();
    let h = dense(&mut g, &x, &w1, &[1; 8]).unwrap();
    let h = relu_layer(&mut g, &h, 32);
    let y = dense(&mut g, &h, &[vec![3, -1, 2, 1, -2, 1, 1, -1]], &[0]).unwrap();
    g.output(y[0], "y");
    g
}

fn bench_groth16(c: &mut Criterion) {
    let mut prng = test_rng();
    let token = CancellationToken::new();
    let compiled = compile::<BN254Scalar>(&perceptron(), OptimizationLevel::O3).unwrap();
    let inputs: Inputs = (0..16).map(|i| (format!("x{}", i), i as i64 - 8)).collect();
    let witness = generate_witness(&compiled, &inputs).unwrap();

    let (pk, vk) = setup::<P, _>(&mut prng, &compiled.circuit, &token).unwrap();
    let proof = prove(&mut prng, &pk, &compiled.circuit, &witness, &token).unwrap();
    let public = PublicInputs::new(compiled.fingerprint(), witness.public_inputs().to_vec());

    let mut group = c.benchmark_group("bench_groth16");
    group.sample_size(10);
    group.bench_function("setup".to_string(), |b| {
        b.iter(|| setup::<P, _>(&mut prng, &compiled.circuit, &token).unwrap())
    });
    group.bench_function("prove".to_string(), |b| {
        let mut prng = test_rng();
        b.iter(|| prove(&mut prng, &pk, &compiled.circuit, &witness, &token).unwrap())
    });
    group.bench_function("verify".to_string(), |b| {
        b.iter(|| verify(&vk, &proof, &public).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_groth16);
criterion_main!(benches);
