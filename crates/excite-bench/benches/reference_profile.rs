//! Criterion benchmarks for full operator-splitting steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use excite_bench::{reference_profile, scarred_profile, stress_profile};
use excite_engine::Simulation;

fn bench_step_22k(c: &mut Criterion) {
    let (config, lattice) = reference_profile();
    let mut sim = Simulation::new(config, lattice).unwrap();

    // Warm up past the bootstrap half-step.
    sim.step().unwrap();

    c.bench_function("step_22k", |b| {
        b.iter(|| {
            let metrics = sim.step().unwrap();
            black_box(&metrics);
        });
    });
}

fn bench_step_160k(c: &mut Criterion) {
    let (config, lattice) = stress_profile();
    let mut sim = Simulation::new(config, lattice).unwrap();
    sim.step().unwrap();

    c.bench_function("step_160k", |b| {
        b.iter(|| {
            let metrics = sim.step().unwrap();
            black_box(&metrics);
        });
    });
}

fn bench_step_scarred(c: &mut Criterion) {
    let (config, lattice) = scarred_profile();
    let mut sim = Simulation::new(config, lattice).unwrap();
    sim.step().unwrap();

    c.bench_function("step_scarred_smoothed", |b| {
        b.iter(|| {
            let metrics = sim.step().unwrap();
            black_box(&metrics);
        });
    });
}

criterion_group!(benches, bench_step_22k, bench_step_160k, bench_step_scarred);
criterion_main!(benches);
