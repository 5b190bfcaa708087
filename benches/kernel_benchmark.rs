//! Benchmark kernel evaluation, training passes and prediction

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use osvm::kernel::{Kernel, KernelFunction};
use osvm::{predict_single, train_classification, train_regression, LearningParams, Sample};
use std::hint::black_box;

fn vectors(n: usize, dim: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..dim)
                .map(|j| (((i * 31 + j * 17) % 97) as f64 / 48.5) - 1.0)
                .collect()
        })
        .collect()
}

fn kernels() -> Vec<(&'static str, KernelFunction)> {
    vec![
        ("dot", KernelFunction::dot()),
        ("polynomial", KernelFunction::polynomial(3).unwrap()),
        ("gaussian", KernelFunction::gaussian(0.5).unwrap()),
    ]
}

fn benchmark_kernel_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_evaluation");
    for dim in [8, 64, 512] {
        let xs = vectors(2, dim);
        for (name, kernel) in kernels() {
            group.bench_with_input(BenchmarkId::new(name, dim), &xs, |b, xs| {
                b.iter(|| kernel.compute(black_box(&xs[0]), black_box(&xs[1])));
            });
        }
    }
    group.finish();
}

fn benchmark_training_pass(c: &mut Criterion) {
    let points = vectors(500, 16);
    let regression: Vec<Sample> = points
        .iter()
        .map(|x| Sample::new(x.clone(), x[0] - 0.5 * x[1]))
        .collect();
    let classification: Vec<Sample> = points
        .iter()
        .map(|x| Sample::new(x.clone(), if x[0] >= x[1] { 1.0 } else { -1.0 }))
        .collect();
    let kernel = KernelFunction::gaussian(0.5).unwrap();
    let params = LearningParams::default();

    c.bench_function("train_regression_500", |b| {
        b.iter(|| train_regression(black_box(&regression), &kernel, params));
    });
    c.bench_function("train_classification_500", |b| {
        b.iter(|| train_classification(black_box(&classification), &kernel, params));
    });
}

fn benchmark_prediction(c: &mut Criterion) {
    let points = vectors(500, 16);
    let samples: Vec<Sample> = points
        .iter()
        .map(|x| Sample::new(x.clone(), x.iter().sum()))
        .collect();
    let kernel = KernelFunction::gaussian(0.5).unwrap();
    let params = LearningParams {
        nu: 0.5,
        ..Default::default()
    };
    let model = train_regression(&samples, &kernel, params).unwrap();
    let query = &points[7];

    c.bench_function("predict_single", |b| {
        b.iter(|| predict_single(&model, black_box(query), &kernel));
    });
}

criterion_group!(
    benches,
    benchmark_kernel_evaluation,
    benchmark_training_pass,
    benchmark_prediction
);
criterion_main!(benches);
