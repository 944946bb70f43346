// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nlid_bench::noisy_sine;
use nlid_core::SignalView;
use nlid_recurrence::{
    DistanceMatrix, EmbeddingParams, RecurrenceMatrix, ThresholdSpec, WindowAnalyzer, nlid,
    reconstruct,
};

const WINDOW_SIZES: [usize; 3] = [100, 250, 500];

fn benchmark_recurrence(c: &mut Criterion) {
    let params = EmbeddingParams::default();
    let threshold = ThresholdSpec::default();
    let mut group = c.benchmark_group("recurrence");

    for window in WINDOW_SIZES {
        let x = noisy_sine(window, 37.0, 0.2, 0x5eed);
        let y = noisy_sine(window, 23.0, 0.2, 0xbeef);
        let view_x = SignalView::new(&x).expect("benchmark signal should be valid");
        let view_y = SignalView::new(&y).expect("benchmark signal should be valid");
        let trajectory = reconstruct(&view_x, &params).expect("benchmark signal should embed");

        group.bench_with_input(BenchmarkId::new("distance_matrix", window), &trajectory, |b, t| {
            b.iter(|| DistanceMatrix::from_trajectory(black_box(t)))
        });

        let distances = DistanceMatrix::from_trajectory(&trajectory);
        group.bench_with_input(BenchmarkId::new("binarize", window), &distances, |b, d| {
            b.iter(|| {
                RecurrenceMatrix::with_threshold(black_box(d), black_box(&threshold))
                    .expect("benchmark threshold should be valid")
            })
        });

        let ar = RecurrenceMatrix::with_threshold(&distances, &threshold)
            .expect("benchmark threshold should be valid");
        group.bench_with_input(BenchmarkId::new("nlid", window), &ar, |b, ar| {
            b.iter(|| nlid(black_box(ar), black_box(ar)).expect("equal sizes"))
        });

        let analyzer =
            WindowAnalyzer::new(params, threshold).expect("benchmark analyzer should be valid");
        group.bench_function(BenchmarkId::new("window", window), |b| {
            b.iter(|| {
                analyzer
                    .analyze(black_box(&view_x), black_box(&view_y))
                    .expect("benchmark window should analyze")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_recurrence);
criterion_main!(benches);
