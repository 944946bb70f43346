// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nlid_batch::{
    ColumnPair, InMemorySource, NlidConfig, analyze_pair, run_batch, spawn_batch, window_starts,
};
use nlid_core::{ExecutionContext, NlidError};
use nlid_recurrence::{EmbeddingParams, ThresholdSpec};

fn sine(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64 * std::f64::consts::TAU / 37.0).sin())
        .collect()
}

fn config(window_size: usize, overlap: f64) -> NlidConfig {
    NlidConfig {
        embedding: EmbeddingParams { dimension: 3, delay: 1 },
        window_size,
        overlap,
        threshold: ThresholdSpec::Dynamic { fraction: 0.1 },
    }
}

#[test]
fn identical_sines_are_fully_coupled() {
    let signal = sine(500);
    let analysis = analyze_pair(
        "sine.csv",
        &ColumnPair::new("X", "Y"),
        &signal,
        &signal,
        &config(200, 0.5),
    )
    .expect("identical sines should analyze");

    assert!(
        analysis
            .windows
            .iter()
            .all(|w| w.result.x_given_y == 1.0 && w.result.y_given_x == 1.0)
    );
    // Starts 0, 100, 200 and 300 all fit inside 500 samples.
    assert_eq!(analysis.file_result.window_count, 4);
    assert_eq!(analysis.file_result.x_given_y, 1.0);
    assert_eq!(analysis.file_result.y_given_x, 1.0);
}

#[test]
fn constant_x_contains_every_recurrence_of_a_ramp() {
    let x = vec![2.5; 300];
    let y: Vec<f64> = (0..300).map(|i| i as f64 * 0.5).collect();
    let analysis = analyze_pair(
        "ramp.csv",
        &ColumnPair::new("CONST", "RAMP"),
        &x,
        &y,
        &config(100, 0.5),
    )
    .expect("constant/ramp should analyze");

    let result = &analysis.file_result;
    assert_eq!(result.x_given_y, 1.0);
    assert!(result.y_given_x > 0.0);
    assert!(result.y_given_x < 0.3, "ramp recurrences are sparse: {}", result.y_given_x);
    assert!(analysis.windows.iter().all(|w| !w.degenerate));
}

#[test]
fn thousand_samples_yield_nine_windows() {
    let starts: Vec<usize> = window_starts(1000, 200, config(200, 0.5).step().expect("step"))
        .collect();
    assert_eq!(starts, (0..9).map(|k| k * 100).collect::<Vec<_>>());

    let x = sine(1000);
    let y: Vec<f64> = x.iter().map(|v| v * v).collect();
    let analysis = analyze_pair("long.csv", &ColumnPair::new("X", "Y"), &x, &y, &config(200, 0.5))
        .expect("analysis should succeed");
    assert_eq!(analysis.file_result.window_count, 9);
    assert_eq!(analysis.windows.last().map(|w| w.start), Some(800));
}

#[test]
fn batch_reports_short_and_missing_inputs_and_continues() {
    let sources = vec![
        InMemorySource::new("short.csv")
            .with_column("X", sine(150))
            .with_column("Y", sine(150)),
        InMemorySource::new("missing.csv").with_column("Y", sine(400)),
        InMemorySource::new("ok.csv")
            .with_column("X", sine(400))
            .with_column("Y", sine(380)),
    ];
    let pairs = [ColumnPair::new("X", "Y"), ColumnPair::new("Y", "X")];
    let batch = run_batch(&sources, &pairs, &config(200, 0.5), &ExecutionContext::new())
        .expect("batch should run");

    assert_eq!(batch.results.len(), 2);
    assert!(batch.results.iter().all(|r| r.source == "ok.csv"));
    let forward = batch.get("ok.csv", &pairs[0]).expect("forward pair");
    let backward = batch.get("ok.csv", &pairs[1]).expect("backward pair");
    assert_eq!(forward.samples_used, 380);
    assert_eq!(forward.x_given_y, backward.y_given_x);
    assert_eq!(forward.y_given_x, backward.x_given_y);

    let reasons: Vec<(&str, &str)> = batch
        .failures
        .iter()
        .map(|f| (f.source.as_str(), f.code.as_str()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("short.csv", "insufficient_length"),
            ("short.csv", "insufficient_length"),
            ("missing.csv", "missing_column"),
            ("missing.csv", "missing_column"),
        ]
    );
    assert!(
        batch
            .failures
            .iter()
            .filter(|f| f.source == "short.csv")
            .all(|f| f.reason == "data shorter than window size")
    );
    assert_eq!(batch.diagnostics.files_succeeded, 1);
    assert_eq!(batch.diagnostics.files_failed, 2);
}

#[test]
fn overflowing_magnitudes_fail_only_their_source() {
    let huge: Vec<f64> = sine(300).iter().map(|v| v * 1e160).collect();
    let sources = vec![
        InMemorySource::new("huge.csv")
            .with_column("X", huge)
            .with_column("Y", sine(300)),
        InMemorySource::new("ok.csv")
            .with_column("X", sine(300))
            .with_column("Y", sine(300)),
    ];
    let batch = run_batch(
        &sources,
        &[ColumnPair::new("X", "Y")],
        &config(200, 0.5),
        &ExecutionContext::new(),
    )
    .expect("batch should run");

    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].source, "ok.csv");
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].source, "huge.csv");
    assert_eq!(batch.failures[0].code, "numerical_issue");
}

#[test]
fn configuration_violations_abort_before_any_source() {
    let sources = vec![InMemorySource::new("a.csv")
        .with_column("X", sine(400))
        .with_column("Y", sine(400))];
    let pairs = [ColumnPair::new("X", "Y")];

    for bad in [config(200, 1.0), config(3, 0.0), config(10, 0.95)] {
        let err = run_batch(&sources, &pairs, &bad, &ExecutionContext::new())
            .expect_err("invalid configuration must abort");
        assert!(matches!(err, NlidError::Configuration(_)), "{err}");
    }
}

#[test]
fn background_batch_matches_synchronous_run() {
    let sources = vec![
        InMemorySource::new("a.csv")
            .with_column("X", sine(400))
            .with_column("Y", sine(400).iter().map(|v| v.abs()).collect()),
        InMemorySource::new("b.csv")
            .with_column("X", sine(333))
            .with_column("Y", sine(333).iter().rev().copied().collect()),
    ];
    let pairs = vec![ColumnPair::new("X", "Y")];
    let cfg = config(120, 0.25);

    let sync = run_batch(&sources, &pairs, &cfg, &ExecutionContext::new()).expect("sync run");
    let handle = spawn_batch(sources, pairs, cfg).expect("worker should start");
    let background = handle.join().expect("background run");

    assert_eq!(sync.results, background.results);
    assert_eq!(sync.failures, background.failures);
}

#[cfg(feature = "serde")]
#[test]
fn batch_result_serializes_with_diagnostics() {
    let sources = vec![InMemorySource::new("a.csv")
        .with_column("X", sine(300))
        .with_column("Y", sine(300))];
    let batch = run_batch(
        &sources,
        &[ColumnPair::new("X", "Y")],
        &config(100, 0.5),
        &ExecutionContext::new(),
    )
    .expect("batch should run");

    let value = serde_json::to_value(&batch).expect("batch should serialize");
    assert_eq!(value["results"][0]["source"], "a.csv");
    assert_eq!(value["results"][0]["window_count"], 5);
    assert_eq!(value["diagnostics"]["params_json"]["window_size"], 100);
}
