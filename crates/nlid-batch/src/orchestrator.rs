// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::{NlidConfig, window_starts};
use crate::result::{BatchResult, FailureRecord, FileResult, PairAnalysis, WindowRecord};
use crate::source::{ColumnPair, ColumnSource};
use nlid_core::{
    DIAGNOSTICS_SCHEMA_VERSION, ExecutionContext, NlidError, RunDiagnostics, SignalView,
};
use nlid_recurrence::WindowAnalyzer;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Slides a window over one column pair and averages the per-window coupling.
///
/// Both columns are truncated to the shorter one. Windows whose analysis
/// reports [`NlidError::InsufficientLength`] are skipped; any other window
/// error aborts the pair.
pub fn analyze_pair(
    source: &str,
    pair: &ColumnPair,
    x: &[f64],
    y: &[f64],
    config: &NlidConfig,
) -> Result<PairAnalysis, NlidError> {
    config.validate()?;
    let analyzer = config.analyzer()?;
    let step = config.step()?;
    analyze_pair_with(source, pair, x, y, config.window_size, step, &analyzer)
}

fn analyze_pair_with(
    source: &str,
    pair: &ColumnPair,
    x: &[f64],
    y: &[f64],
    window_size: usize,
    step: usize,
    analyzer: &WindowAnalyzer,
) -> Result<PairAnalysis, NlidError> {
    let samples_used = x.len().min(y.len());
    if samples_used < window_size {
        return Err(NlidError::insufficient_length(
            "data shorter than window size",
        ));
    }

    let x = SignalView::new(&x[..samples_used])?;
    let y = SignalView::new(&y[..samples_used])?;

    let mut windows = Vec::new();
    let mut skipped_windows = 0usize;
    for start in window_starts(samples_used, window_size, step) {
        let wx = x.window(start, window_size)?;
        let wy = y.window(start, window_size)?;
        match analyzer.analyze(&wx, &wy) {
            Ok(analysis) => windows.push(WindowRecord {
                start,
                result: analysis.result,
                degenerate: analysis.is_degenerate(),
            }),
            Err(NlidError::InsufficientLength(reason)) => {
                debug!(file = source, pair = %pair, start, reason = %reason, "window skipped");
                skipped_windows += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if windows.is_empty() {
        return Err(NlidError::insufficient_length(format!(
            "no valid windows ({skipped_windows} skipped)"
        )));
    }

    let count = windows.len() as f64;
    let (sum_xy, sum_yx) = windows.iter().fold((0.0, 0.0), |(a, b), window| {
        (a + window.result.x_given_y, b + window.result.y_given_x)
    });

    Ok(PairAnalysis {
        file_result: FileResult {
            source: source.to_string(),
            pair: pair.clone(),
            x_given_y: sum_xy / count,
            y_given_x: sum_yx / count,
            window_count: windows.len(),
            skipped_windows,
            samples_used,
        },
        windows,
    })
}

fn analyze_source_pair<S: ColumnSource + ?Sized>(
    source: &S,
    pair: &ColumnPair,
    window_size: usize,
    step: usize,
    analyzer: &WindowAnalyzer,
) -> Result<PairAnalysis, NlidError> {
    let x = source.column(&pair.x)?;
    let y = source.column(&pair.y)?;
    analyze_pair_with(source.name(), pair, &x, &y, window_size, step, analyzer)
}

/// Runs every column pair over every source, in order.
///
/// Configuration problems fail the whole run before any source is read.
/// Per-source and per-pair failures are recorded in
/// [`BatchResult::failures`] and processing continues. Cancellation is
/// observed between sources and surfaces as [`NlidError::Cancelled`].
///
/// A source counts as succeeded in the diagnostics when at least one of its
/// pairs produced a result.
pub fn run_batch<S: ColumnSource>(
    sources: &[S],
    pairs: &[ColumnPair],
    config: &NlidConfig,
    ctx: &ExecutionContext<'_>,
) -> Result<BatchResult, NlidError> {
    config.validate()?;
    if pairs.is_empty() {
        return Err(NlidError::configuration(
            "at least one column pair is required",
        ));
    }
    let analyzer = config.analyzer()?;
    let step = config.step()?;
    let started_at = Instant::now();

    let mut diagnostics = RunDiagnostics {
        schema_version: DIAGNOSTICS_SCHEMA_VERSION,
        engine_version: Some(nlid_core::engine_version().to_string()),
        files_total: sources.len(),
        ..RunDiagnostics::default()
    };
    diagnostics.notes.push(format!(
        "m={}, tau={}, window_size={}, overlap={}, step={step}",
        config.embedding.dimension, config.embedding.delay, config.window_size, config.overlap
    ));
    #[cfg(feature = "serde")]
    {
        diagnostics.params_json = config.to_params_json();
    }

    let mut results = Vec::new();
    let mut failures = Vec::new();
    let total = sources.len();
    ctx.report_progress(0, total);

    for (index, source) in sources.iter().enumerate() {
        ctx.check_cancelled()?;

        let mut any_succeeded = false;
        for pair in pairs {
            match analyze_source_pair(source, pair, config.window_size, step, &analyzer) {
                Ok(analysis) => {
                    let file_result = analysis.file_result;
                    info!(
                        file = source.name(),
                        pair = %pair,
                        windows = file_result.window_count,
                        "processed {} (windows: {})",
                        source.name(),
                        file_result.window_count
                    );
                    diagnostics.windows_analyzed += file_result.window_count;
                    diagnostics.windows_skipped += file_result.skipped_windows;
                    diagnostics.degenerate_windows +=
                        analysis.windows.iter().filter(|w| w.degenerate).count();
                    any_succeeded = true;
                    results.push(file_result);
                }
                Err(err) => {
                    warn!(
                        file = source.name(),
                        pair = %pair,
                        code = err.code(),
                        "skipped {}: {}",
                        source.name(),
                        err.message()
                    );
                    diagnostics
                        .warnings
                        .push(format!("{} [{pair}]: {}", source.name(), err.message()));
                    failures.push(FailureRecord::new(source.name(), Some(pair.clone()), &err));
                }
            }
        }

        if any_succeeded {
            diagnostics.files_succeeded += 1;
        } else {
            diagnostics.files_failed += 1;
        }
        ctx.report_progress(index + 1, total);
    }

    let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
    diagnostics.runtime_ms = Some(runtime_ms);
    if diagnostics.degenerate_windows > 0 {
        diagnostics.warnings.push(format!(
            "{} windows had recurrence columns with zero sum",
            diagnostics.degenerate_windows
        ));
    }

    ctx.record_scalar("nlid.files_total", total as f64);
    ctx.record_scalar("nlid.files_failed", diagnostics.files_failed as f64);
    ctx.record_scalar("nlid.windows_analyzed", diagnostics.windows_analyzed as f64);
    ctx.record_scalar("nlid.runtime_ms", runtime_ms as f64);

    info!(
        files = total,
        succeeded = diagnostics.files_succeeded,
        failed = diagnostics.files_failed,
        runtime_ms,
        "batch finished"
    );

    Ok(BatchResult {
        results,
        failures,
        diagnostics,
    })
}
