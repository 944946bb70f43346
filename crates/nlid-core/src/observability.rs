// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Receives per-file progress from a batch run.
///
/// `completed` increases by one per finished file (success, skip or failure)
/// and never decreases within a run.
pub trait ProgressSink {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Receives scalar run metrics.
pub trait TelemetrySink {
    fn record_scalar(&self, key: &'static str, value: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize),
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}
