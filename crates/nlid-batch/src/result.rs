// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::source::ColumnPair;
use nlid_core::{NlidError, RunDiagnostics};
use nlid_recurrence::WindowResult;

/// Coupling of one window, tagged with its start index.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowRecord {
    pub start: usize,
    pub result: WindowResult,
    pub degenerate: bool,
}

/// Mean coupling over the valid windows of one source/column pair.
///
/// `x_given_y` and `y_given_x` keep the direction convention of
/// [`nlid_recurrence::Coupling`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FileResult {
    pub source: String,
    pub pair: ColumnPair,
    pub x_given_y: f64,
    pub y_given_x: f64,
    pub window_count: usize,
    pub skipped_windows: usize,
    /// Samples per column after truncating to the shorter column.
    pub samples_used: usize,
}

/// A source or source/pair that produced no result.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureRecord {
    pub source: String,
    pub pair: Option<ColumnPair>,
    pub code: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(source: impl Into<String>, pair: Option<ColumnPair>, err: &NlidError) -> Self {
        Self {
            source: source.into(),
            pair,
            code: err.code().to_string(),
            reason: err.message().to_string(),
        }
    }
}

/// Per-window detail plus the aggregate for one source/column pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PairAnalysis {
    pub file_result: FileResult,
    pub windows: Vec<WindowRecord>,
}

/// Ordered results of a batch run plus the failures it recovered from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BatchResult {
    pub results: Vec<FileResult>,
    pub failures: Vec<FailureRecord>,
    pub diagnostics: RunDiagnostics,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for `source` and `pair`, if that combination succeeded.
    pub fn get(&self, source: &str, pair: &ColumnPair) -> Option<&FileResult> {
        self.results
            .iter()
            .find(|result| result.source == source && &result.pair == pair)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchResult, FailureRecord, FileResult};
    use crate::source::ColumnPair;
    use nlid_core::{NlidError, RunDiagnostics};

    #[test]
    fn failure_record_splits_code_and_reason() {
        let err = NlidError::insufficient_length("data shorter than window size");
        let record = FailureRecord::new("b.csv", Some(ColumnPair::new("X", "Y")), &err);
        assert_eq!(record.code, "insufficient_length");
        assert_eq!(record.reason, "data shorter than window size");
    }

    #[test]
    fn batch_result_lookup_by_source_and_pair() {
        let pair = ColumnPair::new("X", "Y");
        let batch = BatchResult {
            results: vec![FileResult {
                source: "a.csv".to_string(),
                pair: pair.clone(),
                x_given_y: 0.8,
                y_given_x: 0.4,
                window_count: 3,
                skipped_windows: 0,
                samples_used: 400,
            }],
            failures: vec![],
            diagnostics: RunDiagnostics::default(),
        };
        assert!(!batch.is_empty());
        assert_eq!(batch.get("a.csv", &pair).map(|r| r.window_count), Some(3));
        assert!(batch.get("a.csv", &ColumnPair::new("Y", "X")).is_none());
    }
}
