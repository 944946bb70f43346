// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::coupling::{Coupling, nlid};
use crate::distance::DistanceMatrix;
use crate::embedding::{EmbeddingParams, reconstruct};
use crate::recurrence::{RecurrenceMatrix, ThresholdSpec};
use nlid_core::{NlidError, SignalView};

/// Coupling pair for one aligned window of two signals.
pub type WindowResult = Coupling;

/// Everything computed for one window pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowAnalysis {
    pub result: WindowResult,
    /// Trajectory length `M` shared by both recurrence matrices.
    pub trajectory_len: usize,
    pub cutoff_x: f64,
    pub cutoff_y: f64,
    pub recurrence_rate_x: f64,
    pub recurrence_rate_y: f64,
    pub empty_columns_x: usize,
    pub empty_columns_y: usize,
}

impl WindowAnalysis {
    pub fn is_degenerate(&self) -> bool {
        self.empty_columns_x > 0 || self.empty_columns_y > 0
    }
}

/// Runs reconstruction, recurrence and NLID for one window pair.
///
/// Each signal is binarized against its own threshold; the cutoff is never
/// shared between X and Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowAnalyzer {
    params: EmbeddingParams,
    threshold: ThresholdSpec,
}

impl WindowAnalyzer {
    pub fn new(params: EmbeddingParams, threshold: ThresholdSpec) -> Result<Self, NlidError> {
        params.validate()?;
        threshold.validate()?;
        Ok(Self { params, threshold })
    }

    pub fn params(&self) -> &EmbeddingParams {
        &self.params
    }

    pub fn threshold(&self) -> &ThresholdSpec {
        &self.threshold
    }

    /// Analyzes `(x, y)`.
    ///
    /// Windows shorter than `m + 1` samples, or too short for the delay
    /// span, fail with [`NlidError::InsufficientLength`]; callers treat that
    /// as a skipped window.
    pub fn analyze(
        &self,
        x: &SignalView<'_>,
        y: &SignalView<'_>,
    ) -> Result<WindowAnalysis, NlidError> {
        if x.len() != y.len() {
            return Err(NlidError::invalid_input(format!(
                "window lengths must match: x={}, y={}",
                x.len(),
                y.len()
            )));
        }
        let min_len = self.params.dimension + 1;
        if x.len() < min_len {
            return Err(NlidError::insufficient_length(format!(
                "window of {} samples is shorter than m+1={min_len}",
                x.len()
            )));
        }

        let (ar_x, cutoff_x) = self.binarize(x)?;
        let (ar_y, cutoff_y) = self.binarize(y)?;
        let report = nlid(&ar_x, &ar_y)?;

        Ok(WindowAnalysis {
            result: report.coupling,
            trajectory_len: ar_x.size(),
            cutoff_x,
            cutoff_y,
            recurrence_rate_x: ar_x.recurrence_rate(),
            recurrence_rate_y: ar_y.recurrence_rate(),
            empty_columns_x: report.empty_columns_x,
            empty_columns_y: report.empty_columns_y,
        })
    }

    fn binarize(&self, signal: &SignalView<'_>) -> Result<(RecurrenceMatrix, f64), NlidError> {
        let trajectory = reconstruct(signal, &self.params)?;
        let distances = DistanceMatrix::from_trajectory(&trajectory);
        let cutoff = self.threshold.cutoff(&distances);
        Ok((RecurrenceMatrix::from_distances(&distances, cutoff), cutoff))
    }
}

#[cfg(test)]
mod tests {
    use super::WindowAnalyzer;
    use crate::embedding::EmbeddingParams;
    use crate::recurrence::ThresholdSpec;
    use nlid_core::{NlidError, SignalView};

    fn analyzer(m: usize, tau: usize) -> WindowAnalyzer {
        WindowAnalyzer::new(
            EmbeddingParams::new(m, tau).expect("valid params"),
            ThresholdSpec::default(),
        )
        .expect("valid analyzer")
    }

    fn view(values: &[f64]) -> SignalView<'_> {
        SignalView::new(values).expect("test signal should be valid")
    }

    #[test]
    fn identical_windows_are_fully_coupled() {
        let x: Vec<f64> = (0..60).map(|i| (f64::from(i) * 0.2).sin()).collect();
        let analysis = analyzer(3, 1)
            .analyze(&view(&x), &view(&x))
            .expect("analysis should succeed");
        assert_eq!(analysis.result.x_given_y, 1.0);
        assert_eq!(analysis.result.y_given_x, 1.0);
        assert_eq!(analysis.trajectory_len, 58);
        assert_eq!(analysis.cutoff_x, analysis.cutoff_y);
        assert!(!analysis.is_degenerate());
    }

    #[test]
    fn constant_x_contains_every_recurrence_of_y() {
        let x = vec![2.0; 40];
        let y: Vec<f64> = (0..40).map(f64::from).collect();
        let analysis = analyzer(3, 1)
            .analyze(&view(&x), &view(&y))
            .expect("analysis should succeed");

        assert_eq!(analysis.cutoff_x, 0.0);
        assert_eq!(analysis.recurrence_rate_x, 1.0);
        assert_eq!(analysis.result.x_given_y, 1.0);
        assert!(analysis.result.y_given_x < 0.5);
        assert!((analysis.result.y_given_x - analysis.recurrence_rate_y).abs() < 1e-12);
    }

    #[test]
    fn thresholds_are_independent_per_signal() {
        let x: Vec<f64> = (0..30).map(f64::from).collect();
        let y: Vec<f64> = (0..30).map(|i| f64::from(i) * 10.0).collect();
        let analysis = analyzer(2, 1)
            .analyze(&view(&x), &view(&y))
            .expect("analysis should succeed");
        assert!((analysis.cutoff_y - 10.0 * analysis.cutoff_x).abs() < 1e-9);
        assert_eq!(analysis.recurrence_rate_x, analysis.recurrence_rate_y);
    }

    #[test]
    fn short_window_is_insufficient_length() {
        let x = [1.0, 2.0, 3.0];
        let err = analyzer(3, 1)
            .analyze(&view(&x), &view(&x))
            .expect_err("3 samples < m+1 must fail");
        assert!(matches!(err, NlidError::InsufficientLength(_)));

        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let err = analyzer(3, 3)
            .analyze(&view(&x), &view(&x))
            .expect_err("delay span exceeds window");
        assert!(matches!(err, NlidError::InsufficientLength(_)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = analyzer(2, 1)
            .analyze(&view(&[1.0, 2.0, 3.0, 4.0]), &view(&[1.0, 2.0, 3.0]))
            .expect_err("length mismatch must fail");
        assert!(matches!(err, NlidError::InvalidInput(_)));
    }

    #[test]
    fn invalid_threshold_rejected_at_construction() {
        let err = WindowAnalyzer::new(
            EmbeddingParams::default(),
            ThresholdSpec::Dynamic { fraction: 0.0 },
        )
        .expect_err("fraction 0 must fail");
        assert!(matches!(err, NlidError::Configuration(_)));
    }
}
