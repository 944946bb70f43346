// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nlid_core::NlidError;
use nlid_recurrence::{EmbeddingParams, ThresholdSpec, WindowAnalyzer};

const DEFAULT_WINDOW_SIZE: usize = 100;
const DEFAULT_OVERLAP: f64 = 0.5;

/// Immutable configuration for one analysis run.
///
/// One `(m, tau)` pair is shared by every window of every file so that the
/// two recurrence matrices of a window always have the same size.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NlidConfig {
    pub embedding: EmbeddingParams,
    pub window_size: usize,
    /// Fraction of each window shared with the next one, in `[0, 1)`.
    pub overlap: f64,
    pub threshold: ThresholdSpec,
}

impl Default for NlidConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingParams::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            overlap: DEFAULT_OVERLAP,
            threshold: ThresholdSpec::default(),
        }
    }
}

impl NlidConfig {
    /// Checks every run-level precondition; nothing is processed on failure.
    pub fn validate(&self) -> Result<(), NlidError> {
        self.embedding.validate()?;
        self.threshold.validate()?;

        if !self.overlap.is_finite() || !(0.0..1.0).contains(&self.overlap) {
            return Err(NlidError::configuration(format!(
                "overlap must be in [0, 1); got {}",
                self.overlap
            )));
        }
        if self.window_size <= self.embedding.dimension {
            return Err(NlidError::configuration(format!(
                "window_size must be > m; got window_size={}, m={}",
                self.window_size, self.embedding.dimension
            )));
        }
        let span = self.embedding.min_signal_len();
        if self.window_size < span {
            return Err(NlidError::configuration(format!(
                "window_size={} is shorter than the embedding span (m-1)*tau+1={span}",
                self.window_size
            )));
        }
        self.step()?;
        Ok(())
    }

    /// `floor(window_size * (1 - overlap))`, which must be at least 1.
    pub fn step(&self) -> Result<usize, NlidError> {
        let raw = (self.window_size as f64 * (1.0 - self.overlap)).floor();
        if !raw.is_finite() || raw < 1.0 {
            return Err(NlidError::configuration(format!(
                "window step must be >= 1; window_size={} with overlap={} gives {raw}",
                self.window_size, self.overlap
            )));
        }
        Ok(raw as usize)
    }

    pub fn analyzer(&self) -> Result<WindowAnalyzer, NlidError> {
        WindowAnalyzer::new(self.embedding, self.threshold)
    }

    #[cfg(feature = "serde")]
    pub fn to_params_json(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

/// Start indices `0, step, 2*step, ...` with `start + window_size <= len`.
pub fn window_starts(len: usize, window_size: usize, step: usize) -> impl Iterator<Item = usize> {
    let step = step.max(1);
    let count = if window_size == 0 || len < window_size {
        0
    } else {
        (len - window_size) / step + 1
    };
    (0..count).map(move |k| k * step)
}
