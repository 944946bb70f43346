// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nlid_core::{NlidError, SignalView, min_embeddable_len};

const DEFAULT_DIMENSION: usize = 3;
const DEFAULT_DELAY: usize = 1;

/// Delay-embedding parameters: dimension `m` and delay `tau`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmbeddingParams {
    pub dimension: usize,
    pub delay: usize,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            delay: DEFAULT_DELAY,
        }
    }
}

impl EmbeddingParams {
    pub fn new(dimension: usize, delay: usize) -> Result<Self, NlidError> {
        let params = Self { dimension, delay };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), NlidError> {
        if self.dimension == 0 {
            return Err(NlidError::configuration(
                "embedding dimension m must be >= 1; got 0",
            ));
        }
        if self.delay == 0 {
            return Err(NlidError::configuration("embedding delay tau must be >= 1; got 0"));
        }
        if min_embeddable_len(self.dimension, self.delay).is_none() {
            return Err(NlidError::configuration(format!(
                "embedding span overflows: m={}, tau={}",
                self.dimension, self.delay
            )));
        }
        Ok(())
    }

    /// `(m - 1) * tau + 1`, the shortest signal that yields one delay vector.
    pub fn min_signal_len(&self) -> usize {
        min_embeddable_len(self.dimension, self.delay).unwrap_or(usize::MAX)
    }

    /// Number of delay vectors for a signal of length `len`, if any.
    pub fn trajectory_len(&self, len: usize) -> Option<usize> {
        let span = self.min_signal_len();
        (len >= span).then(|| len - span + 1)
    }
}

/// Row-major `M x m` matrix of delay vectors.
///
/// Row `i`, column `p` holds `sample[i + p * tau]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    data: Vec<f64>,
    norms: Vec<f64>,
    rows: usize,
    dimension: usize,
}

impl Trajectory {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.dimension;
        &self.data[start..start + self.dimension]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Squared Euclidean norm of every row.
    pub fn squared_norms(&self) -> &[f64] {
        &self.norms
    }
}

/// Embeds `signal` into an `(L - (m-1)*tau) x m` delay-coordinate trajectory.
pub fn reconstruct(
    signal: &SignalView<'_>,
    params: &EmbeddingParams,
) -> Result<Trajectory, NlidError> {
    params.validate()?;

    let len = signal.len();
    let rows = params.trajectory_len(len).ok_or_else(|| {
        NlidError::insufficient_length(format!(
            "signal of length {len} cannot be embedded with m={}, tau={} (needs >= {})",
            params.dimension,
            params.delay,
            params.min_signal_len()
        ))
    })?;

    let samples = signal.as_slice();
    let mut data = Vec::with_capacity(rows * params.dimension);
    for i in 0..rows {
        data.extend((0..params.dimension).map(|p| samples[i + p * params.delay]));
    }

    let norms: Vec<f64> = data
        .chunks_exact(params.dimension)
        .map(|row| row.iter().map(|v| v * v).sum())
        .collect();
    // |a|^2 + |b|^2 + 2|a.b| <= 4 * max |row|^2 bounds every distance term.
    let max_norm = norms.iter().copied().fold(0.0_f64, f64::max);
    if !(4.0 * max_norm).is_finite() {
        return Err(NlidError::numerical_issue(format!(
            "squared delay-vector norms overflow f64 (max {max_norm:e}); rescale the signal"
        )));
    }

    Ok(Trajectory {
        data,
        norms,
        rows,
        dimension: params.dimension,
    })
}
