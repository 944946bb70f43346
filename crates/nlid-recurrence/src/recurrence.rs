// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::distance::DistanceMatrix;
use crate::embedding::Trajectory;
use nlid_core::NlidError;

/// Fraction of the distance range used as the dynamic cutoff by default.
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.1;

/// How a distance matrix is binarized.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdSpec {
    /// Absolute cutoff supplied by the caller.
    Static { threshold: f64 },
    /// Cutoff `fraction * (max - min)` computed per matrix.
    Dynamic { fraction: f64 },
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        Self::Dynamic {
            fraction: DEFAULT_THRESHOLD_FRACTION,
        }
    }
}

impl ThresholdSpec {
    pub fn validate(&self) -> Result<(), NlidError> {
        match *self {
            Self::Static { threshold } => {
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(NlidError::configuration(format!(
                        "static threshold must be finite and >= 0.0; got {threshold}"
                    )));
                }
            }
            Self::Dynamic { fraction } => {
                if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
                    return Err(NlidError::configuration(format!(
                        "threshold_fraction must be in (0, 1]; got {fraction}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Absolute cutoff for `distances`.
    pub fn cutoff(&self, distances: &DistanceMatrix) -> f64 {
        match *self {
            Self::Static { threshold } => threshold,
            Self::Dynamic { fraction } => {
                let (min, max) = distances.range();
                if distances.size() == 0 {
                    0.0
                } else {
                    fraction * (max - min)
                }
            }
        }
    }
}

/// Binary `M x M` recurrence matrix stored row-major as 0/1 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceMatrix {
    data: Vec<u8>,
    size: usize,
}

impl RecurrenceMatrix {
    /// Marks `(i, j)` recurrent iff `distance(i, j) <= cutoff`.
    pub fn from_distances(distances: &DistanceMatrix, cutoff: f64) -> Self {
        let data = distances
            .as_slice()
            .iter()
            .map(|&d| u8::from(d <= cutoff))
            .collect();
        Self {
            data,
            size: distances.size(),
        }
    }

    /// Binarizes with `spec` after validating it.
    pub fn with_threshold(
        distances: &DistanceMatrix,
        spec: &ThresholdSpec,
    ) -> Result<Self, NlidError> {
        spec.validate()?;
        Ok(Self::from_distances(distances, spec.cutoff(distances)))
    }

    /// Wraps externally produced row-major 0/1 data.
    pub fn from_raw(size: usize, data: Vec<u8>) -> Result<Self, NlidError> {
        let expected = size
            .checked_mul(size)
            .ok_or_else(|| NlidError::invalid_input("recurrence matrix size overflow"))?;
        if data.len() != expected {
            return Err(NlidError::invalid_input(format!(
                "recurrence data length mismatch: got {}, expected {expected} (size={size})",
                data.len()
            )));
        }
        if let Some((idx, val)) = data.iter().copied().enumerate().find(|(_, v)| *v > 1) {
            return Err(NlidError::invalid_input(format!(
                "recurrence matrix must contain only 0/1: index {idx} has {val}"
            )));
        }
        Ok(Self { data, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.data[i * self.size + j] == 1
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of recurrent entries in each column.
    pub fn column_sums(&self) -> Vec<usize> {
        let mut sums = vec![0usize; self.size];
        for row in self.data.chunks_exact(self.size.max(1)) {
            for (sum, &v) in sums.iter_mut().zip(row) {
                *sum += usize::from(v);
            }
        }
        sums
    }

    /// Fraction of entries that are recurrent; 0 for an empty matrix.
    pub fn recurrence_rate(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let ones: usize = self.data.iter().map(|&v| usize::from(v)).sum();
        ones as f64 / self.data.len() as f64
    }
}

/// Either the raw distances or the binarized matrix.
#[derive(Clone, Debug, PartialEq)]
pub enum RecurrenceOutput {
    Distances(DistanceMatrix),
    Binary {
        matrix: RecurrenceMatrix,
        cutoff: f64,
    },
}

/// Builds the distance matrix of `trajectory` and binarizes it when a
/// threshold is given; without one the raw distances are returned.
pub fn compute_recurrence(
    trajectory: &Trajectory,
    threshold: Option<&ThresholdSpec>,
) -> Result<RecurrenceOutput, NlidError> {
    let distances = DistanceMatrix::from_trajectory(trajectory);
    let Some(spec) = threshold else {
        return Ok(RecurrenceOutput::Distances(distances));
    };
    spec.validate()?;
    let cutoff = spec.cutoff(&distances);
    Ok(RecurrenceOutput::Binary {
        matrix: RecurrenceMatrix::from_distances(&distances, cutoff),
        cutoff,
    })
}
