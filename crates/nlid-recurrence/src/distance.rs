// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::embedding::Trajectory;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Dense `M x M` matrix of Euclidean distances between trajectory rows.
///
/// Symmetric with an exactly zero diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Computes all pairwise distances via `|a|^2 + |b|^2 - 2 a.b`.
    ///
    /// Negative round-off under the root is clamped to zero. Entry `(i, j)`
    /// and `(j, i)` are evaluated by the same commutative expression, so the
    /// result is exactly symmetric on both the sequential and the `rayon`
    /// path.
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let size = trajectory.rows();
        let norms = trajectory.squared_norms();
        let mut data = vec![0.0; size * size];
        if size == 0 {
            return Self { data, size };
        }

        let fill_row = |(i, row): (usize, &mut [f64])| {
            let row_i = trajectory.row(i);
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = if i == j {
                    0.0
                } else {
                    pair_distance(norms[i], norms[j], row_i, trajectory.row(j))
                };
            }
        };

        #[cfg(feature = "rayon")]
        data.par_chunks_mut(size).enumerate().for_each(fill_row);
        #[cfg(not(feature = "rayon"))]
        data.chunks_mut(size).enumerate().for_each(fill_row);

        Self { data, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `(min, max)` over every entry, diagonal included.
    pub fn range(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            })
    }
}

fn pair_distance(norm_a: f64, norm_b: f64, a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (norm_a + norm_b - 2.0 * dot).max(0.0).sqrt()
}
