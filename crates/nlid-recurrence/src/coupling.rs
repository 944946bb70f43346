// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::recurrence::RecurrenceMatrix;
use nlid_core::NlidError;

/// Directional coupling pair produced from two recurrence matrices.
///
/// `x_given_y` is the column-averaged share of Y's recurrences that are also
/// recurrences of X (overlap normalized by Y's column sums); `y_given_x` is
/// the same quantity normalized by X's column sums. Both lie in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coupling {
    pub x_given_y: f64,
    pub y_given_x: f64,
}

impl Coupling {
    /// Swaps the direction labels.
    pub fn swapped(self) -> Self {
        Self {
            x_given_y: self.y_given_x,
            y_given_x: self.x_given_y,
        }
    }
}

/// Coupling plus the number of all-zero columns seen in each input.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CouplingReport {
    pub coupling: Coupling,
    pub empty_columns_x: usize,
    pub empty_columns_y: usize,
}

impl CouplingReport {
    /// True when any column of either matrix had no recurrences.
    pub fn is_degenerate(&self) -> bool {
        self.empty_columns_x > 0 || self.empty_columns_y > 0
    }
}

/// Nonlinear interdependence between two equally sized recurrence matrices.
///
/// For every column `j`, the overlap count `sum_i X[i][j] * Y[i][j]` is
/// divided by each matrix's column sum; a zero column sum contributes 0
/// rather than NaN. The two ratio series are averaged over all columns.
pub fn nlid(ar_x: &RecurrenceMatrix, ar_y: &RecurrenceMatrix) -> Result<CouplingReport, NlidError> {
    if ar_x.size() != ar_y.size() {
        return Err(NlidError::invalid_input(format!(
            "recurrence matrices must have equal size: x={}, y={}",
            ar_x.size(),
            ar_y.size()
        )));
    }

    let size = ar_x.size();
    if size == 0 {
        return Ok(CouplingReport {
            coupling: Coupling {
                x_given_y: 0.0,
                y_given_x: 0.0,
            },
            empty_columns_x: 0,
            empty_columns_y: 0,
        });
    }

    let mut overlap = vec![0usize; size];
    let mut col_x = vec![0usize; size];
    let mut col_y = vec![0usize; size];
    for i in 0..size {
        let (row_x, row_y) = (ar_x.row(i), ar_y.row(i));
        for j in 0..size {
            let (x, y) = (usize::from(row_x[j]), usize::from(row_y[j]));
            overlap[j] += x * y;
            col_x[j] += x;
            col_y[j] += y;
        }
    }

    let mut sum_by_x = 0.0;
    let mut sum_by_y = 0.0;
    for j in 0..size {
        sum_by_x += ratio(overlap[j], col_x[j]);
        sum_by_y += ratio(overlap[j], col_y[j]);
    }

    let columns = size as f64;
    let report = CouplingReport {
        coupling: Coupling {
            x_given_y: sum_by_y / columns,
            y_given_x: sum_by_x / columns,
        },
        empty_columns_x: col_x.iter().filter(|&&c| c == 0).count(),
        empty_columns_y: col_y.iter().filter(|&&c| c == 0).count(),
    };
    if report.is_degenerate() {
        tracing::debug!(
            size,
            empty_columns_x = report.empty_columns_x,
            empty_columns_y = report.empty_columns_y,
            "degenerate recurrence columns resolved to zero"
        );
    }
    Ok(report)
}

fn ratio(overlap: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        overlap as f64 / total as f64
    }
}
