// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::NlidError;

/// Validated, borrowed view over a dense, NaN-free sample sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalView<'a> {
    values: &'a [f64],
}

impl<'a> SignalView<'a> {
    /// Constructs a view, rejecting empty input and non-finite samples.
    pub fn new(values: &'a [f64]) -> Result<Self, NlidError> {
        if values.is_empty() {
            return Err(NlidError::invalid_input("signal must contain at least one sample"));
        }
        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(NlidError::invalid_input(format!(
                "signal samples must be finite: index {idx} has {value}"
            )));
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    /// Sub-view `[start, start + len)`; samples were validated on construction.
    pub fn window(&self, start: usize, len: usize) -> Result<Self, NlidError> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| NlidError::invalid_input("window end overflow"))?;
        if len == 0 || end > self.values.len() {
            return Err(NlidError::invalid_input(format!(
                "window [{start}, {end}) out of range for signal of length {}",
                self.values.len()
            )));
        }
        Ok(Self {
            values: &self.values[start..end],
        })
    }
}

/// Smallest signal length that embeds into at least one delay vector.
pub fn min_embeddable_len(dimension: usize, delay: usize) -> Option<usize> {
    dimension
        .checked_sub(1)?
        .checked_mul(delay)?
        .checked_add(1)
}
