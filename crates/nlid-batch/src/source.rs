// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nlid_core::NlidError;
use std::borrow::Cow;
use std::fmt;

/// A named provider of numeric columns, typically one input file.
///
/// Implementations hand back dense, NaN-free samples; cleaning and
/// normalization happen on the provider side.
pub trait ColumnSource {
    /// Identifier used in results, failures and logs.
    fn name(&self) -> &str;

    /// Samples of `column`, or [`NlidError::MissingColumn`] when absent.
    fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError>;
}

impl<S: ColumnSource + ?Sized> ColumnSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError> {
        (**self).column(column)
    }
}

impl<S: ColumnSource + ?Sized> ColumnSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError> {
        (**self).column(column)
    }
}

/// Ordered pair of column names analyzed together.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnPair {
    pub x: String,
    pub y: String,
}

impl ColumnPair {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Label of the `x_given_y` direction, e.g. `NLID(PUPIL|GAZE_X)`.
    pub fn x_given_y_label(&self) -> String {
        format!("NLID({}|{})", self.x, self.y)
    }

    pub fn y_given_x_label(&self) -> String {
        format!("NLID({}|{})", self.y, self.x)
    }
}

impl fmt::Display for ColumnPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// Column source backed by owned vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemorySource {
    name: String,
    columns: Vec<(String, Vec<f64>)>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
        }
    }

    /// Adds or replaces a column.
    pub fn with_column(mut self, column: impl Into<String>, values: Vec<f64>) -> Self {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((column, values)),
        }
        self
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

impl ColumnSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| Cow::Borrowed(values.as_slice()))
            .ok_or_else(|| {
                NlidError::missing_column(format!("'{column}' not found in '{}'", self.name))
            })
    }
}
