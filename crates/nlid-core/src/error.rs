// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error taxonomy shared by every NLID crate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NlidError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A signal or window is too short for the requested embedding.
    #[error("insufficient length: {0}")]
    InsufficientLength(String),
    /// A requested column is absent from a source.
    #[error("missing column: {0}")]
    MissingColumn(String),
    /// Run-level precondition violated; raised before any file is processed.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("cancelled")]
    Cancelled,
}

impl NlidError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn insufficient_length(msg: impl Into<String>) -> Self {
        Self::InsufficientLength(msg.into())
    }

    pub fn missing_column(msg: impl Into<String>) -> Self {
        Self::MissingColumn(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Stable snake_case category used in failure records and error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InsufficientLength(_) => "insufficient_length",
            Self::MissingColumn(_) => "missing_column",
            Self::Configuration(_) => "configuration",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal",
            Self::Cancelled => "cancelled",
        }
    }

    /// Message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(msg)
            | Self::InsufficientLength(msg)
            | Self::MissingColumn(msg)
            | Self::Configuration(msg)
            | Self::NumericalIssue(msg)
            | Self::Io(msg)
            | Self::Internal(msg) => msg,
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NlidError;

    #[test]
    fn display_prefixes_category() {
        assert_eq!(
            NlidError::insufficient_length("L=3, m=5, tau=1").to_string(),
            "insufficient length: L=3, m=5, tau=1"
        );
        assert_eq!(
            NlidError::missing_column("PUPIL").to_string(),
            "missing column: PUPIL"
        );
        assert_eq!(NlidError::cancelled().to_string(), "cancelled");
    }

    #[test]
    fn codes_are_stable() {
        let cases = [
            (NlidError::invalid_input("x"), "invalid_input"),
            (NlidError::insufficient_length("x"), "insufficient_length"),
            (NlidError::missing_column("x"), "missing_column"),
            (NlidError::configuration("x"), "configuration"),
            (NlidError::numerical_issue("x"), "numerical_issue"),
            (NlidError::io("x"), "io_error"),
            (NlidError::internal("x"), "internal"),
            (NlidError::Cancelled, "cancelled"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn message_strips_prefix() {
        let err = NlidError::configuration("overlap must be < 1; got 1");
        assert_eq!(err.message(), "overlap must be < 1; got 1");
        assert_eq!(NlidError::Cancelled.message(), "cancelled");
    }
}
