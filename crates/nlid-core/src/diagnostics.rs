// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Diagnostics schema version for batch run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Structured diagnostics captured from a batch run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RunDiagnostics {
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub files_total: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub windows_analyzed: usize,
    pub windows_skipped: usize,
    /// Windows where at least one recurrence matrix had an all-zero column.
    pub degenerate_windows: usize,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    #[cfg(feature = "serde")]
    pub params_json: Option<serde_json::Value>,
}

impl Default for RunDiagnostics {
    fn default() -> Self {
        Self {
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(crate::engine_version().to_string()),
            runtime_ms: None,
            files_total: 0,
            files_succeeded: 0,
            files_failed: 0,
            windows_analyzed: 0,
            windows_skipped: 0,
            degenerate_windows: 0,
            notes: vec![],
            warnings: vec![],
            #[cfg(feature = "serde")]
            params_json: None,
        }
    }
}
