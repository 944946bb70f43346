// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::table::{has_extension, is_spreadsheet};
use nlid_core::NlidError;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the results table written next to the inputs.
pub const RESULTS_FILE_NAME: &str = "NLID_Results_Avg.csv";

/// Input files found for a run, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    pub inputs: Vec<PathBuf>,
    /// Files that look like inputs but are not data, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Resolves `input` to the table files to analyze.
///
/// A directory yields every `*.csv`, `*.xlsx` and `*.xls` directly inside it,
/// sorted by file name, except a previous results table. Office lock files
/// (`~$name.xlsx`) are reported as skipped.
pub fn discover_inputs(input: &Path) -> Result<Discovery, NlidError> {
    let metadata = fs::metadata(input)
        .map_err(|err| NlidError::io(format!("cannot access {}: {err}", input.display())))?;

    if metadata.is_file() {
        return Ok(Discovery {
            inputs: vec![input.to_path_buf()],
            skipped: vec![],
        });
    }

    let entries = fs::read_dir(input)
        .map_err(|err| NlidError::io(format!("cannot list {}: {err}", input.display())))?;
    let mut discovery = Discovery::default();
    for entry in entries {
        let entry =
            entry.map_err(|err| NlidError::io(format!("cannot list {}: {err}", input.display())))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !has_extension(&path, "csv") && !is_spreadsheet(&path) {
            continue;
        }
        let file_name = path.file_name().map(|name| name.to_string_lossy());
        if file_name.as_deref() == Some(RESULTS_FILE_NAME) {
            continue;
        }
        if file_name.as_deref().is_some_and(|name| name.starts_with("~$")) {
            discovery
                .skipped
                .push((path, "office lock file".to_string()));
            continue;
        }
        discovery.inputs.push(path);
    }

    discovery.inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    discovery.skipped.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(discovery)
}
