// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]
//! Table loading, input discovery and result writing behind the `nlid` binary.

pub mod discovery;
pub mod report;
pub mod sheet;
pub mod table;

pub use discovery::{Discovery, RESULTS_FILE_NAME, discover_inputs};
pub use report::{render_matrix_csv, render_results_csv, write_results_csv};
pub use sheet::read_first_sheet;
pub use table::{Cell, ColumnTable, SPREADSHEET_EXTENSIONS, TableFileSource, normalize_column_name};

use nlid_batch::ColumnPair;
use nlid_core::NlidError;

/// Parses `X,Y` into a pair of normalized column names.
pub fn parse_column_pair(raw: &str) -> Result<ColumnPair, NlidError> {
    let (x, y) = raw.split_once(',').ok_or_else(|| {
        NlidError::invalid_input(format!("column pair must look like X,Y; got '{raw}'"))
    })?;
    let (x, y) = (normalize_column_name(x), normalize_column_name(y));
    if x.is_empty() || y.is_empty() {
        return Err(NlidError::invalid_input(format!(
            "column pair has an empty name: '{raw}'"
        )));
    }
    Ok(ColumnPair::new(x, y))
}
