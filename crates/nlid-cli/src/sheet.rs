// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::table::{Cell, ColumnTable};
use calamine::{Data, Reader, open_workbook_auto};
use nlid_core::NlidError;
use std::path::Path;

/// Loads the first worksheet of an `.xlsx`/`.xls` workbook.
///
/// The first row of the used range is the header. Empty and error cells
/// count as missing.
pub fn read_first_sheet(path: &Path) -> Result<ColumnTable, NlidError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| NlidError::io(format!("failed to open {}: {err}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| NlidError::invalid_input("workbook has no worksheets"))?
        .map_err(|err| NlidError::io(format!("failed to read {}: {err}", path.display())))?;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(NlidError::invalid_input("worksheet is empty"));
    };
    let headers = header.iter().map(header_text).collect();
    // Rows are reported 1-based, as spreadsheet applications number them.
    let records = rows
        .enumerate()
        .map(|(idx, row)| (first_row + idx + 2, row.iter().map(cell).collect()));
    ColumnTable::from_records(headers, records)
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(text) => text.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Float(value) => Cell::from_number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::String(text) => Cell::from_text(text),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::cell;
    use crate::table::Cell;
    use calamine::{CellErrorType, Data};

    #[test]
    fn spreadsheet_cells_map_to_table_cells() {
        assert_eq!(cell(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(cell(&Data::Int(-3)), Cell::Number(-3.0));
        assert_eq!(cell(&Data::String(" 2 ".to_string())), Cell::Number(2.0));
        assert_eq!(cell(&Data::String("NaN".to_string())), Cell::Missing);
        assert_eq!(cell(&Data::Empty), Cell::Missing);
        assert_eq!(cell(&Data::Error(CellErrorType::NA)), Cell::Missing);
        assert_eq!(cell(&Data::Bool(true)), Cell::Text("true".to_string()));
    }
}
