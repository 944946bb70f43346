// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::sheet::read_first_sheet;
use nlid_batch::ColumnSource;
use nlid_core::NlidError;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const MISSING_MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];

/// Extensions read through the spreadsheet loader instead of the CSV parser.
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Canonical column key: surrounding whitespace removed, upper-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// One cell after type detection.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Classifies raw cell text; blanks and NaN markers are missing.
    pub fn from_text(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty()
            || MISSING_MARKERS
                .iter()
                .any(|marker| text.eq_ignore_ascii_case(marker))
        {
            return Self::Missing;
        }
        match text.parse::<f64>() {
            Ok(value) => Self::from_number(value),
            Err(_) => Self::Text(text.to_string()),
        }
    }

    pub fn from_number(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ParsedColumn {
    header: String,
    values: Vec<f64>,
    dropped: usize,
    invalid: Option<(usize, String)>,
}

/// Headered numeric table, one cleaned series per column.
///
/// Missing cells are dropped per column, so two columns of the same table
/// can end up with different lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnTable {
    columns: Vec<ParsedColumn>,
}

impl ColumnTable {
    /// Builds a table from a header and `(row_number, cells)` records.
    ///
    /// Short records are padded with missing cells; long ones are rejected.
    pub fn from_records<I>(headers: Vec<String>, records: I) -> Result<Self, NlidError>
    where
        I: IntoIterator<Item = (usize, Vec<Cell>)>,
    {
        let mut columns: Vec<ParsedColumn> = headers
            .iter()
            .map(|header| ParsedColumn {
                header: normalize_column_name(header),
                values: vec![],
                dropped: 0,
                invalid: None,
            })
            .collect();

        for (row, cells) in records {
            if cells.len() > columns.len() {
                return Err(NlidError::invalid_input(format!(
                    "row {row} has {} cells but the header has {}",
                    cells.len(),
                    columns.len()
                )));
            }
            let mut cells = cells.into_iter();
            for column in &mut columns {
                match cells.next().unwrap_or(Cell::Missing) {
                    Cell::Missing => column.dropped += 1,
                    Cell::Number(value) => column.values.push(value),
                    Cell::Text(text) => {
                        if column.invalid.is_none() {
                            column.invalid = Some((row, text));
                        }
                    }
                }
            }
        }

        Ok(Self { columns })
    }

    /// Parses headered CSV text. Double-quoted fields may contain commas and
    /// `""` escapes; records never span lines.
    pub fn parse_csv(raw: &str) -> Result<Self, NlidError> {
        let mut lines = raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((_, header_line)) = lines.next() else {
            return Err(NlidError::invalid_input("CSV input is empty"));
        };
        let headers = split_record(header_line.trim_start_matches('\u{feff}'));
        let records = lines.map(|(line_idx, line)| {
            let cells = split_record(line)
                .iter()
                .map(|cell| Cell::from_text(cell))
                .collect();
            (line_idx + 1, cells)
        });
        Self::from_records(headers, records)
    }

    /// Normalized header names in file order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.header.as_str())
    }

    /// Cleaned samples of `name`, matched case-insensitively.
    pub fn column(&self, name: &str) -> Result<&[f64], NlidError> {
        let column = self.find(name)?;
        if let Some((row, text)) = &column.invalid {
            return Err(NlidError::invalid_input(format!(
                "column '{}' has non-numeric value '{text}' at row {row}",
                column.header
            )));
        }
        Ok(&column.values)
    }

    /// Number of cells of `name` dropped as missing.
    pub fn dropped(&self, name: &str) -> Result<usize, NlidError> {
        Ok(self.find(name)?.dropped)
    }

    fn find(&self, name: &str) -> Result<&ParsedColumn, NlidError> {
        let key = normalize_column_name(name);
        self.columns
            .iter()
            .find(|column| column.header == key)
            .ok_or_else(|| NlidError::missing_column(format!("'{key}'")))
    }
}

fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(ch),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

pub(crate) fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

pub(crate) fn is_spreadsheet(path: &Path) -> bool {
    SPREADSHEET_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
}

/// A CSV or spreadsheet file, read on first column access.
#[derive(Debug)]
pub struct TableFileSource {
    path: PathBuf,
    name: String,
    table: OnceLock<Result<ColumnTable, NlidError>>,
}

impl TableFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            table: OnceLock::new(),
        }
    }

    pub fn table(&self) -> Result<&ColumnTable, NlidError> {
        self.table
            .get_or_init(|| load_table(&self.path))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl ColumnSource for TableFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError> {
        let table = self.table()?;
        let values = table.column(column)?;
        let dropped = table.dropped(column)?;
        if dropped > 0 {
            debug!(file = %self.name, column, dropped, "dropped missing cells");
        }
        Ok(Cow::Borrowed(values))
    }
}

fn load_table(path: &Path) -> Result<ColumnTable, NlidError> {
    let table = if is_spreadsheet(path) {
        read_first_sheet(path)
    } else {
        let raw = fs::read_to_string(path)
            .map_err(|err| NlidError::io(format!("failed to read {}: {err}", path.display())))?;
        ColumnTable::parse_csv(&raw)
    };
    table.map_err(|err| match err {
        NlidError::InvalidInput(msg) => {
            NlidError::invalid_input(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}
