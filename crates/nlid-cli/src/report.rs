// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nlid_batch::{BatchResult, FileResult};
use nlid_core::NlidError;
use std::fmt::{Display, Write as _};
use std::fs;
use std::path::Path;

/// Renders successful results as the averaged NLID table.
///
/// When every row shares one column pair the value headers carry the real
/// column names, e.g. `Avg NLID(PUPIL|GAZE)`. Mixed pairs add a `pair`
/// column and use generic `X|Y` headers.
pub fn render_results_csv(batch: &BatchResult) -> String {
    let single_pair = match batch.results.split_first() {
        Some((first, rest)) => rest
            .iter()
            .all(|result| result.pair == first.pair)
            .then_some(&first.pair),
        None => None,
    };

    let mut out = String::new();
    match single_pair {
        Some(pair) => {
            let _ = writeln!(
                out,
                "file,{},{},windows",
                csv_field(&format!("Avg {}", pair.x_given_y_label())),
                csv_field(&format!("Avg {}", pair.y_given_x_label()))
            );
        }
        None => out.push_str("file,pair,Avg NLID(X|Y),Avg NLID(Y|X),windows\n"),
    }

    for result in &batch.results {
        out.push_str(&csv_field(&result.source));
        if single_pair.is_none() {
            out.push(',');
            out.push_str(&csv_field(&format!("{}|{}", result.pair.x, result.pair.y)));
        }
        let _ = writeln!(out, ",{}", result_values(result));
    }
    out
}

fn result_values(result: &FileResult) -> String {
    format!(
        "{},{},{}",
        result.x_given_y, result.y_given_x, result.window_count
    )
}

pub fn write_results_csv(path: &Path, batch: &BatchResult) -> Result<(), NlidError> {
    fs::write(path, render_results_csv(batch))
        .map_err(|err| NlidError::io(format!("failed to write {}: {err}", path.display())))
}

/// Renders a row-major square matrix, one CSV line per row.
pub fn render_matrix_csv<T: Display>(data: &[T], size: usize) -> String {
    let mut out = String::new();
    if size == 0 {
        return out;
    }
    for row in data.chunks(size) {
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            let _ = write!(out, "{value}");
        }
        out.push('\n');
    }
    out
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
