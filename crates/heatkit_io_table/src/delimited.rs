//! Delimited text (CSV/TSV) reader.

use std::path::Path;

use csv::ReaderBuilder;
use heatkit_heat::{EnumCellValue, SpecSourceTable};
use tracing::debug;

use crate::spec::LoadError;
use crate::util::{derive_headers, fit_row, infer_numeric_columns, is_blank_row};

/// Read a delimited file whose first record is the header row.
///
/// Rows may be ragged; they are padded or cut to the header width. Blank
/// rows are skipped. Unless `if_keep_text` is set, fully numeric columns
/// are converted to numbers.
pub fn read_delimited(
    path: &Path,
    delimiter: u8,
    if_keep_text: bool,
) -> Result<SpecSourceTable, LoadError> {
    let err_csv = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(err_csv)?;

    let record_headers = reader.headers().map_err(err_csv)?.clone();
    if record_headers.iter().all(|c_name| c_name.trim().is_empty()) {
        return Err(LoadError::EmptySource(path.to_path_buf()));
    }
    let l_columns = derive_headers(record_headers.iter())?;
    let n_width = l_columns.len();

    let mut l_rows = Vec::new();
    let mut n_blank = 0usize;
    for result in reader.records() {
        let record = result.map_err(err_csv)?;
        let row = fit_row(record.iter().map(EnumCellValue::from_text).collect(), n_width);
        if is_blank_row(&row) {
            n_blank += 1;
            continue;
        }
        l_rows.push(row);
    }
    debug!(
        path = %path.display(),
        rows = l_rows.len(),
        blank_rows = n_blank,
        "read delimited source"
    );

    let mut table = SpecSourceTable {
        columns: l_columns,
        rows: l_rows,
    };
    if !if_keep_text {
        infer_numeric_columns(&mut table);
    }
    Ok(table)
}
