//! Format dispatch for registration sources.

use std::path::Path;

use heatkit_heat::SpecSourceTable;
use tracing::info;

use crate::conf::{C_DELIMITER_CSV, C_DELIMITER_TSV, TUP_EXTENSIONS_DELIMITED, TUP_EXTENSIONS_WORKBOOK};
use crate::delimited::read_delimited;
use crate::spec::{EnumSourceFormat, LoadError, SpecLoadOptions};
use crate::workbook::read_workbook;

fn derive_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Source format by file extension (case-insensitive).
pub fn derive_source_format(path: &Path) -> Result<EnumSourceFormat, LoadError> {
    let c_ext = derive_extension(path);
    if TUP_EXTENSIONS_DELIMITED.contains(&c_ext.as_str()) {
        Ok(EnumSourceFormat::Delimited)
    } else if TUP_EXTENSIONS_WORKBOOK.contains(&c_ext.as_str()) {
        Ok(EnumSourceFormat::Workbook)
    } else {
        Err(LoadError::UnsupportedFormat(path.to_path_buf()))
    }
}

/// Load a registration table from a CSV/TSV file or a spreadsheet workbook.
pub fn load_table(
    path: impl AsRef<Path>,
    options: &SpecLoadOptions,
) -> Result<SpecSourceTable, LoadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }

    let table = match derive_source_format(path)? {
        EnumSourceFormat::Delimited => {
            let delimiter = options.delimiter.unwrap_or(if derive_extension(path) == "tsv" {
                C_DELIMITER_TSV
            } else {
                C_DELIMITER_CSV
            });
            read_delimited(path, delimiter, options.if_keep_text)?
        }
        EnumSourceFormat::Workbook => read_workbook(path, options.sheet_name.as_deref())?,
    };

    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "Loaded source table"
    );
    Ok(table)
}
