//! Loader options and errors.

use std::path::PathBuf;

use thiserror::Error;

/// Source file formats understood by [`crate::load_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSourceFormat {
    /// CSV/TSV text read with `csv`.
    Delimited,
    /// Spreadsheet workbook read with `calamine`.
    Workbook,
}

/// Options for reading a registration table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecLoadOptions {
    /// Worksheet to read; the first sheet when unset.
    pub sheet_name: Option<String>,
    /// Field delimiter for delimited text; derived from the extension when unset.
    pub delimiter: Option<u8>,
    /// Keep every delimited column as text instead of detecting numeric columns.
    pub if_keep_text: bool,
}

/// Failures while reading a registration source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file is missing or unreadable.
    #[error("failed to open `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The extension names no known format.
    #[error("unsupported source format: `{0}` (expected csv, tsv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat(PathBuf),
    /// Malformed delimited text.
    #[error("failed to parse `{path}`: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The workbook could not be opened or read.
    #[error("failed to read workbook `{path}`: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    /// The requested worksheet does not exist.
    #[error("worksheet `{sheet}` not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },
    /// No header row (empty file or sheet).
    #[error("`{0}` has no header row")]
    EmptySource(PathBuf),
    /// Two columns share one header.
    #[error("duplicate column header `{0}`")]
    DuplicateHeader(String),
}
