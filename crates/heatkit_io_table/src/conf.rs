//! Source format constants.

/// Extensions read as delimited text.
pub const TUP_EXTENSIONS_DELIMITED: [&str; 3] = ["csv", "tsv", "txt"];
/// Extensions read as spreadsheet workbooks.
pub const TUP_EXTENSIONS_WORKBOOK: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const C_DELIMITER_CSV: u8 = b',';
pub const C_DELIMITER_TSV: u8 = b'\t';
/// Prefix for header cells that are blank (`Unnamed: 3`).
pub const C_HEADER_UNNAMED_PREFIX: &str = "Unnamed: ";
/// Day zero of the 1900 spreadsheet date system.
pub const TUP_SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);
