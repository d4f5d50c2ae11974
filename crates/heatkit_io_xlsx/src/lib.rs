//! `heatkit_io_xlsx` v1:
//! Rust-side XLSX export for rosters and heat plans.
//!
//! Module layout:
//! - `conf`   : constants and default presets
//! - `spec`   : formats, options, reports and errors
//! - `frame`  : roster/heat ↔ DataFrame conversion
//! - `util`   : pure helper functions
//! - `writer` : pure-Rust writer kernel
pub mod conf;
pub mod frame;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_ENTRIES, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats, derive_default_xlsx_write_options,
};
pub use frame::{
    derive_dataframe_from_grid, derive_dataframe_from_heat, derive_dataframe_from_roster,
};
pub use spec::{
    EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecCellFormat, SpecXlsxFormats,
    SpecXlsxReport, SpecXlsxWriteOptions, XlsxWriteError,
};
pub use util::{derive_unique_sheet_name, sanitize_sheet_name};
pub use writer::XlsxWriter;
