//! `heatkit_io_table` v1:
//! Registration source loading.
//!
//! Module layout:
//! - `conf`      : extensions, delimiters and date epoch
//! - `spec`      : load options and errors
//! - `util`      : header, numeric and date helpers
//! - `delimited` : CSV/TSV via `csv`
//! - `workbook`  : xlsx/xls/ods via `calamine`
//! - `loader`    : extension dispatch
pub mod conf;
pub mod delimited;
pub mod loader;
pub mod spec;
pub mod util;
pub mod workbook;

pub use loader::{derive_source_format, load_table};
pub use spec::{EnumSourceFormat, LoadError, SpecLoadOptions};
