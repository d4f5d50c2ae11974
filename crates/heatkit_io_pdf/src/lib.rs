//! `heatkit_io_pdf` v1:
//! Printable heat sheets.
//!
//! Module layout:
//! - `conf`   : page geometry constants
//! - `spec`   : options, page model and errors
//! - `layout` : backend-independent text placement
//! - `writer` : `printpdf` rendering and file output
pub mod conf;
pub mod layout;
pub mod spec;
pub mod writer;

pub use layout::{SpecPdfColumn, derive_pdf_columns, fit_text, plan_pdf_pages};
pub use spec::{PdfWriteError, SpecPdfOptions, SpecPdfPage, SpecPdfText};
pub use writer::{render_plan_pdf, write_plan_pdf};
