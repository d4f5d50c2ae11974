//! PDF layout options, page model and errors.

use thiserror::Error;

use crate::conf::{
    N_FONT_SIZE_BODY_PT, N_FONT_SIZE_HEADING_PT, N_FONT_SIZE_TITLE_PT, N_MARGIN_MM,
    N_PAGE_HEIGHT_MM, N_PAGE_WIDTH_MM, N_ROW_HEIGHT_MM, TUP_COLUMN_WIDTHS_MM,
};

/// Page geometry and typography for heat sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPdfOptions {
    /// Page width.
    pub page_width_mm: f32,
    /// Page height.
    pub page_height_mm: f32,
    /// Margin on every side.
    pub margin_mm: f32,
    /// Line pitch of every printed row.
    pub row_height_mm: f32,
    /// Widths for SL, Name, Bib Number, Affiliation and Date of Birth.
    pub widths_mm: [f32; 5],
    /// Group title size.
    pub font_size_title_pt: f32,
    /// `Heat {n}` heading size.
    pub font_size_heading_pt: f32,
    /// Header and entry row size.
    pub font_size_body_pt: f32,
}

impl Default for SpecPdfOptions {
    fn default() -> Self {
        Self {
            page_width_mm: N_PAGE_WIDTH_MM,
            page_height_mm: N_PAGE_HEIGHT_MM,
            margin_mm: N_MARGIN_MM,
            row_height_mm: N_ROW_HEIGHT_MM,
            widths_mm: TUP_COLUMN_WIDTHS_MM,
            font_size_title_pt: N_FONT_SIZE_TITLE_PT,
            font_size_heading_pt: N_FONT_SIZE_HEADING_PT,
            font_size_body_pt: N_FONT_SIZE_BODY_PT,
        }
    }
}

/// One positioned text run. `y_mm` is measured from the page bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPdfText {
    /// Left edge of the run.
    pub x_mm: f32,
    /// Baseline height.
    pub y_mm: f32,
    /// Font size in points.
    pub font_size_pt: f32,
    /// Helvetica Bold instead of Helvetica.
    pub if_bold: bool,
    /// Text as printed, already fitted to its column.
    pub text: String,
}

/// Text runs of one page, in drawing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecPdfPage {
    /// Positioned text runs.
    pub texts: Vec<SpecPdfText>,
}

/// Failures while rendering or saving a heat sheet PDF.
#[derive(Debug, Error)]
pub enum PdfWriteError {
    /// The PDF library rejected a font or the document.
    #[error("pdf backend error: {0}")]
    Backend(String),
    /// The output file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Output path.
        path: String,
        #[source]
        source: std::io::Error,
    },
}
